//! Authentication endpoints

use super::{AdminClient, ClientError};
use crate::types::VerifyPhoneRequest;
use async_trait::async_trait;
use okshouse_admin_core::{Admin, AdminApi, ApiError, TokenGrant};
use reqwest::Method;
use tracing::debug;

pub const VERIFY_PHONE_PATH: &str = "/admin/auth/verify-phone";
pub const REFRESH_PATH: &str = "/admin/auth/refresh";
pub const ME_PATH: &str = "/admin/auth/me";
pub const LOGOUT_PATH: &str = "/admin/auth/logout";

impl AdminClient {
    /// Exchange a registered phone number for an access token
    pub async fn verify_phone(&self, phone: &str) -> Result<TokenGrant, ClientError> {
        let req = self
            .request(Method::POST, VERIFY_PHONE_PATH)
            .json(&VerifyPhoneRequest {
                phone: phone.to_string(),
            });
        self.execute(req).await
    }

    /// Issue a new access token from the refresh cookie
    pub async fn refresh_token(&self) -> Result<TokenGrant, ClientError> {
        let req = self.request(Method::POST, REFRESH_PATH);
        #[cfg(target_arch = "wasm32")]
        let req = req.fetch_credentials_include();
        self.execute(req).await
    }

    /// Admin owning `token`
    pub async fn current_admin(&self, token: &str) -> Result<Admin, ClientError> {
        let req = self.request_with_token(Method::GET, ME_PATH, token);
        self.execute(req).await
    }

    /// Revoke the session server-side
    pub async fn logout(&self, token: Option<&str>) -> Result<(), ClientError> {
        let req = match token {
            Some(token) => self.request_with_token(Method::POST, LOGOUT_PATH, token),
            None => self.request(Method::POST, LOGOUT_PATH),
        };
        #[cfg(target_arch = "wasm32")]
        let req = req.fetch_credentials_include();
        self.execute_empty(req).await
    }
}

#[async_trait(?Send)]
impl AdminApi for AdminClient {
    async fn verify_phone(&self, phone: &str) -> Result<TokenGrant, ApiError> {
        debug!("POST {VERIFY_PHONE_PATH}");
        Ok(AdminClient::verify_phone(self, phone).await?)
    }

    async fn refresh_token(&self) -> Result<TokenGrant, ApiError> {
        debug!("POST {REFRESH_PATH}");
        Ok(AdminClient::refresh_token(self).await?)
    }

    async fn current_admin(&self, token: &str) -> Result<Admin, ApiError> {
        debug!("GET {ME_PATH}");
        Ok(AdminClient::current_admin(self, token).await?)
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        debug!("POST {LOGOUT_PATH}");
        Ok(AdminClient::logout(self, token).await?)
    }
}
