//! Contract of the admin authentication backend

use crate::error::ApiError;
use crate::types::{Admin, TokenGrant};
use async_trait::async_trait;

/// Authentication endpoints consumed by the session manager
#[async_trait(?Send)]
pub trait AdminApi {
    /// Exchange a registered phone number for an access token
    async fn verify_phone(&self, phone: &str) -> Result<TokenGrant, ApiError>;

    /// Issue a new access token from the refresh credential the backend tracks
    async fn refresh_token(&self) -> Result<TokenGrant, ApiError>;

    /// Look up the admin owning `token`
    async fn current_admin(&self, token: &str) -> Result<Admin, ApiError>;

    /// Revoke the session server-side
    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError>;
}
