//! Requests made on behalf of a signed-in admin

use super::{AdminClient, ClientError};
use async_trait::async_trait;
use okshouse_admin_core::SessionManager;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::rc::Rc;
use tracing::{debug, warn};

/// Session callbacks used by [`AuthorizedClient`]
#[async_trait(?Send)]
pub trait SessionHooks {
    /// Token for the next request, if any
    async fn access_token(&self) -> Option<String>;

    /// The backend rejected the token. Returns true when a retry is worth it.
    async fn on_unauthorized(&self) -> bool;
}

#[async_trait(?Send)]
impl SessionHooks for SessionManager {
    async fn access_token(&self) -> Option<String> {
        self.ensure_fresh_token().await
    }

    async fn on_unauthorized(&self) -> bool {
        self.recover_from_unauthorized().await
    }
}

/// Attaches the session token to every request and retries once after a 401
#[derive(Clone)]
pub struct AuthorizedClient {
    client: AdminClient,
    hooks: Rc<dyn SessionHooks>,
}

impl AuthorizedClient {
    pub fn new(client: AdminClient, hooks: Rc<dyn SessionHooks>) -> Self {
        Self { client, hooks }
    }

    pub fn inner(&self) -> &AdminClient {
        &self.client
    }

    /// GET `path` and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(Method::GET, path, |req| req).await
    }

    /// POST `body` as JSON to `path` and decode the JSON response
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, |req| req.json(&body)).await
    }

    /// Send a request built by `build`, authenticated with the session token
    pub async fn execute<T, F>(&self, method: Method, path: &str, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let response = self.send(method.clone(), path, &build).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        if !self.hooks.on_unauthorized().await {
            debug!("{method} {path} rejected and session not recoverable");
            return Self::decode(response).await;
        }

        debug!("Retrying {method} {path} with renewed token");
        let retry = self.send(method, path, &build).await?;
        Self::decode(retry).await
    }

    async fn send<F>(
        &self,
        method: Method,
        path: &str,
        build: &F,
    ) -> Result<reqwest::Response, ClientError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let req = match self.hooks.access_token().await {
            Some(token) => self.client.request_with_token(method, path, &token),
            None => {
                warn!("Sending {method} {path} without an access token");
                self.client.request(method, path)
            }
        };
        Ok(build(req).send().await?)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::from_status(status, &body))
        }
    }
}
