//! Client error types

use okshouse_admin_core::ApiError;
use serde_json::Value;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// The token was missing, expired or revoked
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from an HTTP status and the raw response body
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            Self::Serialization(_) | Self::Configuration(_) => None,
        }
    }

    /// The part of the error meant for the administrator
    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(message)
            | Self::AuthenticationFailed(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::ServerError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err.status() {
            Some(status) => ApiError::with_status(status, err.message()),
            None => ApiError::transport(err.message()),
        }
    }
}

/// Pull a readable message out of an error body.
///
/// The backend answers `{"detail": "..."}`; `message` and `error` fields and
/// plain text bodies are accepted too.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            match fields.get(key) {
                Some(Value::String(message)) if !message.is_empty() => return message.clone(),
                // Validation errors: [{"msg": "..."}]
                Some(Value::Array(items)) => {
                    if let Some(message) = items
                        .iter()
                        .find_map(|item| item.get("msg").and_then(Value::as_str))
                    {
                        return message.to_string();
                    }
                }
                _ => {}
            }
        }
        if let Some(Value::String(message)) = fields.get("msg") {
            return message.clone();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}
