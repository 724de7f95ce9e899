use thiserror::Error;

/// Error reported by the admin backend for a single call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,
    /// Human-readable message suitable for display
    pub message: String,
}

impl ApiError {
    /// Create an error carrying an HTTP status
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create an error that never reached the server (network, decoding)
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Whether the backend rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// Lifecycle operation failures.
///
/// `Display` is the message shown to the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Logout in progress.")]
    LogoutInProgress,

    #[error("No access token.")]
    NoAccessToken,

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Unexpected session failure: {0}")]
    Unexpected(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl SessionError {
    /// The backend error behind this failure, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Durable storage access failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage write rejected: {0}")]
    WriteRejected(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
