//! Common Error Types
//!
//! One error enum for the whole crate. Quota waits are not errors and never
//! show up here.

use std::fmt;

/// Crate-wide error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The OAuth flow could not complete. Fatal, never retried.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Any failure reported by, or while talking to, a Google API.
    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// The remote error, if this is one.
    pub fn as_remote(&self) -> Option<&RemoteApiError> {
        match self {
            Self::RemoteApi(e) => Some(e),
            _ => None,
        }
    }
}

/// A failed Google API call: not-found, permission, quota or transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteApiError {
    /// HTTP status, `None` when the request never produced a response.
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Failure before any HTTP status was received.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(429)
    }
}

impl fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "Google API error {}: {}", code, self.message),
            None => write!(f, "Google API request failed: {}", self.message),
        }
    }
}

impl std::error::Error for RemoteApiError {}
