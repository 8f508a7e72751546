//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before anything was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The API rejected the session (401/403)
    #[error("Not authenticated")]
    Unauthorized,

    /// Any other non-success HTTP status
    #[error("API error: HTTP {status}")]
    Http { status: u16 },

    #[error("Unable to reach the Fintrack API: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("Unexpected API response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Whether the server definitively reported "no session"
    ///
    /// Transport and decode failures are indeterminate: the user may still
    /// hold a valid session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                401 | 403 => Self::Unauthorized,
                code => Self::Http { status: code },
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
