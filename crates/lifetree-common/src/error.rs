//! Error types for lifetree
//!
//! One error enum is shared across the workspace. Messages are user-facing:
//! the CLI prints them verbatim when a command fails.

use thiserror::Error;

/// Result type alias for lifetree operations
pub type Result<T> = std::result::Result<T, LifetreeError>;

/// Error type shared by all lifetree crates
#[derive(Error, Debug)]
pub enum LifetreeError {
    /// Transport-level HTTP failure (connect, timeout, decode)
    #[error("network request failed: {0}. Check your internet connection and API URL.")]
    Http(String),

    /// The API answered with a non-success status
    #[error("GBIF returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The API reports no entity for a key or no confident match for a name
    #[error("not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("failed to decode API response: {0}")]
    Json(String),

    /// Configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// A tree operation referenced a node the controller does not know
    #[error("unknown tree node: {0}")]
    UnknownNode(String),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LifetreeError {
    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for LifetreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
