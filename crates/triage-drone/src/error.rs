//! Error types for Drone API access

use thiserror::Error;

/// Errors talking to the Drone server.
///
/// All of these are fatal to a triage run; nothing is retried.
#[derive(Error, Debug)]
pub enum DroneError {
    /// Required setting missing
    #[error("Drone is not configured: {0} is not set")]
    NotConfigured(&'static str),

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("Drone API returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body was not the expected JSON
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested build does not exist in the source
    #[error("Build #{0} not found")]
    BuildNotFound(u64),
}

impl From<reqwest::Error> for DroneError {
    fn from(err: reqwest::Error) -> Self {
        DroneError::Http(err.to_string())
    }
}

/// Result type for Drone operations
pub type Result<T> = std::result::Result<T, DroneError>;
