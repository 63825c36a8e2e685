//! Error types for remote store access.

use std::path::PathBuf;

use recon_model::ReconError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    /// Credentials, base or table missing or rejected.
    #[error("remote store configuration error: {message}")]
    Configuration { message: String },

    /// Request could not be sent or timed out.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success status other than the ones mapped above.
    #[error("remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("remote API rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Resolution requested for a record id no lookup returned.
    #[error("unknown remote record: {id}")]
    UnknownRecord { id: String },

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("failed to read snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether retrying the same request could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited { .. })
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

impl From<RemoteError> for ReconError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Configuration { message } => ReconError::Configuration { message },
            other => ReconError::Message(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
