//! Error types for notification delivery.

use std::path::PathBuf;

use recon_model::ReconError;
use thiserror::Error;

/// Delivery failures. Never affect the finalized data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("webhook rejected the payload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to write payload to {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<SubmissionError> for ReconError {
    fn from(err: SubmissionError) -> Self {
        ReconError::Submission {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SubmissionError>;
