//! Unified error type for reconciliation operations.
//!
//! Stage crates define their own error enums; each converts into
//! [`ReconError`] so the session and the binary deal with one type.

use thiserror::Error;

/// Broad classification used to decide how an error is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials or identifiers missing. Fatal before any operation.
    Configuration,
    /// Per-row schema violation. Recoverable by correcting the row.
    Validation,
    /// One remote lookup failed. Recovered as "no match".
    Lookup,
    /// Notification delivery failed. Reported, never rolled back.
    Submission,
    /// Input or state problem raised by a stage.
    Input,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReconError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("row {row}: {message}")]
    Validation { row: usize, message: String },

    #[error("lookup failed for row {row}: {message}")]
    Lookup { row: usize, message: String },

    #[error("submission failed: {message}")]
    Submission { message: String },

    /// The requested operation does not fit the current pipeline stage.
    #[error("{operation} is not available yet: {reason}")]
    StageOrder {
        operation: &'static str,
        reason: String,
    },

    #[error("{0}")]
    Message(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn stage_order(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::StageOrder {
            operation,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Lookup { .. } => ErrorKind::Lookup,
            Self::Submission { .. } => ErrorKind::Submission,
            Self::StageOrder { .. } | Self::Message(_) | Self::Io(_) => ErrorKind::Input,
        }
    }

    /// Whether processing of other rows can continue after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::Lookup | ErrorKind::Submission
        )
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
