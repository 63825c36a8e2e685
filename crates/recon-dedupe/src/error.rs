use recon_model::ReconError;
use thiserror::Error;

/// Errors from duplicate grouping and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DedupeError {
    /// Grouping needs at least one match field.
    #[error("No match fields selected; no duplicates possible")]
    NoMatchFields,

    #[error("Unknown duplicate group: {key}")]
    UnknownGroup { key: String },

    #[error("Row {index} is not a member of group {key}")]
    NotAMember { key: String, index: usize },

    #[error("Member position {position} is out of range for group {key} ({len} members)")]
    MemberOutOfRange {
        key: String,
        position: usize,
        len: usize,
    },
}

impl From<DedupeError> for ReconError {
    fn from(err: DedupeError) -> Self {
        ReconError::Message(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DedupeError>;
