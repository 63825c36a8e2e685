//! Error types for mapping operations.

use recon_model::{CanonicalField, ReconError};
use thiserror::Error;

/// Errors from mapping operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Header not present in the parsed file.
    #[error("Column not found: {header}")]
    UnknownHeader { header: String },

    /// A custom slot can only hold the header it is named after.
    #[error("Custom slot '{slot}' cannot hold column '{header}'")]
    CustomSlotMismatch { header: String, slot: String },

    /// A required field has no column.
    #[error("Required field '{}' is not mapped", .field.label())]
    RequiredFieldUnmapped { field: CanonicalField },
}

impl From<MappingError> for ReconError {
    fn from(err: MappingError) -> Self {
        ReconError::Message(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;
