use recon_model::ReconError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No row with this original index is held.
    #[error("Row {index} not found")]
    RowNotFound { index: usize },
}

impl From<ValidationError> for ReconError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RowNotFound { index } => ReconError::Validation {
                row: index,
                message: "row not found".to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
