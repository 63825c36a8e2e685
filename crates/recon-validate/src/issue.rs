//! Validation issue types.

use recon_model::CanonicalField;
use serde::{Deserialize, Serialize};

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Row is rejected until corrected
    Error,
    /// Should review
    Warning,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// Validation issue for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Issue {
    /// Required field is empty after trimming
    RequiredEmpty { field: CanonicalField },
    /// URL-like value from which no hostname could be read
    MissingHostname {
        field: CanonicalField,
        value: String,
    },
}

impl Issue {
    pub fn field(&self) -> CanonicalField {
        match self {
            Issue::RequiredEmpty { field } => *field,
            Issue::MissingHostname { field, .. } => *field,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Issue::RequiredEmpty { .. } => Severity::Error,
            Issue::MissingHostname { .. } => Severity::Warning,
        }
    }

    /// Format message with issue-specific data.
    pub fn message(&self) -> String {
        match self {
            Issue::RequiredEmpty { field } => format!("{} is required", field.label()),
            Issue::MissingHostname { field, value } => {
                format!("{} '{}' has no recognizable hostname", field.label(), value)
            }
        }
    }
}
