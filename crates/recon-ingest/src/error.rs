//! Error types for CSV ingestion.

use std::path::PathBuf;

use recon_model::ReconError;
use thiserror::Error;

/// Errors that can occur while reading an uploaded file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV record.
    #[error("failed to parse CSV at line {line}: {message}")]
    CsvParse { line: u64, message: String },

    /// The input has no header line.
    #[error("CSV input is empty")]
    EmptyCsv,

    /// Two columns share the same header text.
    #[error("duplicate header '{header}' in columns {first} and {second}")]
    DuplicateHeader {
        header: String,
        first: usize,
        second: usize,
    },
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map_or(0, csv::Position::line);
        Self::CsvParse {
            line,
            message: err.to_string(),
        }
    }
}

impl From<IngestError> for ReconError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::FileRead { source, .. } | IngestError::FileWrite { source, .. } => {
                ReconError::Io(source)
            }
            other => ReconError::Message(other.to_string()),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
