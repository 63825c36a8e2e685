//! Shared data model for the CSV import reconciler.
//!
//! Every pipeline stage (ingest, map, validate, dedupe, remote, report)
//! exchanges the types defined here:
//!
//! - [`CanonicalField`] / [`FieldSlot`]: the fixed target schema and custom slots
//! - [`Row`]: one imported spreadsheet row after column mapping
//! - [`FieldMapping`]: header-to-slot assignments
//! - [`DuplicateGroup`] / [`CsvResolution`]: intra-file duplicates and their resolution
//! - [`RemoteMatch`] / [`RemoteResolution`]: duplicates found in the remote store
//! - [`FinalRecord`] / [`NotificationPayload`] / [`AnalysisResult`]: finalized output

pub mod dedupe;
pub mod error;
pub mod field;
pub mod mapping;
pub mod remote;
pub mod report;
pub mod row;

pub use dedupe::{CsvAction, CsvResolution, DuplicateGroup, MatchFieldSet};
pub use error::{ErrorKind, ReconError, Result};
pub use field::{CUSTOM_FIELD_PREFIX, CanonicalField, FieldSlot};
pub use mapping::FieldMapping;
pub use remote::{
    FieldSource, IDENTITY_FIELDS, RemoteAction, RemoteCandidate, RemoteMatch, RemoteRecord,
    RemoteResolution,
};
pub use report::{
    AnalysisCounts, AnalysisResult, FinalRecord, ImportOutcome, ImportSummary,
    NotificationPayload, RecordOutcome,
};
pub use row::Row;
