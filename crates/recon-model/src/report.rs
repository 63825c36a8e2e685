//! Finalized output, notification payload and analysis result.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::CanonicalField;

/// Bucket a finalized record lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutcome {
    /// No remote duplicate.
    New,
    /// Remote duplicate resolved with replace or merge.
    Updated,
    /// Remote duplicate kept as is.
    Unchanged,
}

impl RecordOutcome {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record after intra-file and remote resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalRecord {
    pub original_index: usize,
    #[serde(flatten)]
    pub fields: BTreeMap<CanonicalField, String>,
    pub root_domain: String,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
    pub outcome: RecordOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

impl FinalRecord {
    #[must_use]
    pub fn get(&self, field: CanonicalField) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }
}

/// Count triple of a finalized import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_processed: usize,
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ImportSummary {
    /// True when the buckets account for every processed record.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.new + self.updated + self.unchanged == self.total_processed
    }
}

/// Overall outcome attached to the notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    pub rejected_rows: usize,
    pub lookup_failures: usize,
    pub completed_at: DateTime<Utc>,
}

/// Opaque payload handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub scope_id: Option<String>,
    pub new_records: Vec<FinalRecord>,
    pub updated_records: Vec<FinalRecord>,
    pub unchanged_records: Vec<FinalRecord>,
    pub summary: ImportSummary,
    pub import_outcome: ImportOutcome,
}

/// Counts reported by a full analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCounts {
    pub parsed_rows: usize,
    pub duplicate_groups: usize,
    /// Rows removed by collapsing duplicate groups.
    pub collapsed_rows: usize,
    pub rejected_rows: usize,
    pub lookup_failures: usize,
    pub summary: ImportSummary,
}

/// Top-level result of an analysis. Always produced, even on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,
    pub message: String,
    pub counts: AnalysisCounts,
    pub errors: Vec<String>,
    /// `None` when no delivery was attempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_delivered: Option<bool>,
}

impl AnalysisResult {
    /// A failed result carrying a single error message.
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}
