//! Notification payload assembly.

use chrono::Utc;
use recon_model::{ImportOutcome, NotificationPayload};

use crate::finalize::FinalizedImport;

/// Outcome stamped with the current time.
pub fn import_outcome(
    success: bool,
    message: impl Into<String>,
    rejected_rows: usize,
    lookup_failures: usize,
) -> ImportOutcome {
    ImportOutcome {
        success,
        message: message.into(),
        rejected_rows,
        lookup_failures,
        completed_at: Utc::now(),
    }
}

/// Payload handed to the notification sink.
pub fn build_payload(
    scope_id: Option<&str>,
    finalized: &FinalizedImport,
    outcome: ImportOutcome,
) -> NotificationPayload {
    NotificationPayload {
        scope_id: scope_id.map(str::to_string),
        new_records: finalized.new_records(),
        updated_records: finalized.updated_records(),
        unchanged_records: finalized.unchanged_records(),
        summary: finalized.summary,
        import_outcome: outcome,
    }
}
