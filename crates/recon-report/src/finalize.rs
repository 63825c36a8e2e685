//! Bucket surviving rows into new, updated and unchanged records.

use std::collections::{BTreeMap, HashMap};

use recon_model::{
    CanonicalField, FieldMapping, FinalRecord, ImportSummary, RecordOutcome, RemoteMatch, Row,
};
use recon_remote::{RemoteResolutions, apply_resolution};
use tracing::{debug, info};

use crate::domain::extract_root_domain;

/// Reconciled records with their summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizedImport {
    /// Records in original file order.
    pub records: Vec<FinalRecord>,
    pub summary: ImportSummary,
}

impl FinalizedImport {
    pub fn by_outcome(&self, outcome: RecordOutcome) -> impl Iterator<Item = &FinalRecord> {
        self.records
            .iter()
            .filter(move |record| record.outcome == outcome)
    }

    #[must_use]
    pub fn new_records(&self) -> Vec<FinalRecord> {
        self.by_outcome(RecordOutcome::New).cloned().collect()
    }

    #[must_use]
    pub fn updated_records(&self) -> Vec<FinalRecord> {
        self.by_outcome(RecordOutcome::Updated).cloned().collect()
    }

    #[must_use]
    pub fn unchanged_records(&self) -> Vec<FinalRecord> {
        self.by_outcome(RecordOutcome::Unchanged).cloned().collect()
    }
}

/// Apply the remote resolutions to every survivor.
///
/// Rows without a candidate are new. Rows with candidates are resolved
/// against the chosen one: replace and merge make them updated, keep makes
/// them unchanged. Custom fields are limited to columns the mapping holds in
/// custom slots, and the root domain comes from the resolved website.
pub fn finalize(
    survivors: &[Row],
    matches: &[RemoteMatch],
    resolutions: &RemoteResolutions,
    mapping: &FieldMapping,
) -> FinalizedImport {
    let by_row: HashMap<usize, &RemoteMatch> =
        matches.iter().map(|found| (found.row_index, found)).collect();
    let custom_headers = mapping.custom_headers();

    let mut summary = ImportSummary {
        total_processed: survivors.len(),
        ..ImportSummary::default()
    };
    let mut records = Vec::with_capacity(survivors.len());
    for row in survivors {
        let chosen = by_row
            .get(&row.original_index)
            .and_then(|found| resolutions.choose(found));
        let (fields, outcome, remote_id) = match chosen {
            Some((candidate, resolution)) => {
                let outcome = if resolution.action.updates() {
                    RecordOutcome::Updated
                } else {
                    RecordOutcome::Unchanged
                };
                (
                    apply_resolution(row, &candidate.record, &resolution),
                    outcome,
                    Some(candidate.record.id.clone()),
                )
            }
            None => (row.snapshot(), RecordOutcome::New, None),
        };
        match outcome {
            RecordOutcome::New => summary.new += 1,
            RecordOutcome::Updated => summary.updated += 1,
            RecordOutcome::Unchanged => summary.unchanged += 1,
        }

        let root_domain = extract_root_domain(
            fields
                .get(&CanonicalField::CompanyWebsite)
                .map_or("", String::as_str),
        );
        let custom_fields: BTreeMap<String, String> = row
            .custom_fields
            .iter()
            .filter(|(header, _)| custom_headers.contains(&header.as_str()))
            .map(|(header, value)| (header.clone(), value.clone()))
            .collect();
        debug!(row = row.original_index, outcome = %outcome, "record finalized");

        records.push(FinalRecord {
            original_index: row.original_index,
            fields,
            root_domain,
            custom_fields,
            outcome,
            remote_id,
        });
    }
    records.sort_by_key(|record| record.original_index);

    info!(
        total = summary.total_processed,
        new = summary.new,
        updated = summary.updated,
        unchanged = summary.unchanged,
        "import finalized"
    );
    FinalizedImport { records, summary }
}
