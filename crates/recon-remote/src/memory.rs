//! Remote store held in memory, loadable from a JSON export.

use std::fs;
use std::path::Path;

use recon_model::{RemoteCandidate, RemoteRecord, Row};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{RemoteError, Result};
use crate::record::{AirtablePage, AirtableRecord};
use crate::store::RemoteStore;

/// Snapshot of remote records with the same filter semantics as the
/// Airtable client.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Vec<RemoteRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    List(Vec<AirtableRecord>),
    Page(AirtablePage),
}

impl InMemoryStore {
    #[must_use]
    pub fn new(records: Vec<RemoteRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON export: either a bare `[{id, fields}]` list or an
    /// Airtable `{"records": [...]}` page.
    pub fn from_json_str(text: &str, scope_field: &str) -> Result<Self> {
        let raw = match serde_json::from_str::<Snapshot>(text)? {
            Snapshot::List(list) => list,
            Snapshot::Page(page) => page.records,
        };
        let records: Vec<RemoteRecord> = raw
            .into_iter()
            .map(|record| record.into_remote(scope_field))
            .collect();
        Ok(Self { records })
    }

    /// Load a JSON export from disk.
    pub fn load(path: &Path, scope_field: &str) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| RemoteError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&text, scope_field)?;
        info!(path = %path.display(), records = store.len(), "loaded remote snapshot");
        Ok(store)
    }

    pub fn push(&mut self, record: RemoteRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RemoteStore for InMemoryStore {
    fn fetch_all(&self) -> Result<Vec<RemoteRecord>> {
        Ok(self.records.clone())
    }

    fn find_duplicates(&self, row: &Row, scope_id: &str) -> Result<Vec<RemoteCandidate>> {
        let candidates: Vec<RemoteCandidate> = self
            .records
            .iter()
            .filter(|record| record.scope.as_deref() == Some(scope_id))
            .filter_map(|record| {
                let matched_on = record.matched_fields(row);
                (!matched_on.is_empty()).then(|| RemoteCandidate {
                    record: record.clone(),
                    matched_on,
                })
            })
            .collect();
        debug!(
            row = row.original_index,
            candidates = candidates.len(),
            "snapshot lookup"
        );
        Ok(candidates)
    }
}
