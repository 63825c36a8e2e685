//! Choices made against matched remote records.

use std::collections::BTreeMap;

use recon_model::{
    CanonicalField, FieldSource, RemoteAction, RemoteCandidate, RemoteMatch, RemoteRecord,
    RemoteResolution, Row,
};
use tracing::debug;

use crate::error::{RemoteError, Result};

/// Resolutions keyed by remote record id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteResolutions {
    entries: BTreeMap<String, RemoteResolution>,
}

impl RemoteResolutions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the default (keep, all existing) for every record id not seen
    /// before. Earlier choices are preserved. Returns how many were added.
    pub fn register(&mut self, matches: &[RemoteMatch]) -> usize {
        let mut added = 0;
        for candidate in matches.iter().flat_map(|m| &m.candidates) {
            if !self.entries.contains_key(&candidate.record.id) {
                self.entries
                    .insert(candidate.record.id.clone(), RemoteResolution::default());
                added += 1;
            }
        }
        debug!(added, total = self.entries.len(), "remote records registered");
        added
    }

    #[must_use]
    pub fn get(&self, record_id: &str) -> Option<&RemoteResolution> {
        self.entries.get(record_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RemoteResolution)> {
        self.entries.iter().map(|(id, res)| (id.as_str(), res))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn set_action(&mut self, record_id: &str, action: RemoteAction) -> Result<()> {
        self.entry_mut(record_id)?.action = action;
        debug!(record = record_id, action = %action, "remote action set");
        Ok(())
    }

    /// Give every registered record the same action.
    pub fn set_all(&mut self, action: RemoteAction) {
        for resolution in self.entries.values_mut() {
            resolution.action = action;
        }
    }

    pub fn set_field_source(
        &mut self,
        record_id: &str,
        field: CanonicalField,
        source: FieldSource,
    ) -> Result<()> {
        self.entry_mut(record_id)?.fields.insert(field, source);
        Ok(())
    }

    /// Candidate a row is resolved against and the resolution to use.
    ///
    /// The first candidate whose action updates the record wins; otherwise
    /// the first candidate is kept. `None` when the row has no candidates.
    #[must_use]
    pub fn choose<'a>(&self, found: &'a RemoteMatch) -> Option<(&'a RemoteCandidate, RemoteResolution)> {
        let resolution_of = |candidate: &RemoteCandidate| {
            self.get(&candidate.record.id).cloned().unwrap_or_default()
        };
        found
            .candidates
            .iter()
            .map(|candidate| (candidate, resolution_of(candidate)))
            .find(|(_, resolution)| resolution.action.updates())
            .or_else(|| {
                found
                    .candidates
                    .first()
                    .map(|candidate| (candidate, resolution_of(candidate)))
            })
    }

    fn entry_mut(&mut self, record_id: &str) -> Result<&mut RemoteResolution> {
        self.entries
            .get_mut(record_id)
            .ok_or_else(|| RemoteError::UnknownRecord {
                id: record_id.to_string(),
            })
    }
}

/// Canonical values after resolving an imported row against a remote record.
///
/// Keep takes every existing value. Replace takes every imported value.
/// Merge follows the per-field source; an empty imported value falls back
/// to the existing one.
#[must_use]
pub fn apply_resolution(
    row: &Row,
    record: &RemoteRecord,
    resolution: &RemoteResolution,
) -> BTreeMap<CanonicalField, String> {
    CanonicalField::ALL
        .into_iter()
        .map(|field| {
            let existing = record.get(field);
            let imported = row.get(field);
            let value = match resolution.action {
                RemoteAction::Keep => existing,
                RemoteAction::Replace => imported,
                RemoteAction::Merge => match resolution.source(field) {
                    FieldSource::Imported if !imported.trim().is_empty() => imported,
                    _ => existing,
                },
            };
            (field, value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> RemoteCandidate {
        RemoteCandidate {
            record: RemoteRecord::new(id),
            matched_on: vec![CanonicalField::AppName],
        }
    }

    fn found(ids: &[&str]) -> RemoteMatch {
        RemoteMatch {
            row_index: 0,
            snapshot: BTreeMap::new(),
            candidates: ids.iter().map(|id| candidate(id)).collect(),
        }
    }

    #[test]
    fn register_preserves_earlier_choices() {
        let mut resolutions = RemoteResolutions::new();
        assert_eq!(resolutions.register(&[found(&["rec1"])]), 1);
        resolutions
            .set_action("rec1", RemoteAction::Replace)
            .expect("registered");
        assert_eq!(resolutions.register(&[found(&["rec1", "rec2"])]), 1);
        assert_eq!(
            resolutions.get("rec1").map(|r| r.action),
            Some(RemoteAction::Replace)
        );
        assert_eq!(resolutions.get("rec2").map(|r| r.action), Some(RemoteAction::Keep));
    }

    #[test]
    fn unknown_record_is_an_error() {
        let mut resolutions = RemoteResolutions::new();
        let err = resolutions
            .set_field_source("recX", CanonicalField::Country, FieldSource::Imported)
            .expect_err("not registered");
        assert!(matches!(err, RemoteError::UnknownRecord { .. }));
    }

    #[test]
    fn choose_prefers_first_updating_candidate() {
        let mut resolutions = RemoteResolutions::new();
        let row = found(&["rec1", "rec2", "rec3"]);
        resolutions.register(std::slice::from_ref(&row));

        let (chosen, resolution) = resolutions.choose(&row).expect("candidates");
        assert_eq!(chosen.record.id, "rec1");
        assert_eq!(resolution.action, RemoteAction::Keep);

        resolutions
            .set_action("rec2", RemoteAction::Merge)
            .expect("registered");
        resolutions
            .set_action("rec3", RemoteAction::Replace)
            .expect("registered");
        let (chosen, _) = resolutions.choose(&row).expect("candidates");
        assert_eq!(chosen.record.id, "rec2");

        assert!(resolutions.choose(&found(&[])).is_none());
    }
}
