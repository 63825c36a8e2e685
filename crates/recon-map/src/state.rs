//! Mapping state for the column-mapping step.

use recon_ingest::CsvTable;
use recon_model::{CanonicalField, FieldMapping, FieldSlot, Row};
use tracing::{debug, info};

use crate::error::{MappingError, Result};

/// Header-to-slot assignments for one uploaded file.
///
/// Every header holds exactly one slot at all times. `revision` increases on
/// every change so downstream stages can tell when to recompute.
#[derive(Debug, Clone, Default)]
pub struct MappingState {
    headers: Vec<String>,
    mapping: FieldMapping,
    revision: u64,
}

impl MappingState {
    /// Build the initial mapping by case-insensitive label equality.
    ///
    /// When two headers match the same label, the first keeps the canonical
    /// slot and the later one becomes custom.
    pub fn auto_map(headers: &[String]) -> Self {
        let mut mapping = FieldMapping::new();
        for header in headers {
            let slot = match CanonicalField::from_label(header) {
                Some(field) if !mapping.contains_field(field) => FieldSlot::Canonical(field),
                _ => FieldSlot::custom(header.clone()),
            };
            debug!(header = %header, slot = %slot, "auto-mapped column");
            mapping.insert(slot, header.clone());
        }
        let state = Self {
            headers: headers.to_vec(),
            mapping,
            revision: 0,
        };
        let summary = state.summary();
        info!(
            columns = headers.len(),
            canonical = summary.canonical_mapped,
            custom = summary.custom,
            "auto-mapping complete"
        );
        state
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Slot currently held by a header.
    #[must_use]
    pub fn slot_for(&self, header: &str) -> Option<&FieldSlot> {
        self.mapping.slot_for(header)
    }

    /// Map a header to a slot, replacing whatever it was mapped to before.
    ///
    /// A header displaced from a canonical slot falls back to its own custom
    /// slot.
    pub fn assign(&mut self, header: &str, slot: FieldSlot) -> Result<()> {
        if !self.headers.iter().any(|h| h == header) {
            return Err(MappingError::UnknownHeader {
                header: header.to_string(),
            });
        }
        if let FieldSlot::Custom(name) = &slot
            && name != header
        {
            return Err(MappingError::CustomSlotMismatch {
                header: header.to_string(),
                slot: slot.key(),
            });
        }
        if self.mapping.slot_for(header) == Some(&slot) {
            return Ok(());
        }
        if let Some(displaced) = self.mapping.insert(slot.clone(), header) {
            debug!(header = %displaced, "column displaced to custom slot");
            self.mapping
                .insert(FieldSlot::custom(displaced.clone()), displaced);
        }
        self.revision += 1;
        debug!(header = %header, slot = %slot, "column mapped");
        Ok(())
    }

    /// Map a header onto a canonical field.
    pub fn assign_field(&mut self, header: &str, field: CanonicalField) -> Result<()> {
        self.assign(header, FieldSlot::Canonical(field))
    }

    /// Clear a canonical field; its header reverts to a custom slot.
    pub fn unassign(&mut self, field: CanonicalField) -> Option<String> {
        let header = self.mapping.remove(&FieldSlot::Canonical(field))?;
        self.mapping
            .insert(FieldSlot::custom(header.clone()), header.clone());
        self.revision += 1;
        Some(header)
    }

    /// Whether every required field has a column.
    #[must_use]
    pub fn has_required(&self) -> bool {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| field.is_required())
            .all(|field| self.mapping.contains_field(field))
    }

    /// Error naming the first required field without a column.
    pub fn ensure_required(&self) -> Result<()> {
        match CanonicalField::ALL
            .into_iter()
            .find(|field| field.is_required() && !self.mapping.contains_field(*field))
        {
            Some(field) => Err(MappingError::RequiredFieldUnmapped { field }),
            None => Ok(()),
        }
    }

    /// Headers held by custom slots.
    #[must_use]
    pub fn custom_headers(&self) -> Vec<&str> {
        self.mapping.custom_headers()
    }

    /// Build rows from a parsed table using the current mapping.
    ///
    /// Row `original_index` is the position among the table's data rows.
    #[must_use]
    pub fn apply(&self, table: &CsvTable) -> Vec<Row> {
        let columns: Vec<(usize, &FieldSlot)> = self
            .mapping
            .iter()
            .filter_map(|(slot, header)| table.column_index(header).map(|idx| (idx, slot)))
            .collect();
        table
            .rows
            .iter()
            .enumerate()
            .map(|(original_index, cells)| {
                let mut row = Row::new(original_index);
                for (column, slot) in &columns {
                    let value = cells.get(*column).cloned().unwrap_or_default();
                    match slot {
                        FieldSlot::Canonical(field) => row.set(*field, value),
                        FieldSlot::Custom(header) => {
                            row.custom_fields.insert(header.clone(), value);
                        }
                    }
                }
                row
            })
            .collect()
    }

    /// Get summary counts.
    #[must_use]
    pub fn summary(&self) -> MappingSummary {
        let missing: Vec<CanonicalField> = CanonicalField::ALL
            .into_iter()
            .filter(|field| !self.mapping.contains_field(*field))
            .collect();
        MappingSummary {
            columns: self.headers.len(),
            canonical_mapped: CanonicalField::ALL.len() - missing.len(),
            custom: self.mapping.custom_headers().len(),
            missing,
            required_mapped: self.has_required(),
        }
    }
}

/// Summary of mapping counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSummary {
    /// Number of columns in the file.
    pub columns: usize,
    /// Canonical fields with a column.
    pub canonical_mapped: usize,
    /// Columns held by custom slots.
    pub custom: usize,
    /// Canonical fields without a column, in canonical order.
    pub missing: Vec<CanonicalField>,
    /// Whether every required field is mapped.
    pub required_mapped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn same_slot_assignment_keeps_revision() {
        let mut state = MappingState::auto_map(&headers(&["App Name"]));
        state
            .assign_field("App Name", CanonicalField::AppName)
            .expect("assign");
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn second_header_with_same_label_is_custom() {
        let state = MappingState::auto_map(&headers(&["App Name", "app name"]));
        assert_eq!(
            state.slot_for("App Name"),
            Some(&FieldSlot::Canonical(CanonicalField::AppName))
        );
        assert_eq!(
            state.slot_for("app name"),
            Some(&FieldSlot::custom("app name"))
        );
    }
}
