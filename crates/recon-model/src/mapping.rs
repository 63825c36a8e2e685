//! Header-to-slot assignments.

use std::collections::BTreeMap;

use crate::field::{CanonicalField, FieldSlot};

/// Mapping from slot to the CSV header it is sourced from.
///
/// Each header appears in at most one entry: [`FieldMapping::insert`]
/// removes any earlier entry holding the same header before inserting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: BTreeMap<FieldSlot, String>,
}

impl FieldMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `slot` to `header`.
    ///
    /// Returns the header that previously occupied `slot`, if it differs.
    pub fn insert(&mut self, slot: FieldSlot, header: impl Into<String>) -> Option<String> {
        let header = header.into();
        self.entries.retain(|_, existing| *existing != header);
        self.entries
            .insert(slot, header.clone())
            .filter(|previous| *previous != header)
    }

    /// Remove a slot; returns the header it held.
    pub fn remove(&mut self, slot: &FieldSlot) -> Option<String> {
        self.entries.remove(slot)
    }

    #[must_use]
    pub fn header_for(&self, slot: &FieldSlot) -> Option<&str> {
        self.entries.get(slot).map(String::as_str)
    }

    #[must_use]
    pub fn header_for_field(&self, field: CanonicalField) -> Option<&str> {
        self.header_for(&FieldSlot::Canonical(field))
    }

    #[must_use]
    pub fn slot_for(&self, header: &str) -> Option<&FieldSlot> {
        self.entries
            .iter()
            .find_map(|(slot, mapped)| (mapped == header).then_some(slot))
    }

    #[must_use]
    pub fn contains_field(&self, field: CanonicalField) -> bool {
        self.entries.contains_key(&FieldSlot::Canonical(field))
    }

    /// Headers held by custom slots, in slot order.
    #[must_use]
    pub fn custom_headers(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(slot, _)| slot.is_custom())
            .map(|(_, header)| header.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldSlot, &str)> {
        self.entries
            .iter()
            .map(|(slot, header)| (slot, header.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
