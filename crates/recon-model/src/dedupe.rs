//! Intra-file duplicate groups and their resolutions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::CanonicalField;

/// User-selected fields whose values must all be equal for two rows to be
/// considered duplicates.
///
/// Stored in canonical order regardless of selection order, so the
/// signature and composite keys are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchFieldSet {
    fields: BTreeSet<CanonicalField>,
}

impl MatchFieldSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the field was already selected.
    pub fn insert(&mut self, field: CanonicalField) -> bool {
        self.fields.insert(field)
    }

    pub fn remove(&mut self, field: CanonicalField) -> bool {
        self.fields.remove(&field)
    }

    /// Select the field if absent, deselect it otherwise.
    pub fn toggle(&mut self, field: CanonicalField) {
        if !self.fields.remove(&field) {
            self.fields.insert(field);
        }
    }

    #[must_use]
    pub fn contains(&self, field: CanonicalField) -> bool {
        self.fields.contains(&field)
    }

    /// Selected fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.fields.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Stable serialized form used to detect selection changes.
    #[must_use]
    pub fn signature(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.key())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<CanonicalField> for MatchFieldSet {
    fn from_iter<I: IntoIterator<Item = CanonicalField>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Rows of the imported file sharing one composite key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Pipe-joined `field:value` pairs over the match fields.
    pub key: String,
    /// Original indices of the member rows, in file order. Always ≥ 2.
    pub members: Vec<usize>,
}

impl DuplicateGroup {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.members.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.members.last().copied()
    }

    #[must_use]
    pub fn contains(&self, original_index: usize) -> bool {
        self.members.contains(&original_index)
    }
}

/// How a duplicate group collapses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CsvAction {
    #[default]
    KeepFirst,
    KeepLast,
    /// Combine members field by field into one record.
    Merge,
    /// Drop every member of the group.
    Skip,
}

impl CsvAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::KeepFirst => "keep-first",
            Self::KeepLast => "keep-last",
            Self::Merge => "merge",
            Self::Skip => "skip",
        }
    }

    #[must_use]
    pub const fn keeps_single_row(self) -> bool {
        matches!(self, Self::KeepFirst | Self::KeepLast)
    }
}

impl fmt::Display for CsvAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolution chosen for one duplicate group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvResolution {
    pub action: CsvAction,
    /// Original index of the surviving row for keep actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,
    /// Field → member position (0-based within the group) for merge.
    /// Fields not listed take the first member's value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub merge_fields: BTreeMap<CanonicalField, usize>,
}

impl CsvResolution {
    /// Member position supplying `field` under merge.
    #[must_use]
    pub fn merge_position(&self, field: CanonicalField) -> usize {
        self.merge_fields.get(&field).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_ignores_selection_order() {
        let a: MatchFieldSet = [CanonicalField::CompanyWebsite, CanonicalField::AppName]
            .into_iter()
            .collect();
        let mut b = MatchFieldSet::new();
        b.insert(CanonicalField::AppName);
        b.insert(CanonicalField::CompanyWebsite);
        assert_eq!(a.signature(), "appName,companyWebsite");
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn merge_position_defaults_to_first_member() {
        let mut resolution = CsvResolution {
            action: CsvAction::Merge,
            ..CsvResolution::default()
        };
        assert_eq!(resolution.merge_position(CanonicalField::Country), 0);
        resolution.merge_fields.insert(CanonicalField::Country, 2);
        assert_eq!(resolution.merge_position(CanonicalField::Country), 2);
    }
}
