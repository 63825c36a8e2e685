//! Records held in the remote store and the choices made against them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::CanonicalField;
use crate::row::Row;

/// Fields compared against the remote store. Any one equal value is a match.
pub const IDENTITY_FIELDS: [CanonicalField; 4] = [
    CanonicalField::AppName,
    CanonicalField::AppId,
    CanonicalField::GooglePlayId,
    CanonicalField::SensorTowerId,
];

/// A record fetched from the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRecord {
    pub id: String,
    pub fields: BTreeMap<CanonicalField, String>,
    /// Value of the scope column, if the record carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    /// Remote columns outside the canonical set.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl RemoteRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with(mut self, field: CanonicalField, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn get(&self, field: CanonicalField) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }

    /// Identity fields whose non-empty imported value equals this record's.
    #[must_use]
    pub fn matched_fields(&self, row: &Row) -> Vec<CanonicalField> {
        IDENTITY_FIELDS
            .into_iter()
            .filter(|field| {
                let imported = row.get(*field).trim();
                !imported.is_empty() && imported == self.get(*field).trim()
            })
            .collect()
    }
}

/// A remote record that matched an imported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCandidate {
    pub record: RemoteRecord,
    /// Identity fields that produced the match.
    pub matched_on: Vec<CanonicalField>,
}

/// Outcome of looking up one surviving row in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMatch {
    /// Original index of the imported row.
    pub row_index: usize,
    /// Field values of the imported row at lookup time.
    pub snapshot: BTreeMap<CanonicalField, String>,
    pub candidates: Vec<RemoteCandidate>,
}

impl RemoteMatch {
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}

/// What to do with an existing remote record that duplicates an imported row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteAction {
    /// Existing values win.
    #[default]
    Keep,
    /// Imported values fully supersede existing ones.
    Replace,
    /// Field-by-field choice.
    Merge,
}

impl RemoteAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Replace => "replace",
            Self::Merge => "merge",
        }
    }

    /// Replace and merge both change the existing record.
    #[must_use]
    pub const fn updates(self) -> bool {
        matches!(self, Self::Replace | Self::Merge)
    }
}

impl fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side supplies a field's value under merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    #[default]
    Existing,
    Imported,
}

/// Resolution for one remote record, keyed externally by record id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteResolution {
    pub action: RemoteAction,
    pub fields: BTreeMap<CanonicalField, FieldSource>,
}

impl Default for RemoteResolution {
    fn default() -> Self {
        Self {
            action: RemoteAction::Keep,
            fields: CanonicalField::ALL
                .into_iter()
                .map(|field| (field, FieldSource::Existing))
                .collect(),
        }
    }
}

impl RemoteResolution {
    #[must_use]
    pub fn source(&self, field: CanonicalField) -> FieldSource {
        self.fields.get(&field).copied().unwrap_or_default()
    }
}
