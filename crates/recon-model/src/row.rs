use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::CanonicalField;

/// One imported spreadsheet row after column mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// 0-based position among the data rows of the parsed file.
    pub original_index: usize,
    /// Values of mapped canonical fields. Unmapped fields are absent.
    pub fields: BTreeMap<CanonicalField, String>,
    /// Values of custom slots keyed by original header text.
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

impl Row {
    #[must_use]
    pub fn new(original_index: usize) -> Self {
        Self {
            original_index,
            ..Self::default()
        }
    }

    /// Builder-style setter, mostly for tests and fixtures.
    #[must_use]
    pub fn with(mut self, field: CanonicalField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Value of a canonical field; absent fields read as empty.
    #[must_use]
    pub fn get(&self, field: CanonicalField) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }

    pub fn set(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// True when the field is absent or contains only whitespace.
    #[must_use]
    pub fn is_blank(&self, field: CanonicalField) -> bool {
        self.get(field).trim().is_empty()
    }

    /// Snapshot of every canonical field, absent ones as empty strings.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<CanonicalField, String> {
        CanonicalField::ALL
            .into_iter()
            .map(|field| (field, self.get(field).to_string()))
            .collect()
    }
}
