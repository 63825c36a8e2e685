//! Airtable wire format and its conversion into [`RemoteRecord`].

use std::collections::BTreeMap;

use recon_model::{CanonicalField, RemoteRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record as returned by the Airtable REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    /// Column label → cell value.
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

/// One page of a list-records response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirtablePage {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,
    /// Present while more pages remain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl AirtableRecord {
    /// Sort columns into canonical fields, the scope column and extras.
    ///
    /// Columns are matched to canonical fields by display label, the same
    /// way CSV headers are.
    pub fn into_remote(self, scope_field: &str) -> RemoteRecord {
        let mut record = RemoteRecord::new(self.id);
        record.created_time = self.created_time;
        for (column, value) in self.fields {
            let Some(text) = cell_text(&value) else {
                continue;
            };
            if column == scope_field {
                record.scope = Some(text);
            } else if let Some(field) = CanonicalField::from_label(&column) {
                record.fields.insert(field, text);
            } else {
                record.extra.insert(column, text);
            }
        }
        record
    }
}

/// Text form of a cell. Lists (linked records, multi-selects) join with
/// `", "`; nulls are skipped.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(cell_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sorts_columns_by_label() {
        let raw: AirtableRecord = serde_json::from_value(json!({
            "id": "rec1",
            "createdTime": "2024-03-01T10:00:00.000Z",
            "fields": {
                "App Name": "Chess Club",
                "Scope ID": "scope-7",
                "Monthly Downloads": 120000,
                "Tags": ["games", "board"],
                "Notes": null
            }
        }))
        .expect("valid record");
        let record = raw.into_remote("Scope ID");

        assert_eq!(record.get(CanonicalField::AppName), "Chess Club");
        assert_eq!(record.scope.as_deref(), Some("scope-7"));
        assert_eq!(
            record.extra.get("Monthly Downloads").map(String::as_str),
            Some("120000")
        );
        assert_eq!(record.extra.get("Tags").map(String::as_str), Some("games, board"));
        assert!(!record.extra.contains_key("Notes"));
    }
}
