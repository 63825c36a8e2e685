//! Composite keys and duplicate grouping.

use std::collections::HashMap;

use recon_model::{DuplicateGroup, MatchFieldSet, Row};
use tracing::{debug, info};

use crate::error::{DedupeError, Result};

/// Pipe-joined `field:value` pairs over the match fields in canonical order.
///
/// `\`, `|` and `:` inside values are backslash-escaped, so two keys are
/// equal only when every value is. Values are compared as-is, so two empty
/// values are equal.
pub fn composite_key(row: &Row, fields: &MatchFieldSet) -> String {
    fields
        .iter()
        .map(|field| format!("{}:{}", field.key(), escape_value(row.get(field))))
        .collect::<Vec<_>>()
        .join("|")
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '|' | ':') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Group rows whose match-field values are pairwise equal.
///
/// Only value tuples shared by two or more rows produce a group. Groups
/// appear in the order their values were first seen; members keep file
/// order. The group key is the row's [`composite_key`].
pub fn find_duplicate_groups(rows: &[Row], fields: &MatchFieldSet) -> Result<Vec<DuplicateGroup>> {
    if fields.is_empty() {
        return Err(DedupeError::NoMatchFields);
    }

    let mut order: Vec<(Vec<&str>, String)> = Vec::new();
    let mut members: HashMap<Vec<&str>, Vec<usize>> = HashMap::new();
    for row in rows {
        let values: Vec<&str> = fields.iter().map(|field| row.get(field)).collect();
        let entry = members.entry(values.clone()).or_default();
        if entry.is_empty() {
            order.push((values, composite_key(row, fields)));
        }
        entry.push(row.original_index);
    }

    let groups: Vec<DuplicateGroup> = order
        .into_iter()
        .filter_map(|(values, key)| {
            let indices = members.remove(&values)?;
            (indices.len() >= 2).then_some(DuplicateGroup {
                key,
                members: indices,
            })
        })
        .collect();

    for group in &groups {
        debug!(members = group.len(), "duplicate group");
    }
    info!(
        rows = rows.len(),
        fields = %fields.signature(),
        groups = groups.len(),
        "duplicate grouping complete"
    );
    Ok(groups)
}

/// Inputs the cached groups were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStamp {
    pub rows_revision: u64,
    pub mapping_revision: u64,
    pub signature: String,
}

/// Duplicate groups memoized on row revision, mapping revision and
/// match-field signature.
#[derive(Debug, Clone, Default)]
pub struct GroupCache {
    stamp: Option<CacheStamp>,
    groups: Vec<DuplicateGroup>,
    computations: usize,
}

impl GroupCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups for the given inputs, recomputed only when the stamp changed.
    pub fn get(
        &mut self,
        rows: &[Row],
        fields: &MatchFieldSet,
        rows_revision: u64,
        mapping_revision: u64,
    ) -> Result<&[DuplicateGroup]> {
        let stamp = CacheStamp {
            rows_revision,
            mapping_revision,
            signature: fields.signature(),
        };
        if self.stamp.as_ref() != Some(&stamp) {
            self.invalidate();
            self.groups = find_duplicate_groups(rows, fields)?;
            self.stamp = Some(stamp);
            self.computations += 1;
        }
        Ok(&self.groups)
    }

    /// Last computed groups, if any.
    #[must_use]
    pub fn cached(&self) -> Option<&[DuplicateGroup]> {
        self.stamp.as_ref().map(|_| self.groups.as_slice())
    }

    #[must_use]
    pub fn stamp(&self) -> Option<&CacheStamp> {
        self.stamp.as_ref()
    }

    /// Number of times groups were recomputed.
    #[must_use]
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn invalidate(&mut self) {
        self.stamp = None;
        self.groups.clear();
    }
}

#[cfg(test)]
mod tests {
    use recon_model::CanonicalField;

    use super::*;

    #[test]
    fn empty_values_compare_equal() {
        let fields: MatchFieldSet = [CanonicalField::AppName, CanonicalField::AppId]
            .into_iter()
            .collect();
        let rows = vec![
            Row::new(0).with(CanonicalField::AppName, "Chess Club"),
            Row::new(1)
                .with(CanonicalField::AppName, "Chess Club")
                .with(CanonicalField::AppId, ""),
        ];
        let groups = find_duplicate_groups(&rows, &fields).expect("fields selected");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![0, 1]);
    }

    #[test]
    fn cache_recomputes_only_on_change() {
        let mut fields = MatchFieldSet::new();
        fields.insert(CanonicalField::AppName);
        let rows = vec![
            Row::new(0).with(CanonicalField::AppName, "A"),
            Row::new(1).with(CanonicalField::AppName, "A"),
        ];
        let mut cache = GroupCache::new();
        assert_eq!(cache.get(&rows, &fields, 0, 0).expect("groups").len(), 1);
        cache.get(&rows, &fields, 0, 0).expect("groups");
        assert_eq!(cache.computations(), 1);

        cache.get(&rows, &fields, 1, 0).expect("groups");
        fields.insert(CanonicalField::Country);
        cache.get(&rows, &fields, 1, 0).expect("groups");
        assert_eq!(cache.computations(), 3);

        let err = cache
            .get(&rows, &MatchFieldSet::new(), 1, 0)
            .expect_err("no fields");
        assert_eq!(err, DedupeError::NoMatchFields);
        assert!(cache.cached().is_none());
    }
}
