//! Per-group resolution choices and the collapse into survivors.

use std::collections::{BTreeMap, HashMap};

use recon_model::{CanonicalField, CsvAction, CsvResolution, DuplicateGroup, Row};
use tracing::{debug, info};

use crate::error::{DedupeError, Result};

/// Resolutions keyed by group key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvResolutions {
    entries: BTreeMap<String, CsvResolution>,
}

impl CsvResolutions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CsvResolution> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CsvResolution)> {
        self.entries.iter().map(|(key, res)| (key.as_str(), res))
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

    /// Give every group the same action, discarding earlier choices.
    pub fn apply_bulk_action(&mut self, groups: &[DuplicateGroup], action: CsvAction) {
        self.entries = groups
            .iter()
            .map(|group| (group.key.clone(), initial_resolution(group, action)))
            .collect();
        info!(groups = groups.len(), action = %action, "bulk action applied");
    }

    /// Add the default for groups without a resolution and drop keys that no
    /// longer name a group.
    pub fn ensure_defaults(&mut self, groups: &[DuplicateGroup], action: CsvAction) {
        self.entries
            .retain(|key, _| groups.iter().any(|group| &group.key == key));
        for group in groups {
            if !self.entries.contains_key(&group.key) {
                self.entries
                    .insert(group.key.clone(), initial_resolution(group, action));
            }
        }
    }

    /// Override the action of one group.
    ///
    /// Keep actions recompute the survivor. Merge and skip keep an earlier
    /// survivor choice while it is still a member, and any merge map.
    pub fn set_group_action(
        &mut self,
        groups: &[DuplicateGroup],
        key: &str,
        action: CsvAction,
    ) -> Result<()> {
        let group = find_group(groups, key)?;
        let entry = self.entries.entry(group.key.clone()).or_default();
        entry.action = action;
        entry.selected_index = match action {
            CsvAction::KeepFirst => group.first(),
            CsvAction::KeepLast => group.last(),
            CsvAction::Merge | CsvAction::Skip => {
                entry.selected_index.filter(|idx| group.contains(*idx))
            }
        };
        debug!(action = %action, "group action set");
        Ok(())
    }

    /// Choose the surviving row of a group explicitly.
    pub fn select_member(
        &mut self,
        groups: &[DuplicateGroup],
        key: &str,
        original_index: usize,
    ) -> Result<()> {
        let group = find_group(groups, key)?;
        if !group.contains(original_index) {
            return Err(DedupeError::NotAMember {
                key: key.to_string(),
                index: original_index,
            });
        }
        self.entries
            .entry(group.key.clone())
            .or_insert_with(|| initial_resolution(group, CsvAction::KeepFirst))
            .selected_index = Some(original_index);
        Ok(())
    }

    /// Take `field` from the member at `position` (0-based) when merging.
    pub fn set_merge_field(
        &mut self,
        groups: &[DuplicateGroup],
        key: &str,
        field: CanonicalField,
        position: usize,
    ) -> Result<()> {
        let group = find_group(groups, key)?;
        if position >= group.len() {
            return Err(DedupeError::MemberOutOfRange {
                key: key.to_string(),
                position,
                len: group.len(),
            });
        }
        self.entries
            .entry(group.key.clone())
            .or_insert_with(|| initial_resolution(group, CsvAction::Merge))
            .merge_fields
            .insert(field, position);
        Ok(())
    }
}

fn find_group<'a>(groups: &'a [DuplicateGroup], key: &str) -> Result<&'a DuplicateGroup> {
    groups
        .iter()
        .find(|group| group.key == key)
        .ok_or_else(|| DedupeError::UnknownGroup {
            key: key.to_string(),
        })
}

fn initial_resolution(group: &DuplicateGroup, action: CsvAction) -> CsvResolution {
    let selected_index = match action {
        CsvAction::KeepFirst => group.first(),
        CsvAction::KeepLast => group.last(),
        CsvAction::Merge | CsvAction::Skip => None,
    };
    CsvResolution {
        action,
        selected_index,
        merge_fields: BTreeMap::new(),
    }
}

/// Collapse every group into its survivors.
///
/// Rows in no group pass through. Output is in original file order. A group
/// without a resolution collapses as keep-first. Applying this to its own
/// output with the same groups returns the same rows.
pub fn resolve_survivors(
    rows: &[Row],
    groups: &[DuplicateGroup],
    resolutions: &CsvResolutions,
) -> Vec<Row> {
    let by_index: HashMap<usize, &Row> = rows.iter().map(|row| (row.original_index, row)).collect();
    let grouped: HashMap<usize, usize> = groups
        .iter()
        .enumerate()
        .flat_map(|(gi, group)| group.members.iter().map(move |idx| (*idx, gi)))
        .collect();

    let mut survivors: Vec<Row> = rows
        .iter()
        .filter(|row| !grouped.contains_key(&row.original_index))
        .cloned()
        .collect();

    let fallback = CsvResolution::default();
    for group in groups {
        let resolution = resolutions.get(&group.key).unwrap_or(&fallback);
        let present: Vec<&Row> = group
            .members
            .iter()
            .filter_map(|idx| by_index.get(idx).copied())
            .collect();
        if let Some(row) = collapse_group(group, resolution, &present) {
            survivors.push(row);
        }
    }

    survivors.sort_by_key(|row| row.original_index);
    survivors
}

fn collapse_group(
    group: &DuplicateGroup,
    resolution: &CsvResolution,
    present: &[&Row],
) -> Option<Row> {
    match resolution.action {
        CsvAction::Skip => None,
        CsvAction::KeepFirst | CsvAction::KeepLast => {
            let chosen = resolution
                .selected_index
                .and_then(|idx| present.iter().find(|row| row.original_index == idx));
            let fallback = if resolution.action == CsvAction::KeepLast {
                present.last()
            } else {
                present.first()
            };
            chosen.or(fallback).map(|row| (*row).clone())
        }
        CsvAction::Merge => {
            let mut merged = (*present.first()?).clone();
            for field in CanonicalField::ALL {
                let position = resolution.merge_position(field);
                if position == 0 {
                    continue;
                }
                let source = group
                    .members
                    .get(position)
                    .and_then(|idx| present.iter().find(|row| row.original_index == *idx));
                if let Some(source) = source {
                    merged.set(field, source.get(field));
                }
            }
            Some(merged)
        }
    }
}

/// Row counts before and after collapsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseStats {
    pub input_rows: usize,
    pub groups: usize,
    /// Rows folded into a survivor by keep or merge.
    pub collapsed: usize,
    /// Rows dropped because their group was skipped.
    pub skipped: usize,
    pub survivors: usize,
}

impl CollapseStats {
    /// Every row that did not survive.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.collapsed + self.skipped
    }
}

/// Count what [`resolve_survivors`] drops.
pub fn collapse_stats(
    rows: &[Row],
    groups: &[DuplicateGroup],
    resolutions: &CsvResolutions,
) -> CollapseStats {
    let mut stats = CollapseStats {
        input_rows: rows.len(),
        groups: groups.len(),
        ..CollapseStats::default()
    };
    for group in groups {
        let present = group
            .members
            .iter()
            .filter(|idx| rows.iter().any(|row| row.original_index == **idx))
            .count();
        if present == 0 {
            continue;
        }
        match resolutions.get(&group.key).map(|r| r.action) {
            Some(CsvAction::Skip) => stats.skipped += present,
            _ => stats.collapsed += present - 1,
        }
    }
    stats.survivors = stats.input_rows - stats.removed();
    stats
}
