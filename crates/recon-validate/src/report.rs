//! Validation report over the surviving rows.

use std::collections::BTreeMap;

use recon_model::Row;
use serde::{Deserialize, Serialize};

use crate::issue::{Issue, Severity};

/// Per-row issues, keyed by original index. Rows without issues are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub rows_checked: usize,
    pub issues: BTreeMap<usize, Vec<Issue>>,
}

impl ValidationReport {
    pub fn new(rows_checked: usize) -> Self {
        Self {
            rows_checked,
            issues: BTreeMap::new(),
        }
    }

    /// Replace the issues recorded for one row.
    pub fn record(&mut self, original_index: usize, issues: Vec<Issue>) {
        if issues.is_empty() {
            self.issues.remove(&original_index);
        } else {
            self.issues.insert(original_index, issues);
        }
    }

    pub fn issues_for(&self, original_index: usize) -> &[Issue] {
        self.issues
            .get(&original_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A row is rejected when it carries at least one error.
    pub fn is_rejected(&self, original_index: usize) -> bool {
        self.issues_for(original_index)
            .iter()
            .any(|issue| issue.severity() == Severity::Error)
    }

    /// Original indices of rejected rows, ascending.
    pub fn rejected_indices(&self) -> Vec<usize> {
        self.issues
            .keys()
            .copied()
            .filter(|idx| self.is_rejected(*idx))
            .collect()
    }

    /// Rows that may proceed to the remote stage, in input order.
    pub fn accepted_rows(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter()
            .filter(|row| !self.is_rejected(row.original_index))
            .cloned()
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected_indices().len()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues
            .values()
            .flatten()
            .filter(|issue| issue.severity() == severity)
            .count()
    }
}
