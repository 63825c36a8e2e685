//! Batch duplicate lookup over the surviving rows.

use std::thread;

use recon_model::{RemoteMatch, Row};
use serde::Serialize;
use tracing::{info, warn};

use crate::store::RemoteStore;

/// How many lookups run at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupMode {
    /// One row after another.
    #[default]
    Sequential,
    /// Up to `n` rows at once on scoped threads.
    Bounded(usize),
}

impl LookupMode {
    /// `Sequential` for a concurrency of 0 or 1.
    #[must_use]
    pub fn from_concurrency(concurrency: usize) -> Self {
        if concurrency <= 1 {
            Self::Sequential
        } else {
            Self::Bounded(concurrency)
        }
    }
}

/// A lookup that failed and was treated as "no match".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupFailure {
    pub row_index: usize,
    pub message: String,
}

/// Matches for every row in input order, plus the rows whose lookup failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupOutcome {
    pub matches: Vec<RemoteMatch>,
    pub failures: Vec<LookupFailure>,
    /// False when no scope was given and the store was never queried.
    pub performed: bool,
}

impl LookupOutcome {
    /// Rows with at least one remote candidate.
    #[must_use]
    pub fn matched_rows(&self) -> usize {
        self.matches.iter().filter(|m| m.has_candidates()).count()
    }
}

/// Look up every row in the store.
///
/// Without a scope id nothing is queried and every row comes back with no
/// candidates. A failed lookup is logged, recorded in `failures` and yields
/// no candidates; the batch carries on. `progress` receives
/// `(completed, total)` after each row.
pub fn run_lookups<S, P>(
    store: &S,
    rows: &[Row],
    scope_id: Option<&str>,
    mode: LookupMode,
    progress: P,
) -> LookupOutcome
where
    S: RemoteStore + Sync + ?Sized,
    P: Fn(usize, usize) + Sync,
{
    let Some(scope_id) = scope_id.filter(|s| !s.trim().is_empty()) else {
        info!(rows = rows.len(), "no scope id; remote lookup skipped");
        return LookupOutcome {
            matches: rows.iter().map(unmatched).collect(),
            failures: Vec::new(),
            performed: false,
        };
    };

    let total = rows.len();
    let results: Vec<(RemoteMatch, Option<LookupFailure>)> = match mode {
        LookupMode::Sequential | LookupMode::Bounded(0 | 1) => rows
            .iter()
            .enumerate()
            .map(|(done, row)| {
                let result = lookup_one(store, row, scope_id);
                progress(done + 1, total);
                result
            })
            .collect(),
        LookupMode::Bounded(limit) => {
            let mut results = Vec::with_capacity(total);
            for chunk in rows.chunks(limit) {
                thread::scope(|scope| {
                    let handles: Vec<_> = chunk
                        .iter()
                        .map(|row| (row, scope.spawn(move || lookup_one(store, row, scope_id))))
                        .collect();
                    for (row, handle) in handles {
                        let result = handle.join().unwrap_or_else(|_| {
                            failed(row, "lookup thread panicked".to_string())
                        });
                        results.push(result);
                        progress(results.len(), total);
                    }
                });
            }
            results
        }
    };

    let mut outcome = LookupOutcome {
        matches: Vec::with_capacity(total),
        failures: Vec::new(),
        performed: true,
    };
    for (found, failure) in results {
        outcome.matches.push(found);
        outcome.failures.extend(failure);
    }
    info!(
        rows = total,
        matched = outcome.matched_rows(),
        failures = outcome.failures.len(),
        "remote lookup complete"
    );
    outcome
}

fn lookup_one<S>(store: &S, row: &Row, scope_id: &str) -> (RemoteMatch, Option<LookupFailure>)
where
    S: RemoteStore + ?Sized,
{
    match store.find_duplicates(row, scope_id) {
        Ok(candidates) => (
            RemoteMatch {
                row_index: row.original_index,
                snapshot: row.snapshot(),
                candidates,
            },
            None,
        ),
        Err(err) => failed(row, err.to_string()),
    }
}

fn failed(row: &Row, message: String) -> (RemoteMatch, Option<LookupFailure>) {
    warn!(row = row.original_index, error = %message, "remote lookup failed; treating as no match");
    (
        unmatched(row),
        Some(LookupFailure {
            row_index: row.original_index,
            message,
        }),
    )
}

fn unmatched(row: &Row) -> RemoteMatch {
    RemoteMatch {
        row_index: row.original_index,
        snapshot: row.snapshot(),
        candidates: Vec::new(),
    }
}
