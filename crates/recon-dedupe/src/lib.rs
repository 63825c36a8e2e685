//! Duplicate detection inside one imported file.
//!
//! Rows whose values agree on every selected match field share a
//! [`DuplicateGroup`](recon_model::DuplicateGroup). Each group is collapsed
//! according to its [`CsvResolution`](recon_model::CsvResolution): keep the
//! first or last row, merge members field by field, or skip the whole group.
//!
//! # Example
//!
//! ```ignore
//! use recon_dedupe::{CsvResolutions, find_duplicate_groups, resolve_survivors};
//! use recon_model::CsvAction;
//!
//! let groups = find_duplicate_groups(&rows, &match_fields)?;
//! let mut resolutions = CsvResolutions::new();
//! resolutions.apply_bulk_action(&groups, CsvAction::KeepFirst);
//! let survivors = resolve_survivors(&rows, &groups, &resolutions);
//! ```

mod error;
mod grouping;
mod resolution;

pub use error::{DedupeError, Result};
pub use grouping::{CacheStamp, GroupCache, composite_key, find_duplicate_groups};
pub use resolution::{CollapseStats, CsvResolutions, collapse_stats, resolve_survivors};
