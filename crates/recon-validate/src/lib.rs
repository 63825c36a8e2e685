//! Row validation for the import reconciler.
//!
//! Rows are checked after duplicate collapsing:
//!
//! - **App Name**: must be non-empty after trimming; otherwise the row is
//!   rejected and excluded from the remote stage
//! - **Website / LinkedIn**: a value that yields no hostname is a warning
//!
//! Rejected rows can be fixed with [`correct_field`], which re-validates the
//! single row it touched.
//!
//! # Example
//!
//! ```ignore
//! use recon_validate::{correct_field, validate_rows};
//!
//! let mut report = validate_rows(&rows);
//! for idx in report.rejected_indices() {
//!     let issues = correct_field(&mut rows, idx, CanonicalField::AppName, "Untitled")?;
//!     report.record(idx, issues);
//! }
//! ```

mod checks;
mod error;
mod issue;
mod report;

pub use checks::{correct_field, validate_row, validate_rows};
pub use error::{Result, ValidationError};
pub use issue::{Issue, Severity};
pub use report::ValidationReport;
