//! Column mapping for the import reconciler.
//!
//! Detected CSV headers are matched to canonical fields by case-insensitive
//! label equality. Headers without a match get a custom slot named after the
//! header, so every header always has exactly one slot.
//!
//! # Example
//!
//! ```ignore
//! use recon_map::MappingState;
//! use recon_model::{CanonicalField, FieldSlot};
//!
//! let mut state = MappingState::auto_map(&table.headers);
//! state.assign("Title", FieldSlot::Canonical(CanonicalField::AppName))?;
//! state.ensure_required()?;
//! let rows = state.apply(&table);
//! ```

mod error;
mod state;

pub use error::{MappingError, Result};
pub use state::{MappingState, MappingSummary};
