//! Remote duplicate lookup and resolution.
//!
//! Surviving rows are looked up in the remote store by their identity fields
//! (App Name, App ID, Google Play ID, Sensor Tower ID) within one scope.
//! Matched records then get a [`RemoteResolution`](recon_model::RemoteResolution)
//! deciding whether existing or imported values win.
//!
//! Stores implement [`RemoteStore`]:
//!
//! - [`AirtableClient`]: the Airtable REST API over blocking HTTP
//! - [`InMemoryStore`]: the same filter applied to a local snapshot

mod airtable;
mod error;
mod lookup;
mod memory;
mod record;
mod resolution;
mod store;

pub use airtable::{AirtableClient, AirtableConfig, DEFAULT_API_URL, DEFAULT_SCOPE_FIELD};
pub use error::{RemoteError, Result};
pub use lookup::{LookupFailure, LookupMode, LookupOutcome, run_lookups};
pub use memory::InMemoryStore;
pub use record::{AirtablePage, AirtableRecord};
pub use resolution::{RemoteResolutions, apply_resolution};
pub use store::RemoteStore;
