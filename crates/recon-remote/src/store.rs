use recon_model::{RemoteCandidate, RemoteRecord, Row};

use crate::error::Result;

/// Read access to the remote record store.
///
/// `find_duplicates` returns records whose scope equals `scope_id` and whose
/// App Name, App ID, Google Play ID or Sensor Tower ID equals the row's
/// non-empty value for that field. A row with all four empty matches nothing.
pub trait RemoteStore {
    /// Every record in the store.
    fn fetch_all(&self) -> Result<Vec<RemoteRecord>>;

    fn find_duplicates(&self, row: &Row, scope_id: &str) -> Result<Vec<RemoteCandidate>>;
}
