//! Downloadable sample file matching the expected column layout.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{IngestError, Result};

/// Example CSV with every canonical column and a custom one.
pub const SAMPLE_CSV: &str = "\
App Name,App ID,Developer,Category,Country,Company Website,Company LinkedIn URL,Sensor Tower ID,Google Play ID,Developer ID,Monthly Downloads
Chess Club,1234567890,Pawnworks Ltd,Games,NL,https://www.pawnworks.example,https://www.linkedin.com/company/pawnworks,5f1c2a9b,com.pawnworks.chessclub,pawnworks,120000
Budget Buddy,2345678901,Ledger Labs,Finance,US,ledgerlabs.example,https://www.linkedin.com/company/ledger-labs,6a2d3b0c,com.ledgerlabs.budgetbuddy,ledgerlabs,45000
Trail Finder,3456789012,Northbound Apps,Travel,CA,http://northbound.example/apps,,7b3e4c1d,com.northbound.trailfinder,northbound,8000
";

/// Write the sample file to `path`.
pub fn write_sample_csv(path: &Path) -> Result<()> {
    fs::write(path, SAMPLE_CSV).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "wrote sample csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use recon_model::CanonicalField;

    use super::*;
    use crate::parse_csv_str;

    #[test]
    fn sample_contains_every_canonical_label() {
        let table = parse_csv_str(SAMPLE_CSV).expect("parse sample");
        for field in CanonicalField::ALL {
            assert!(
                table.headers.iter().any(|h| h == field.label()),
                "missing {}",
                field.label()
            );
        }
        assert_eq!(table.rows.len(), 3);
    }
}
