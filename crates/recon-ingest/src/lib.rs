//! CSV ingestion for the import reconciler.
//!
//! Parses an uploaded file into a [`CsvTable`] (header line plus data rows)
//! and ships the downloadable sample file.

pub mod csv_table;
pub mod error;
pub mod sample;

pub use csv_table::{CsvTable, parse_csv_str, read_csv, read_csv_from_reader};
pub use error::{IngestError, Result};
pub use sample::{SAMPLE_CSV, write_sample_csv};
