use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Parsed CSV content: the header line and the data rows.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column position of a header (exact match).
    #[must_use]
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell value by row position and header.
    #[must_use]
    pub fn value(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.column_index(header)?;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Parse CSV text held in memory.
pub fn parse_csv_str(text: &str) -> Result<CsvTable> {
    read_csv_from_reader(text.as_bytes())
}

/// Read and parse a CSV file.
pub fn read_csv(path: &Path) -> Result<CsvTable> {
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_csv_from_reader(file)?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read csv"
    );
    Ok(table)
}

/// Parse CSV from any reader.
///
/// The first non-blank record is the header line. Quoted fields may contain
/// commas and escaped quotes. Short rows are padded with empty cells and
/// cells beyond the header count are dropped. Rows with only empty cells are
/// skipped.
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|value| normalize_cell(value).is_empty()) {
            continue;
        }
        let Some(header_row) = headers.as_ref() else {
            let parsed: Vec<String> = record.iter().map(normalize_header).collect();
            check_unique_headers(&parsed)?;
            headers = Some(parsed);
            continue;
        };
        let mut row = Vec::with_capacity(header_row.len());
        for idx in 0..header_row.len() {
            row.push(record.get(idx).map(normalize_cell).unwrap_or_default());
        }
        rows.push(row);
    }

    let headers = headers.ok_or(IngestError::EmptyCsv)?;
    Ok(CsvTable { headers, rows })
}

fn check_unique_headers(headers: &[String]) -> Result<()> {
    for (second, header) in headers.iter().enumerate() {
        if let Some(first) = headers[..second].iter().position(|h| h == header) {
            return Err(IngestError::DuplicateHeader {
                header: header.clone(),
                first,
                second,
            });
        }
    }
    Ok(())
}
