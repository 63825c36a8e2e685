//! Row checks and inline correction.

use recon_model::{CanonicalField, Row};
use tracing::{debug, info};
use url::Url;

use crate::error::{Result, ValidationError};
use crate::issue::Issue;
use crate::report::ValidationReport;

const URL_FIELDS: [CanonicalField; 2] = [
    CanonicalField::CompanyWebsite,
    CanonicalField::CompanyLinkedinUrl,
];

/// Check one row.
pub fn validate_row(row: &Row) -> Vec<Issue> {
    let mut issues = Vec::new();
    for field in CanonicalField::ALL {
        if field.is_required() && row.is_blank(field) {
            issues.push(Issue::RequiredEmpty { field });
        }
    }
    for field in URL_FIELDS {
        let value = row.get(field).trim();
        if !value.is_empty() && !has_hostname(value) {
            issues.push(Issue::MissingHostname {
                field,
                value: value.to_string(),
            });
        }
    }
    issues
}

/// Check every row and collect the issues.
pub fn validate_rows(rows: &[Row]) -> ValidationReport {
    let mut report = ValidationReport::new(rows.len());
    for row in rows {
        let issues = validate_row(row);
        if !issues.is_empty() {
            debug!(row = row.original_index, issues = issues.len(), "row has issues");
        }
        report.record(row.original_index, issues);
    }
    info!(
        rows = rows.len(),
        rejected = report.rejected_count(),
        warnings = report.warning_count(),
        "validation complete"
    );
    report
}

/// Overwrite one field of a held row and re-validate that row.
pub fn correct_field(
    rows: &mut [Row],
    original_index: usize,
    field: CanonicalField,
    value: impl Into<String>,
) -> Result<Vec<Issue>> {
    let row = rows
        .iter_mut()
        .find(|row| row.original_index == original_index)
        .ok_or(ValidationError::RowNotFound {
            index: original_index,
        })?;
    row.set(field, value);
    let issues = validate_row(row);
    debug!(
        row = original_index,
        field = %field,
        remaining = issues.len(),
        "row corrected"
    );
    Ok(issues)
}

/// Whether a URL-like value yields a hostname. Values without a scheme are
/// read as `https://`.
fn has_hostname(value: &str) -> bool {
    let candidate = if value.contains("://") {
        value.to_string()
    } else {
        format!("https://{value}")
    };
    Url::parse(&candidate)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.contains('.') || host == "localhost"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_detection() {
        assert!(has_hostname("example.com"));
        assert!(has_hostname("https://www.example.com/path"));
        assert!(has_hostname("linkedin.com/company/acme"));
        assert!(!has_hostname("not a url"));
        assert!(!has_hostname("mailto:someone"));
        assert!(!has_hostname("n/a"));
    }
}
