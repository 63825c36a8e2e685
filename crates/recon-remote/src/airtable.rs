//! Airtable REST client.
//!
//! Records are listed with a `filterByFormula` built from the row's identity
//! fields and followed through `offset` pagination.

use std::fmt;
use std::time::Duration;

use recon_model::{IDENTITY_FIELDS, RemoteCandidate, RemoteRecord, Row};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{RETRY_AFTER, USER_AGENT};
use tracing::{debug, warn};
use url::Url;

use crate::error::{RemoteError, Result};
use crate::record::AirtablePage;
use crate::store::RemoteStore;

/// Airtable API base URL.
pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Column holding the scope identifier.
pub const DEFAULT_SCOPE_FIELD: &str = "Scope ID";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Airtable's documented back-off after a 429.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

const PAGE_SIZE: &str = "100";

/// Connection settings for one Airtable table.
#[derive(Clone)]
pub struct AirtableConfig {
    pub api_url: String,
    pub base_id: String,
    pub table: String,
    pub scope_field: String,
    pub api_key: String,
}

impl AirtableConfig {
    pub fn new(
        base_id: impl Into<String>,
        table: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            base_id: base_id.into(),
            table: table.into(),
            scope_field: DEFAULT_SCOPE_FIELD.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Error naming the first missing setting.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("AIRTABLE_API_KEY", &self.api_key),
            ("AIRTABLE_BASE_ID", &self.base_id),
            ("AIRTABLE_TABLE", &self.table),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(RemoteError::configuration(format!("{name} is not set")));
            }
        }
        Ok(())
    }

    /// List-records endpoint for the configured table.
    pub fn table_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_url).map_err(|err| {
            RemoteError::configuration(format!("invalid API URL '{}': {err}", self.api_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| RemoteError::configuration("API URL cannot hold a path"))?
            .pop_if_empty()
            .push(&self.base_id)
            .push(&self.table);
        Ok(url)
    }
}

impl fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_url", &self.api_url)
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .field("scope_field", &self.scope_field)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Client for the Airtable list-records endpoint.
pub struct AirtableClient {
    client: Client,
    config: AirtableConfig,
}

impl AirtableClient {
    /// Create a client after checking the configuration.
    pub fn new(config: AirtableConfig) -> Result<Self> {
        config.validate()?;
        config.table_url()?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &AirtableConfig {
        &self.config
    }

    /// List every record matching `formula`, following pagination.
    pub fn list_records(&self, formula: Option<&str>) -> Result<Vec<RemoteRecord>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let page = self.fetch_page(formula, offset.as_deref())?;
            records.extend(
                page.records
                    .into_iter()
                    .map(|record| record.into_remote(&self.config.scope_field)),
            );
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        Ok(records)
    }

    fn fetch_page(&self, formula: Option<&str>, offset: Option<&str>) -> Result<AirtablePage> {
        let mut url = self.config.table_url()?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", PAGE_SIZE);
            if let Some(formula) = formula {
                query.append_pair("filterByFormula", formula);
            }
            if let Some(offset) = offset {
                query.append_pair("offset", offset);
            }
        }
        debug!(table = %self.config.table, paged = offset.is_some(), "fetching records");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_key)
            .header(USER_AGENT, concat!("recon/", env!("CARGO_PKG_VERSION")))
            .send()?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Err(RemoteError::configuration(format!(
                    "Airtable rejected base '{}' table '{}' ({status})",
                    self.config.base_id, self.config.table
                )));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                warn!(retry_after_secs, "Airtable rate limit reached");
                return Err(RemoteError::RateLimited { retry_after_secs });
            }
            _ if !status.is_success() => {
                let message = response
                    .text()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(RemoteError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        Ok(response.json::<AirtablePage>()?)
    }
}

impl RemoteStore for AirtableClient {
    fn fetch_all(&self) -> Result<Vec<RemoteRecord>> {
        self.list_records(None)
    }

    fn find_duplicates(&self, row: &Row, scope_id: &str) -> Result<Vec<RemoteCandidate>> {
        let Some(formula) = duplicate_formula(row, &self.config.scope_field, scope_id) else {
            return Ok(Vec::new());
        };
        let candidates = self
            .list_records(Some(&formula))?
            .into_iter()
            .map(|record| {
                let matched_on = record.matched_fields(row);
                RemoteCandidate { record, matched_on }
            })
            .collect();
        Ok(candidates)
    }
}

/// `AND({scope}='id', OR({App Name}='v', ...))` over the row's non-empty
/// identity fields. `None` when all of them are empty.
pub(crate) fn duplicate_formula(row: &Row, scope_field: &str, scope_id: &str) -> Option<String> {
    let clauses: Vec<String> = IDENTITY_FIELDS
        .into_iter()
        .filter(|field| !row.is_blank(*field))
        .map(|field| {
            format!(
                "{{{}}}='{}'",
                field.label(),
                escape_formula_string(row.get(field).trim())
            )
        })
        .collect();
    if clauses.is_empty() {
        return None;
    }
    Some(format!(
        "AND({{{}}}='{}',OR({}))",
        scope_field,
        escape_formula_string(scope_id),
        clauses.join(",")
    ))
}

fn escape_formula_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use recon_model::CanonicalField;

    use super::*;

    #[test]
    fn formula_covers_non_empty_identity_fields() {
        let row = Row::new(0)
            .with(CanonicalField::AppName, "Chess Club")
            .with(CanonicalField::AppId, "")
            .with(CanonicalField::GooglePlayId, "com.pawnworks.chess");
        assert_eq!(
            duplicate_formula(&row, "Scope ID", "s-1").as_deref(),
            Some(
                "AND({Scope ID}='s-1',OR({App Name}='Chess Club',{Google Play ID}='com.pawnworks.chess'))"
            )
        );
    }

    #[test]
    fn formula_escapes_quotes() {
        let row = Row::new(0).with(CanonicalField::AppName, "Bob's \\ App");
        assert_eq!(
            duplicate_formula(&row, "Scope ID", "s").as_deref(),
            Some("AND({Scope ID}='s',OR({App Name}='Bob\\'s \\\\ App'))")
        );
    }

    #[test]
    fn no_identity_values_means_no_formula() {
        let row = Row::new(0).with(CanonicalField::Country, "NL");
        assert!(duplicate_formula(&row, "Scope ID", "s").is_none());
    }

    #[test]
    fn table_url_encodes_segments() {
        let mut config = AirtableConfig::new("appXYZ", "Mobile Apps", "key");
        config.api_url = "https://api.airtable.com/v0/".to_string();
        assert_eq!(
            config.table_url().expect("valid url").as_str(),
            "https://api.airtable.com/v0/appXYZ/Mobile%20Apps"
        );
    }

    #[test]
    fn missing_settings_are_configuration_errors() {
        let config = AirtableConfig::new("appXYZ", "", "secret-token");
        let err = config.validate().expect_err("table missing");
        assert!(matches!(err, RemoteError::Configuration { .. }));
        assert!(err.to_string().contains("AIRTABLE_TABLE"));
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
