//! `recon.toml` configuration with environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use recon_remote::{AirtableConfig, DEFAULT_API_URL, DEFAULT_SCOPE_FIELD, RemoteError};
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "recon.toml";

pub const ENV_API_KEY: &str = "AIRTABLE_API_KEY";
pub const ENV_BASE_ID: &str = "AIRTABLE_BASE_ID";
pub const ENV_TABLE: &str = "AIRTABLE_TABLE";
pub const ENV_WEBHOOK_URL: &str = "RECON_WEBHOOK_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub airtable: AirtableSettings,
    pub notify: NotifySettings,
    pub lookup: LookupSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirtableSettings {
    pub base_id: Option<String>,
    pub table: Option<String>,
    pub scope_field: String,
    pub api_url: String,
    /// Only read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AirtableSettings {
    fn default() -> Self {
        Self {
            base_id: None,
            table: None,
            scope_field: DEFAULT_SCOPE_FIELD.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    pub concurrency: usize,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl ReconConfig {
    /// Read `path`, or `recon.toml` when present, then apply the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(&fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay non-empty environment values.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(key) = read(ENV_API_KEY) {
            self.airtable.api_key = Some(key);
        }
        if let Some(base_id) = read(ENV_BASE_ID) {
            self.airtable.base_id = Some(base_id);
        }
        if let Some(table) = read(ENV_TABLE) {
            self.airtable.table = Some(table);
        }
        if let Some(url) = read(ENV_WEBHOOK_URL) {
            self.notify.webhook_url = Some(url);
        }
    }

    /// Airtable settings, checked for missing credentials.
    pub fn airtable_config(&self) -> std::result::Result<AirtableConfig, RemoteError> {
        let settings = &self.airtable;
        let config = AirtableConfig {
            api_url: settings.api_url.clone(),
            base_id: settings.base_id.clone().unwrap_or_default(),
            table: settings.table.clone().unwrap_or_default(),
            scope_field: settings.scope_field.clone(),
            api_key: settings.api_key.clone().unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const TOML: &str = r#"
[airtable]
base_id = "appFile"
table = "Apps"

[notify]
webhook_url = "https://hooks.example/recon"

[lookup]
concurrency = 4
"#;

    #[test]
    fn missing_sections_take_defaults() {
        let config = ReconConfig::from_toml(TOML).expect("parse");
        assert_eq!(config.airtable.scope_field, DEFAULT_SCOPE_FIELD);
        assert_eq!(config.airtable.api_url, DEFAULT_API_URL);
        assert_eq!(config.lookup.concurrency, 4);

        let empty = ReconConfig::from_toml("").expect("parse");
        assert_eq!(empty, ReconConfig::default());
        assert_eq!(empty.lookup.concurrency, 1);
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = ReconConfig::from_toml(TOML).expect("parse");
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "secret-token"),
            (ENV_BASE_ID, "appEnv"),
            (ENV_TABLE, "  "),
        ]
        .into();
        config.apply_env(|name| env.get(name).map(|value| (*value).to_string()));

        assert_eq!(config.airtable.base_id.as_deref(), Some("appEnv"));
        assert_eq!(config.airtable.table.as_deref(), Some("Apps"));
        let airtable = config.airtable_config().expect("complete");
        assert_eq!(airtable.api_key, "secret-token");
    }

    #[test]
    fn api_key_is_never_read_from_file() {
        let config =
            ReconConfig::from_toml("[airtable]\napi_key = \"leaked\"\nbase_id = \"a\"\ntable = \"t\"")
                .expect("unknown keys ignored");
        let err = config.airtable_config().expect_err("no key");
        assert!(err.to_string().contains(ENV_API_KEY));
    }
}
