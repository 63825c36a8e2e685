//! Notification sinks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use recon_model::NotificationPayload;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, info};

use crate::error::{Result, SubmissionError};

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Receiver of the finalized import.
///
/// Delivery failure is reported to the caller; it never changes the
/// finalized data.
pub trait NotificationSink {
    /// Short description for logs.
    fn name(&self) -> String;

    fn deliver(&self, payload: &NotificationPayload) -> Result<()>;
}

/// POSTs the payload as JSON to a webhook URL.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl NotificationSink for WebhookSink {
    fn name(&self) -> String {
        format!("webhook {}", self.url)
    }

    fn deliver(&self, payload: &NotificationPayload) -> Result<()> {
        debug!(url = %self.url, "posting notification");
        let response = self
            .client
            .post(&self.url)
            .header(USER_AGENT, concat!("recon/", env!("CARGO_PKG_VERSION")))
            .json(payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        info!(status = status.as_u16(), "notification delivered");
        Ok(())
    }
}

/// Writes the payload as pretty-printed JSON to a file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NotificationSink for JsonFileSink {
    fn name(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn deliver(&self, payload: &NotificationPayload) -> Result<()> {
        let json = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, json).map_err(|source| SubmissionError::FileWrite {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "payload written");
        Ok(())
    }
}
