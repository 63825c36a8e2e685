//! Non-interactive run of the whole pipeline.

use std::path::PathBuf;

use recon_model::{
    AnalysisResult, CanonicalField, CsvAction, MatchFieldSet, ReconError, RemoteAction, Result,
};
use recon_remote::{InMemoryStore, LookupMode, RemoteStore};
use recon_report::NotificationSink;
use tracing::{debug, error, info};

use crate::session::ImportSession;

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvInput {
    Text(String),
    Path(PathBuf),
}

/// Choices the interactive stages would otherwise ask for.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub csv: CsvInput,
    /// Fields compared when grouping intra-file duplicates.
    pub match_fields: MatchFieldSet,
    /// Resolution applied to every duplicate group.
    pub bulk_action: CsvAction,
    /// Resolution applied to every matched remote record.
    pub remote_action: RemoteAction,
    /// Remote lookups are skipped without one.
    pub scope_id: Option<String>,
    pub lookup_mode: LookupMode,
}

impl AnalyzeOptions {
    /// Defaults: match on App Name, keep first, keep existing, no scope,
    /// sequential lookups.
    pub fn new(csv: CsvInput) -> Self {
        Self {
            csv,
            match_fields: [CanonicalField::AppName].into_iter().collect(),
            bulk_action: CsvAction::default(),
            remote_action: RemoteAction::default(),
            scope_id: None,
            lookup_mode: LookupMode::default(),
        }
    }

    pub fn with_match_fields(mut self, fields: MatchFieldSet) -> Self {
        self.match_fields = fields;
        self
    }

    pub fn with_bulk_action(mut self, action: CsvAction) -> Self {
        self.bulk_action = action;
        self
    }

    pub fn with_remote_action(mut self, action: RemoteAction) -> Self {
        self.remote_action = action;
        self
    }

    /// Blank ids count as no scope.
    pub fn with_scope_id(mut self, scope_id: impl Into<String>) -> Self {
        let scope_id = scope_id.into();
        self.scope_id = if scope_id.trim().is_empty() {
            None
        } else {
            Some(scope_id)
        };
        self
    }

    pub fn with_lookup_mode(mut self, mode: LookupMode) -> Self {
        self.lookup_mode = mode;
        self
    }
}

/// Run every stage with the given options.
///
/// Never fails: errors end up in [`AnalysisResult::errors`] with
/// `success = false`. Recovered problems (lookup failures, a failed
/// delivery) are listed as errors of an otherwise successful run.
///
/// A scope id without a store is a configuration error raised before
/// anything is parsed.
pub fn analyze(
    options: &AnalyzeOptions,
    store: Option<&(dyn RemoteStore + Sync)>,
    sink: Option<&dyn NotificationSink>,
) -> AnalysisResult {
    analyze_with_progress(options, store, sink, &|done, total| {
        debug!(done, total, "lookup progress");
    })
}

/// [`analyze`] reporting `(done, total)` after each remote lookup.
pub fn analyze_with_progress(
    options: &AnalyzeOptions,
    store: Option<&(dyn RemoteStore + Sync)>,
    sink: Option<&dyn NotificationSink>,
    progress: &(dyn Fn(usize, usize) + Sync),
) -> AnalysisResult {
    let scope_id = options
        .scope_id
        .as_deref()
        .map(str::trim)
        .filter(|scope| !scope.is_empty());
    if scope_id.is_some() && store.is_none() {
        let err = ReconError::configuration("a scope id was given but no remote store is configured");
        error!(error = %err, "analysis aborted");
        return AnalysisResult::failure("Analysis failed", err.to_string());
    }

    let mut session = ImportSession::new();
    match run(&mut session, options, scope_id, store, sink, progress) {
        Ok(delivered) => {
            let counts = session.counts();
            let mut errors: Vec<String> = session
                .lookup_failures()
                .iter()
                .map(|failure| format!("row {}: {}", failure.row_index, failure.message))
                .collect();
            if let Some(err) = session.delivery_error() {
                errors.push(format!("notification delivery failed: {err}"));
            }
            let message = format!(
                "Import analyzed: {} new, {} updated, {} unchanged",
                counts.summary.new, counts.summary.updated, counts.summary.unchanged
            );
            info!(
                parsed = counts.parsed_rows,
                rejected = counts.rejected_rows,
                lookup_failures = counts.lookup_failures,
                "analysis complete"
            );
            AnalysisResult {
                success: true,
                message,
                counts,
                errors,
                notification_delivered: delivered,
            }
        }
        Err(err) => {
            error!(stage = %session.stage(), error = %err, "analysis failed");
            AnalysisResult {
                counts: session.counts(),
                ..AnalysisResult::failure("Analysis failed", err.to_string())
            }
        }
    }
}

fn run(
    session: &mut ImportSession,
    options: &AnalyzeOptions,
    scope_id: Option<&str>,
    store: Option<&(dyn RemoteStore + Sync)>,
    sink: Option<&dyn NotificationSink>,
    progress: &(dyn Fn(usize, usize) + Sync),
) -> Result<Option<bool>> {
    match &options.csv {
        CsvInput::Text(text) => session.load_csv_str(text)?,
        CsvInput::Path(path) => session.load_csv_path(path)?,
    }
    session.confirm_mapping()?;
    session.set_match_fields(options.match_fields.clone())?;
    session.apply_bulk_action(options.bulk_action)?;
    session.validate()?;

    let offline = InMemoryStore::default();
    let store: &(dyn RemoteStore + Sync) = store.unwrap_or(&offline);
    session.check_remote(store, scope_id, options.lookup_mode, progress)?;
    session.set_all_remote_actions(options.remote_action)?;
    session.finalize()?;

    match sink {
        Some(sink) => Ok(Some(session.submit(sink, "Import analyzed")?)),
        None => Ok(None),
    }
}
