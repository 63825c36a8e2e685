use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use recon_core::{AnalyzeOptions, CsvInput, analyze_with_progress};
use recon_ingest::write_sample_csv;
use recon_model::{AnalysisResult, CanonicalField, IDENTITY_FIELDS, ReconError};
use recon_remote::{AirtableClient, InMemoryStore, LookupMode, RemoteStore};
use recon_report::{JsonFileSink, NotificationSink, WebhookSink};
use tracing::{error, info, info_span};

use crate::cli::AnalyzeArgs;
use crate::config::ReconConfig;
use crate::sink::FanoutSink;
use crate::summary::apply_table_style;

pub fn run_fields() {
    let mut table = Table::new();
    table.set_header(vec!["Key", "CSV label", "Required", "Identity"]);
    apply_table_style(&mut table);
    for field in CanonicalField::ALL {
        table.add_row(vec![
            field.key().to_string(),
            field.label().to_string(),
            yes_no(field.is_required()).to_string(),
            yes_no(IDENTITY_FIELDS.contains(&field)).to_string(),
        ]);
    }
    println!("{table}");
}

pub fn run_sample(path: &Path) -> Result<()> {
    write_sample_csv(path).with_context(|| format!("write sample to {}", path.display()))?;
    println!("Sample CSV written to {}", path.display());
    Ok(())
}

/// Run the full analysis described by `args`.
///
/// Missing Airtable credentials while a scope is given come back as a failed
/// [`AnalysisResult`], like any other pipeline failure. Errors reading the
/// config or the snapshot file are returned as `Err`.
pub fn run_analyze(args: &AnalyzeArgs) -> Result<AnalysisResult> {
    let span = info_span!("analyze", csv = %args.csv.display());
    let _guard = span.enter();

    let config = ReconConfig::load(args.config.as_deref())?;
    let scope = args
        .scope
        .as_deref()
        .map(str::trim)
        .filter(|scope| !scope.is_empty());
    let concurrency = args.concurrency.unwrap_or(config.lookup.concurrency);

    let mut options = AnalyzeOptions::new(CsvInput::Path(args.csv.clone()))
        .with_match_fields(args.match_fields.iter().copied().collect())
        .with_bulk_action(args.bulk_action.into())
        .with_remote_action(args.remote_action.into())
        .with_lookup_mode(LookupMode::from_concurrency(concurrency));
    if let Some(scope) = scope {
        options = options.with_scope_id(scope);
    }

    let store: Option<Box<dyn RemoteStore + Sync>> = match (&args.remote_snapshot, scope) {
        (Some(path), _) => {
            let snapshot = InMemoryStore::load(path, &config.airtable.scope_field)
                .with_context(|| format!("load remote snapshot {}", path.display()))?;
            Some(Box::new(snapshot))
        }
        (None, Some(_)) => match config.airtable_config().and_then(AirtableClient::new) {
            Ok(client) => Some(Box::new(client)),
            Err(err) => {
                let err = ReconError::from(err);
                error!(error = %err, "remote store unavailable");
                return Ok(AnalysisResult::failure("Analysis failed", err.to_string()));
            }
        },
        (None, None) => None,
    };

    let sink = build_sink(args, &config)?;
    let progress = lookup_progress(args.json || scope.is_none());
    let result = analyze_with_progress(
        &options,
        store.as_deref(),
        sink.as_ref().map(|sink| sink as &dyn NotificationSink),
        &|done, total| {
            progress.set_length(total as u64);
            progress.set_position(done as u64);
        },
    );
    progress.finish_and_clear();
    info!(success = result.success, "analysis finished");
    Ok(result)
}

/// Payload file first, then the webhook. `None` when nothing is configured.
fn build_sink(args: &AnalyzeArgs, config: &ReconConfig) -> Result<Option<FanoutSink>> {
    let mut fanout = FanoutSink::new();
    if let Some(path) = &args.payload_out {
        fanout.push(JsonFileSink::new(path.clone()));
    }
    if !args.no_notify
        && let Some(url) = &config.notify.webhook_url
    {
        fanout.push(WebhookSink::new(url.clone()).context("create webhook client")?);
    }
    Ok(if fanout.is_empty() { None } else { Some(fanout) })
}

fn lookup_progress(hidden: bool) -> ProgressBar {
    let bar = ProgressBar::new(0);
    if hidden || !io::stderr().is_terminal() {
        bar.set_draw_target(ProgressDrawTarget::hidden());
        return bar;
    }
    if let Ok(style) =
        ProgressStyle::with_template("Remote lookup [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
