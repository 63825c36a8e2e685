//! CLI argument definitions for the import reconciler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use recon_model::{CanonicalField, CsvAction, RemoteAction};

#[derive(Parser)]
#[command(
    name = "recon",
    version,
    about = "Reconcile a CSV import against an Airtable table",
    long_about = "Reconcile a spreadsheet import against an Airtable table.\n\n\
                  Maps columns, collapses duplicates within the file, validates rows,\n\
                  looks up existing records and reports what would be created or updated."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow row values (app names, websites) in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the whole reconciliation on a CSV file.
    Analyze(AnalyzeArgs),

    /// Write the sample CSV.
    Sample {
        /// Destination file.
        #[arg(value_name = "PATH", default_value = "sample.csv")]
        path: PathBuf,
    },

    /// List the canonical fields and their CSV labels.
    Fields,
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// CSV file to import.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Field compared when grouping duplicates within the file (repeatable).
    #[arg(
        long = "match-field",
        value_name = "FIELD",
        value_parser = parse_canonical_field,
        default_value = "appName"
    )]
    pub match_fields: Vec<CanonicalField>,

    /// Resolution applied to every duplicate group in the file.
    #[arg(long = "bulk-action", value_enum, default_value = "keep-first")]
    pub bulk_action: BulkActionArg,

    /// Resolution applied to every matched remote record.
    #[arg(long = "remote-action", value_enum, default_value = "keep")]
    pub remote_action: RemoteActionArg,

    /// Scope identifier narrowing the remote lookup. Without it no lookup runs.
    #[arg(long = "scope", value_name = "ID")]
    pub scope: Option<String>,

    /// Look up duplicates in a JSON snapshot instead of Airtable.
    ///
    /// Accepts a list of records or a list-records response page.
    #[arg(long = "remote-snapshot", value_name = "JSON")]
    pub remote_snapshot: Option<PathBuf>,

    /// Number of lookups run at once (overrides the config file).
    #[arg(long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Do not post the payload to the webhook.
    #[arg(long = "no-notify")]
    pub no_notify: bool,

    /// Also write the notification payload to this file.
    #[arg(long = "payload-out", value_name = "PATH")]
    pub payload_out: Option<PathBuf>,

    /// Print the analysis result as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,

    /// Configuration file (default: ./recon.toml when present).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Accepts a field key (`appName`) or its CSV label (`App Name`).
fn parse_canonical_field(value: &str) -> Result<CanonicalField, String> {
    CanonicalField::from_key(value)
        .or_else(|| CanonicalField::from_label(value))
        .ok_or_else(|| {
            let known: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.key()).collect();
            format!("unknown field '{value}' (expected one of: {})", known.join(", "))
        })
}

/// Duplicate-group resolution choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum BulkActionArg {
    KeepFirst,
    KeepLast,
    Merge,
    Skip,
}

impl From<BulkActionArg> for CsvAction {
    fn from(arg: BulkActionArg) -> Self {
        match arg {
            BulkActionArg::KeepFirst => Self::KeepFirst,
            BulkActionArg::KeepLast => Self::KeepLast,
            BulkActionArg::Merge => Self::Merge,
            BulkActionArg::Skip => Self::Skip,
        }
    }
}

/// Remote duplicate resolution choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum RemoteActionArg {
    Keep,
    Replace,
    Merge,
}

impl From<RemoteActionArg> for RemoteAction {
    fn from(arg: RemoteActionArg) -> Self {
        match arg {
            RemoteActionArg::Keep => Self::Keep,
            RemoteActionArg::Replace => Self::Replace,
            RemoteActionArg::Merge => Self::Merge,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_labels() {
        assert_eq!(
            parse_canonical_field("companyWebsite"),
            Ok(CanonicalField::CompanyWebsite)
        );
        assert_eq!(
            parse_canonical_field("Google Play ID"),
            Ok(CanonicalField::GooglePlayId)
        );
        assert!(parse_canonical_field("downloads").is_err());
    }

    #[test]
    fn analyze_defaults() {
        let cli = Cli::try_parse_from(["recon", "analyze", "apps.csv"]).expect("parse");
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.match_fields, vec![CanonicalField::AppName]);
        assert!(matches!(args.bulk_action, BulkActionArg::KeepFirst));
        assert!(args.scope.is_none());
    }

    #[test]
    fn repeatable_match_field() {
        let cli = Cli::try_parse_from([
            "recon",
            "analyze",
            "apps.csv",
            "--match-field",
            "appName",
            "--match-field",
            "companyWebsite",
            "--bulk-action",
            "merge",
        ])
        .expect("parse");
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(
            args.match_fields,
            vec![CanonicalField::AppName, CanonicalField::CompanyWebsite]
        );
        assert!(matches!(args.bulk_action, BulkActionArg::Merge));
    }
}
