use std::fs;
use std::path::Path;

use clap::Parser;
use recon_cli::cli::{AnalyzeArgs, Cli, Command};
use recon_cli::commands::run_analyze;
use recon_model::NotificationPayload;

const CSV: &str = "\
App Name,Company Website,Country
Chess Club,https://www.pawnworks.example,NL
Chess Club,pawnworks.example,BE
Budget Buddy,ledgerlabs.example,US
,missing.example,FR
";

const SNAPSHOT: &str = r#"[
  {"id": "recChess", "fields": {"App Name": "Chess Club", "Country": "DE", "Scope ID": "team-a"}}
]"#;

fn analyze_args(dir: &Path, extra: &[&str]) -> AnalyzeArgs {
    let csv = dir.join("apps.csv");
    fs::write(&csv, CSV).expect("write csv");
    let config = dir.join("recon.toml");
    fs::write(&config, "[lookup]\nconcurrency = 2\n").expect("write config");

    let mut argv = vec![
        "recon".to_string(),
        "analyze".to_string(),
        csv.display().to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "--no-notify".to_string(),
    ];
    argv.extend(extra.iter().map(|arg| (*arg).to_string()));
    let cli = Cli::try_parse_from(argv).expect("parse args");
    match cli.command {
        Command::Analyze(args) => args,
        _ => panic!("expected analyze"),
    }
}

#[test]
fn snapshot_lookup_writes_payload() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let snapshot = dir.path().join("remote.json");
    fs::write(&snapshot, SNAPSHOT).expect("write snapshot");
    let payload_path = dir.path().join("payload.json");

    let args = analyze_args(
        dir.path(),
        &[
            "--scope",
            "team-a",
            "--remote-snapshot",
            snapshot.to_str().expect("utf-8 path"),
            "--remote-action",
            "replace",
            "--payload-out",
            payload_path.to_str().expect("utf-8 path"),
        ],
    );
    let result = run_analyze(&args).expect("analysis runs");

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.notification_delivered, Some(true));
    assert_eq!(result.counts.parsed_rows, 4);
    assert_eq!(result.counts.collapsed_rows, 1);
    assert_eq!(result.counts.rejected_rows, 1);
    assert_eq!(result.counts.summary.updated, 1);
    assert_eq!(result.counts.summary.new, 1);

    let payload: NotificationPayload =
        serde_json::from_str(&fs::read_to_string(&payload_path).expect("read payload"))
            .expect("parse payload");
    assert_eq!(payload.scope_id.as_deref(), Some("team-a"));
    assert_eq!(payload.updated_records[0].remote_id.as_deref(), Some("recChess"));
    assert_eq!(payload.updated_records[0].root_domain, "pawnworks.example");
}

#[test]
fn without_scope_everything_is_new() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let args = analyze_args(dir.path(), &["--bulk-action", "skip"]);
    let result = run_analyze(&args).expect("analysis runs");

    assert!(result.success);
    assert_eq!(result.counts.summary.new, 1);
    assert_eq!(result.notification_delivered, None);
}

#[test]
fn missing_snapshot_file_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let args = analyze_args(
        dir.path(),
        &["--scope", "team-a", "--remote-snapshot", "/nonexistent/remote.json"],
    );
    let err = run_analyze(&args).expect_err("snapshot missing");
    assert!(format!("{err:#}").contains("remote snapshot"));
}

#[test]
fn json_result_shape() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let args = analyze_args(dir.path(), &["--json"]);
    let result = run_analyze(&args).expect("analysis runs");
    insta::assert_json_snapshot!(result.counts, @r#"
    {
      "parsedRows": 4,
      "duplicateGroups": 1,
      "collapsedRows": 1,
      "rejectedRows": 1,
      "lookupFailures": 0,
      "summary": {
        "totalProcessed": 2,
        "new": 2,
        "updated": 0,
        "unchanged": 0
      }
    }
    "#);
}
