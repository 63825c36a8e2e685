use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use recon_model::{
    CanonicalField, FieldSource, RemoteAction, RemoteCandidate, RemoteRecord, RemoteResolution,
    Row,
};
use recon_remote::{
    InMemoryStore, LookupMode, RemoteError, RemoteStore, apply_resolution, run_lookups,
};

fn existing() -> RemoteRecord {
    RemoteRecord::new("rec1")
        .with(CanonicalField::AppName, "Chess Club")
        .with(CanonicalField::Country, "NL")
        .with(CanonicalField::Developer, "Pawnworks")
        .with_scope("scope-1")
}

fn store() -> InMemoryStore {
    InMemoryStore::new(vec![
        existing(),
        RemoteRecord::new("rec2")
            .with(CanonicalField::GooglePlayId, "com.ledger.buddy")
            .with_scope("scope-1"),
        RemoteRecord::new("rec3")
            .with(CanonicalField::AppName, "Chess Club")
            .with_scope("scope-2"),
    ])
}

#[test]
fn lookup_is_limited_to_scope_and_identity_fields() {
    let store = store();
    let row = Row::new(0).with(CanonicalField::AppName, "Chess Club");
    let found = store.find_duplicates(&row, "scope-1").expect("in memory");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].record.id, "rec1");
    assert_eq!(found[0].matched_on, vec![CanonicalField::AppName]);

    let by_country = Row::new(1).with(CanonicalField::Country, "NL");
    assert!(store.find_duplicates(&by_country, "scope-1").expect("in memory").is_empty());
}

#[test]
fn any_identity_field_matches() {
    let row = Row::new(0)
        .with(CanonicalField::AppName, "Budget Buddy")
        .with(CanonicalField::GooglePlayId, "com.ledger.buddy");
    let found = store().find_duplicates(&row, "scope-1").expect("in memory");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].matched_on, vec![CanonicalField::GooglePlayId]);
}

#[test]
fn loads_both_snapshot_shapes() {
    let list = r#"[{"id":"rec1","fields":{"App Name":"Chess Club","Scope ID":"s"}}]"#;
    let page = r#"{"records":[{"id":"rec1","createdTime":"2024-01-01T00:00:00.000Z","fields":{"App ID":"42","Scope ID":"s"}}],"offset":null}"#;

    let from_list = InMemoryStore::from_json_str(list, "Scope ID").expect("list shape");
    let from_page = InMemoryStore::from_json_str(page, "Scope ID").expect("page shape");
    assert_eq!(from_list.len(), 1);
    let records = from_page.fetch_all().expect("in memory");
    assert_eq!(records[0].get(CanonicalField::AppId), "42");
    assert_eq!(records[0].scope.as_deref(), Some("s"));
}

#[test]
fn loads_snapshot_from_disk() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("remote.json");
    fs::write(
        &path,
        r#"[{"id":"rec9","fields":{"App Name":"Trail Finder","Scope ID":"s"}}]"#,
    )
    .expect("write snapshot");

    let store = InMemoryStore::load(&path, "Scope ID").expect("load snapshot");
    assert_eq!(store.len(), 1);

    let missing = InMemoryStore::load(&dir.path().join("absent.json"), "Scope ID")
        .expect_err("missing file");
    assert!(matches!(missing, RemoteError::Snapshot { .. }));
}

/// Store that fails for rows whose App Name starts with "fail".
struct FlakyStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
}

impl RemoteStore for FlakyStore {
    fn fetch_all(&self) -> recon_remote::Result<Vec<RemoteRecord>> {
        self.inner.fetch_all()
    }

    fn find_duplicates(
        &self,
        row: &Row,
        scope_id: &str,
    ) -> recon_remote::Result<Vec<RemoteCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if row.get(CanonicalField::AppName).starts_with("fail") {
            return Err(RemoteError::Network("connection reset".to_string()));
        }
        self.inner.find_duplicates(row, scope_id)
    }
}

fn rows() -> Vec<Row> {
    vec![
        Row::new(0).with(CanonicalField::AppName, "Chess Club"),
        Row::new(2).with(CanonicalField::AppName, "fail-1"),
        Row::new(3).with(CanonicalField::AppName, "Unknown"),
        Row::new(5).with(CanonicalField::AppName, "fail-2"),
        Row::new(8).with(CanonicalField::AppName, "Chess Club"),
    ]
}

fn check_outcome(mode: LookupMode) {
    let store = FlakyStore {
        inner: store(),
        calls: AtomicUsize::new(0),
    };
    let progressed = AtomicUsize::new(0);
    let outcome = run_lookups(&store, &rows(), Some("scope-1"), mode, |done, total| {
        assert_eq!(total, 5);
        progressed.fetch_max(done, Ordering::SeqCst);
    });

    assert!(outcome.performed);
    let order: Vec<usize> = outcome.matches.iter().map(|m| m.row_index).collect();
    assert_eq!(order, vec![0, 2, 3, 5, 8]);
    assert_eq!(outcome.matched_rows(), 2);
    let failed: Vec<usize> = outcome.failures.iter().map(|f| f.row_index).collect();
    assert_eq!(failed, vec![2, 5]);
    assert!(!outcome.matches[1].has_candidates());
    assert_eq!(store.calls.load(Ordering::SeqCst), 5);
    assert_eq!(progressed.load(Ordering::SeqCst), 5);
}

#[test]
fn sequential_lookup_isolates_failures() {
    check_outcome(LookupMode::Sequential);
}

#[test]
fn bounded_lookup_keeps_row_order() {
    check_outcome(LookupMode::Bounded(2));
}

#[test]
fn missing_scope_skips_lookup() {
    let store = FlakyStore {
        inner: store(),
        calls: AtomicUsize::new(0),
    };
    let outcome = run_lookups(&store, &rows(), None, LookupMode::Sequential, |_, _| {});
    assert!(!outcome.performed);
    assert_eq!(outcome.matches.len(), 5);
    assert_eq!(outcome.matched_rows(), 0);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

fn imported() -> Row {
    Row::new(0)
        .with(CanonicalField::AppName, "Chess Club")
        .with(CanonicalField::Country, "BE")
        .with(CanonicalField::Developer, "")
}

#[test]
fn keep_and_replace_pick_one_side() {
    let record = existing();
    let row = imported();

    let kept = apply_resolution(&row, &record, &RemoteResolution::default());
    assert_eq!(kept[&CanonicalField::Country], "NL");

    let replace = RemoteResolution {
        action: RemoteAction::Replace,
        ..RemoteResolution::default()
    };
    let replaced = apply_resolution(&row, &record, &replace);
    assert_eq!(replaced[&CanonicalField::Country], "BE");
    assert_eq!(replaced[&CanonicalField::Developer], "");
}

#[test]
fn merge_defaults_to_existing_until_overridden() {
    let record = existing();
    let row = imported();
    let mut merge = RemoteResolution {
        action: RemoteAction::Merge,
        ..RemoteResolution::default()
    };
    assert_eq!(
        apply_resolution(&row, &record, &merge)[&CanonicalField::Country],
        "NL"
    );

    merge
        .fields
        .insert(CanonicalField::Country, FieldSource::Imported);
    merge
        .fields
        .insert(CanonicalField::Developer, FieldSource::Imported);
    let merged = apply_resolution(&row, &record, &merge);
    assert_eq!(merged[&CanonicalField::Country], "BE");
    assert_eq!(merged[&CanonicalField::Developer], "Pawnworks");
}
