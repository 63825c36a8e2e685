use std::collections::BTreeSet;

use proptest::prelude::*;
use recon_ingest::parse_csv_str;
use recon_map::{MappingError, MappingState};
use recon_model::{CanonicalField, FieldSlot};

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

fn assert_one_slot_per_header(state: &MappingState) {
    for header in state.headers() {
        let count = state
            .mapping()
            .iter()
            .filter(|(_, mapped)| mapped == header)
            .count();
        assert_eq!(count, 1, "header {header} holds {count} slots");
    }
    assert_eq!(state.mapping().len(), state.headers().len());
}

#[test]
fn auto_maps_labels_case_insensitively() {
    let state = MappingState::auto_map(&headers(&[
        "app name",
        "GOOGLE PLAY ID",
        "Monthly Downloads",
    ]));

    assert_eq!(
        state.slot_for("app name"),
        Some(&FieldSlot::Canonical(CanonicalField::AppName))
    );
    assert_eq!(
        state.slot_for("GOOGLE PLAY ID"),
        Some(&FieldSlot::Canonical(CanonicalField::GooglePlayId))
    );
    assert_eq!(
        state.slot_for("Monthly Downloads").map(FieldSlot::key),
        Some("custom_Monthly Downloads".to_string())
    );
    assert!(state.has_required());
    assert_one_slot_per_header(&state);
}

#[test]
fn missing_app_name_blocks_progression() {
    let state = MappingState::auto_map(&headers(&["Title", "Country"]));
    assert!(!state.has_required());
    assert_eq!(
        state.ensure_required(),
        Err(MappingError::RequiredFieldUnmapped {
            field: CanonicalField::AppName
        })
    );
}

#[test]
fn remap_moves_header_and_displaces_previous_holder() {
    let mut state = MappingState::auto_map(&headers(&["App Name", "Title"]));
    state
        .assign_field("Title", CanonicalField::AppName)
        .expect("assign title");

    assert_eq!(
        state.mapping().header_for_field(CanonicalField::AppName),
        Some("Title")
    );
    assert_eq!(
        state.slot_for("App Name"),
        Some(&FieldSlot::custom("App Name"))
    );
    assert_eq!(state.revision(), 1);
    assert_one_slot_per_header(&state);
}

#[test]
fn unassign_reverts_header_to_custom() {
    let mut state = MappingState::auto_map(&headers(&["App Name", "Country"]));
    assert_eq!(
        state.unassign(CanonicalField::Country).as_deref(),
        Some("Country")
    );
    assert_eq!(state.custom_headers(), vec!["Country"]);
    assert_eq!(state.unassign(CanonicalField::Country), None);
}

#[test]
fn rejects_unknown_header_and_foreign_custom_slot() {
    let mut state = MappingState::auto_map(&headers(&["App Name", "Notes"]));
    assert!(matches!(
        state.assign_field("Nope", CanonicalField::AppId),
        Err(MappingError::UnknownHeader { .. })
    ));
    assert!(matches!(
        state.assign("Notes", FieldSlot::custom("Other")),
        Err(MappingError::CustomSlotMismatch { .. })
    ));
}

#[test]
fn apply_builds_rows_with_custom_fields() {
    let table = parse_csv_str(
        "App Name,Company Website,Monthly Downloads\nChess Club,pawnworks.example,120000\n",
    )
    .expect("parse csv");
    let state = MappingState::auto_map(&table.headers);
    let rows = state.apply(&table);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].original_index, 0);
    assert_eq!(rows[0].get(CanonicalField::AppName), "Chess Club");
    assert_eq!(
        rows[0].get(CanonicalField::CompanyWebsite),
        "pawnworks.example"
    );
    assert_eq!(
        rows[0]
            .custom_fields
            .get("Monthly Downloads")
            .map(String::as_str),
        Some("120000")
    );
}

#[test]
fn summary_lists_missing_fields() {
    let state = MappingState::auto_map(&headers(&["App Name", "App ID", "Extra"]));
    let summary = state.summary();
    assert_eq!(summary.canonical_mapped, 2);
    assert_eq!(summary.custom, 1);
    assert_eq!(summary.missing.len(), CanonicalField::ALL.len() - 2);
    assert!(summary.required_mapped);
}

fn header_strategy() -> impl Strategy<Value = Vec<String>> {
    let pool: Vec<String> = CanonicalField::ALL
        .iter()
        .map(|f| f.label().to_string())
        .chain(["Notes", "Revenue", "Owner"].map(String::from))
        .collect();
    proptest::sample::subsequence(pool, 1..=13).prop_shuffle()
}

proptest! {
    #[test]
    fn every_header_keeps_exactly_one_slot(
        headers in header_strategy(),
        moves in proptest::collection::vec((0usize..13, 0usize..11), 0..20),
    ) {
        let mut state = MappingState::auto_map(&headers);
        for (header_pick, target) in moves {
            let header = headers[header_pick % headers.len()].clone();
            let slot = match CanonicalField::ALL.get(target) {
                Some(field) => FieldSlot::Canonical(*field),
                None => FieldSlot::custom(header.clone()),
            };
            state.assign(&header, slot).expect("assign known header");
        }
        let mapped: BTreeSet<&str> = state.mapping().iter().map(|(_, h)| h).collect();
        prop_assert_eq!(mapped.len(), headers.len());
        prop_assert_eq!(state.mapping().len(), headers.len());
    }
}
