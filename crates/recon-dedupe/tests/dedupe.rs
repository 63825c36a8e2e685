use std::collections::BTreeSet;

use proptest::prelude::*;
use recon_dedupe::{
    CsvResolutions, DedupeError, collapse_stats, composite_key, find_duplicate_groups,
    resolve_survivors,
};
use recon_model::{CanonicalField, CsvAction, MatchFieldSet, Row};

fn app(index: usize, name: &str, website: &str, country: &str) -> Row {
    Row::new(index)
        .with(CanonicalField::AppName, name)
        .with(CanonicalField::CompanyWebsite, website)
        .with(CanonicalField::Country, country)
}

fn name_and_website() -> MatchFieldSet {
    [CanonicalField::CompanyWebsite, CanonicalField::AppName]
        .into_iter()
        .collect()
}

fn five_rows() -> Vec<Row> {
    vec![
        app(0, "Chess Club", "pawnworks.example", "NL"),
        app(1, "Budget Buddy", "ledgerlabs.example", "US"),
        app(2, "Chess Club", "pawnworks.example", "BE"),
        app(3, "Trail Finder", "northbound.example", "CA"),
        app(4, "Chess Club", "other.example", "DE"),
    ]
}

#[test]
fn composite_key_uses_canonical_order() {
    let row = app(0, "Chess Club", "pawnworks.example", "NL");
    insta::assert_snapshot!(
        composite_key(&row, &name_and_website()),
        @"appName:Chess Club|companyWebsite:pawnworks.example"
    );
}

#[test]
fn separators_inside_values_do_not_merge_rows() {
    let fields: MatchFieldSet = [CanonicalField::AppName, CanonicalField::AppId]
        .into_iter()
        .collect();
    let rows = vec![
        Row::new(0)
            .with(CanonicalField::AppName, "a|appId:b")
            .with(CanonicalField::AppId, "c"),
        Row::new(1)
            .with(CanonicalField::AppName, "a")
            .with(CanonicalField::AppId, "b|appId:c"),
    ];
    assert_ne!(composite_key(&rows[0], &fields), composite_key(&rows[1], &fields));
    insta::assert_snapshot!(composite_key(&rows[0], &fields), @r"appName:a\|appId\:b|appId:c");

    let groups = find_duplicate_groups(&rows, &fields).expect("fields selected");
    assert!(groups.is_empty());

    let mut resolutions = CsvResolutions::new();
    resolutions.apply_bulk_action(&groups, CsvAction::Skip);
    assert_eq!(resolve_survivors(&rows, &groups, &resolutions).len(), 2);
}

#[test]
fn no_match_fields_means_no_duplicates() {
    assert_eq!(
        find_duplicate_groups(&five_rows(), &MatchFieldSet::new()),
        Err(DedupeError::NoMatchFields)
    );
}

#[test]
fn two_shared_rows_collapse_to_four_survivors() {
    let rows = five_rows();
    let groups = find_duplicate_groups(&rows, &name_and_website()).expect("fields selected");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members, vec![0, 2]);

    let mut resolutions = CsvResolutions::new();
    resolutions.apply_bulk_action(&groups, CsvAction::KeepFirst);
    let survivors = resolve_survivors(&rows, &groups, &resolutions);

    let indices: Vec<usize> = survivors.iter().map(|r| r.original_index).collect();
    assert_eq!(indices, vec![0, 1, 3, 4]);
    assert_eq!(survivors[0].get(CanonicalField::Country), "NL");

    let stats = collapse_stats(&rows, &groups, &resolutions);
    assert_eq!(stats.collapsed, 1);
    assert_eq!(stats.survivors, 4);
}

#[test]
fn keep_last_keeps_the_later_row() {
    let rows = five_rows();
    let groups = find_duplicate_groups(&rows, &name_and_website()).expect("fields selected");
    let mut resolutions = CsvResolutions::new();
    resolutions.apply_bulk_action(&groups, CsvAction::KeepLast);

    let survivors = resolve_survivors(&rows, &groups, &resolutions);
    let indices: Vec<usize> = survivors.iter().map(|r| r.original_index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert_eq!(survivors[1].get(CanonicalField::Country), "BE");
}

#[test]
fn merge_takes_overridden_fields_from_other_members() {
    let rows = five_rows();
    let groups = find_duplicate_groups(&rows, &name_and_website()).expect("fields selected");
    let key = groups[0].key.clone();
    let mut resolutions = CsvResolutions::new();
    resolutions.apply_bulk_action(&groups, CsvAction::Merge);
    resolutions
        .set_merge_field(&groups, &key, CanonicalField::Country, 1)
        .expect("member exists");

    let survivors = resolve_survivors(&rows, &groups, &resolutions);
    let merged = &survivors[0];
    assert_eq!(merged.original_index, 0);
    assert_eq!(merged.get(CanonicalField::AppName), "Chess Club");
    assert_eq!(merged.get(CanonicalField::Country), "BE");
    assert_eq!(survivors.len(), 4);
}

#[test]
fn skip_drops_every_member() {
    let rows = five_rows();
    let groups = find_duplicate_groups(&rows, &name_and_website()).expect("fields selected");
    let mut resolutions = CsvResolutions::new();
    resolutions.apply_bulk_action(&groups, CsvAction::Skip);

    let survivors = resolve_survivors(&rows, &groups, &resolutions);
    assert_eq!(survivors.len(), 3);
    let stats = collapse_stats(&rows, &groups, &resolutions);
    assert_eq!((stats.skipped, stats.survivors), (2, 3));
}

#[test]
fn explicit_member_selection_wins() {
    let rows = vec![
        app(0, "A", "", ""),
        app(1, "A", "", "x"),
        app(2, "A", "", "y"),
    ];
    let fields: MatchFieldSet = [CanonicalField::AppName].into_iter().collect();
    let groups = find_duplicate_groups(&rows, &fields).expect("fields selected");
    let mut resolutions = CsvResolutions::new();
    resolutions.apply_bulk_action(&groups, CsvAction::KeepFirst);
    resolutions
        .select_member(&groups, &groups[0].key, 1)
        .expect("member");

    let survivors = resolve_survivors(&rows, &groups, &resolutions);
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].get(CanonicalField::Country), "x");
}

#[test]
fn unresolved_group_collapses_as_keep_first() {
    let rows = five_rows();
    let groups = find_duplicate_groups(&rows, &name_and_website()).expect("fields selected");
    let survivors = resolve_survivors(&rows, &groups, &CsvResolutions::new());
    assert_eq!(survivors.len(), 4);
    assert_eq!(survivors[0].get(CanonicalField::Country), "NL");
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    proptest::collection::vec(
        (
            prop::sample::select(vec!["A", "B", "", "A|companyWebsite:x.example", "A\\"]),
            prop::sample::select(vec![
                "x.example",
                "y.example",
                "|x.example",
                "x.example|appName:A",
                ":x.example",
            ]),
            prop::sample::select(vec!["NL", "US", "CA"]),
        ),
        0..24,
    )
    .prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(idx, (name, web, country))| app(idx, name, web, country))
            .collect()
    })
}

fn arb_action() -> impl Strategy<Value = CsvAction> {
    prop::sample::select(vec![
        CsvAction::KeepFirst,
        CsvAction::KeepLast,
        CsvAction::Merge,
        CsvAction::Skip,
    ])
}

proptest! {
    #[test]
    fn groups_partition_rows_by_field_equality(rows in arb_rows()) {
        let fields = name_and_website();
        let groups = find_duplicate_groups(&rows, &fields).expect("fields selected");

        let mut seen = BTreeSet::new();
        for group in &groups {
            prop_assert!(group.members.len() >= 2);
            prop_assert!(group.members.windows(2).all(|w| w[0] < w[1]));
            let first = &rows[group.members[0]];
            for idx in &group.members {
                prop_assert!(seen.insert(*idx));
                let row = &rows[*idx];
                for field in fields.iter() {
                    prop_assert_eq!(row.get(field), first.get(field));
                }
            }
        }
        for row in &rows {
            let twins = rows
                .iter()
                .filter(|other| fields.iter().all(|field| other.get(field) == row.get(field)))
                .count();
            prop_assert_eq!(twins >= 2, seen.contains(&row.original_index));
        }
    }

    #[test]
    fn resolving_survivors_is_idempotent(rows in arb_rows(), action in arb_action()) {
        let fields = name_and_website();
        let groups = find_duplicate_groups(&rows, &fields).expect("fields selected");
        let mut resolutions = CsvResolutions::new();
        resolutions.apply_bulk_action(&groups, action);

        let once = resolve_survivors(&rows, &groups, &resolutions);
        let twice = resolve_survivors(&once, &groups, &resolutions);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(
            collapse_stats(&rows, &groups, &resolutions).survivors,
            once.len()
        );
    }
}
