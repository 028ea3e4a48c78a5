//! End-to-end tests for the deduplication engine
//!
//! Scenario tests over a realistic weekly menu, plus property-based tests
//! for the algebra the engine relies on.

use mealdedup::{
    apply_mapping, are_duplicates, explain, similarity, ApplyMode, ApplyOutcome, DedupOptions,
    Deduplicator, MealStore, MemoryStore, RuleId,
};
use mealdedup::apply::Day;
use mealdedup::rules::DishProfile;
use proptest::prelude::*;
use std::collections::HashSet;

const MENU: [&str; 11] = [
    "Schnitzel mit Pommes a,c",
    "Schnitzel mit Pommes",
    "Schnitzel mit Pommes dazu Salat",
    "Wok Jakarta mit Reis",
    "Wok Jakarta Gemüsemischung",
    "Hähnchen Curry mit Reis",
    "Rind Curry mit Reis",
    "Kartoffelgratin mit Blattsalat",
    "Kartoffelgratin mit Blattsalaat",
    "Feiertag - Mensa geschlossen",
    "a, c",
];

// === Scenarios ===

#[test]
fn test_weekly_menu_groups() {
    let report = Deduplicator::new().run(MENU);

    assert_eq!(report.total_names, 11);
    let groups: Vec<(Vec<&str>, &str)> = report
        .groups
        .iter()
        .map(|g| {
            (
                g.members.iter().map(String::as_str).collect(),
                g.canonical.as_str(),
            )
        })
        .collect();

    assert_eq!(
        groups,
        vec![
            (
                vec!["Kartoffelgratin mit Blattsalaat", "Kartoffelgratin mit Blattsalat"],
                "Kartoffelgratin mit Blattsalaat",
            ),
            (
                vec![
                    "Schnitzel mit Pommes",
                    "Schnitzel mit Pommes a,c",
                    "Schnitzel mit Pommes dazu Salat",
                ],
                "Schnitzel mit Pommes dazu Salat",
            ),
            (
                vec!["Wok Jakarta Gemüsemischung", "Wok Jakarta mit Reis"],
                "Wok Jakarta mit Reis",
            ),
        ]
    );
    assert_eq!(report.merge_count(), 4);
}

#[test]
fn test_weekly_menu_rules() {
    let options = DedupOptions::default();
    let rule = |a: &str, b: &str| explain(a, b, &options).rule;

    assert_eq!(
        rule("Schnitzel mit Pommes", "Schnitzel mit Pommes a,c"),
        Some(RuleId::ExactMatch)
    );
    assert_eq!(
        rule("Schnitzel mit Pommes", "Schnitzel mit Pommes dazu Salat"),
        Some(RuleId::MainDishSimilarity)
    );
    assert_eq!(
        rule("Wok Jakarta Gemüsemischung", "Wok Jakarta mit Reis"),
        Some(RuleId::HeadlineEqual)
    );
    assert_eq!(
        rule("Kartoffelgratin mit Blattsalaat", "Kartoffelgratin mit Blattsalat"),
        Some(RuleId::NearExact)
    );
    assert_eq!(
        rule("Hähnchen Curry mit Reis", "Rind Curry mit Reis"),
        Some(RuleId::ProteinVeto)
    );
    assert_eq!(rule("a, c", "Schnitzel"), Some(RuleId::EmptyName));
}

#[test]
fn test_decomposed_umlauts() {
    // "a" + COMBINING DIAERESIS
    let decomposed = "Ha\u{0308}hnchen mit Reis";
    assert!(are_duplicates(
        decomposed,
        "Hähnchen mit Reis",
        &DedupOptions::default()
    ));
}

#[test]
fn test_conservative_preset() {
    // Similarity is exactly 0.88: enough for the default threshold only
    let a = format!("{}abc", "x".repeat(22));
    let b = format!("{}def", "x".repeat(22));

    let default = explain(&a, &b, &DedupOptions::default());
    assert_eq!(default.rule, Some(RuleId::OverallSimilarity));
    assert!(!are_duplicates(&a, &b, &DedupOptions::conservative()));
}

#[test]
fn test_apply_weekly_menu() {
    let mut store = MemoryStore::new();
    let ids: Vec<u64> = MENU.iter().map(|name| store.add_meal(*name)).collect();
    store.add_day(Day {
        daily_special: Some(ids[0]),
        wok: Some(ids[4]),
        ..Day::new("2024-03-04")
    });

    let report = Deduplicator::new().run(store.meal_names());
    let applied = apply_mapping(&mut store, &report.mapping, ApplyMode::Commit).unwrap();

    assert_eq!(applied.merged(), 4);
    assert_eq!(applied.skipped(), 0);
    assert!(applied
        .records
        .iter()
        .all(|record| record.outcome == ApplyOutcome::Merged));

    let special = store.find_id("Schnitzel mit Pommes dazu Salat").unwrap();
    let wok = store.find_id("Wok Jakarta mit Reis").unwrap();
    assert_eq!(store.days()[0].daily_special, special);
    assert_eq!(store.days()[0].wok, wok);
    assert_eq!(store.meals().len(), 7);

    // Applying again finds nothing left to do
    let again = Deduplicator::new().run(store.meal_names());
    assert!(!again.has_duplicates());
}

#[test]
fn test_store_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut store = MemoryStore::new();
    store.add_meal("Gulasch mit Spätzle");
    store.add_meal("Gulasch mit Spaetzle a");
    store.save(&path).unwrap();

    let mut loaded = MemoryStore::load(&path).unwrap();
    let report = Deduplicator::new().run(loaded.meal_names());
    apply_mapping(&mut loaded, &report.mapping, ApplyMode::Commit).unwrap();
    loaded.save(&path).unwrap();

    assert_eq!(MemoryStore::load(&path).unwrap().meals().len(), 1);
}

#[test]
fn test_names_file_formats() {
    let dir = tempfile::tempdir().unwrap();

    let lines = dir.path().join("names.txt");
    std::fs::write(&lines, MENU.join("\n")).unwrap();
    let json = dir.path().join("names.json");
    std::fs::write(&json, serde_json::to_string(&MENU).unwrap()).unwrap();

    assert_eq!(
        mealdedup::read_names(&lines).unwrap(),
        mealdedup::read_names(&json).unwrap()
    );
}

// === Property-Based Tests ===

fn dish_name() -> impl Strategy<Value = String> {
    "(Schnitzel|Gulasch|Hähnchen|Rind|Fisch|Wok|Curry|Reis|Pommes|Spätzle|Spaetzle|mit|dazu|und|a|c|3|,|-){1,6}"
        .prop_map(|s| s.trim().to_string())
}

fn spaced_name() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "Schnitzel", "Gulasch", "Hähnchen", "Rind", "Wok", "Curry", "Reis", "Pommes",
            "Spätzle", "mit", "dazu", "und", "a", "c1", "3,", "-",
        ]),
        1..7,
    )
    .prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn test_similarity_reflexive(s in "[a-zäöü ]{0,30}") {
        prop_assert_eq!(similarity(&s, &s), 1.0);
    }

    #[test]
    fn test_similarity_symmetric_and_bounded(a in "[a-zäöü ]{0,30}", b in "[a-zäöü ]{0,30}") {
        let ab = similarity(&a, &b);
        prop_assert_eq!(ab, similarity(&b, &a));
        prop_assert!((0.0..=1.0).contains(&ab), "similarity out of range: {}", ab);
    }

    #[test]
    fn test_predicate_asymmetry_only_from_headline_guard(a in spaced_name(), b in spaced_name()) {
        let options = DedupOptions::default();
        let ab = explain(&a, &b, &options);
        let ba = explain(&b, &a, &options);

        if ab.duplicate != ba.duplicate {
            // The merging side passed the length guard on its first headline,
            // the other side failed it
            let (merging, blocked) = if ab.duplicate { (&ab, &b) } else { (&ba, &a) };
            prop_assert_eq!(merging.rule, Some(RuleId::HeadlineSimilar));
            let headline = DishProfile::new(blocked).headline;
            prop_assert!(
                headline.chars().count() <= options.min_headline_chars,
                "asymmetric merge with long headline {:?}",
                headline
            );
        }
    }

    #[test]
    fn test_protein_veto_absolute(
        tail1 in "( (Curry|Reis|Pommes|Salat|Sauce|mit|dazu)){0,4}",
        tail2 in "( (Curry|Reis|Pommes|Salat|Sauce|mit|dazu)){0,4}",
    ) {
        let a = format!("Hähnchen{tail1}");
        let b = format!("Rind{tail2}");
        let decision = explain(&a, &b, &DedupOptions::default());
        prop_assert!(!decision.duplicate);
        prop_assert_eq!(decision.rule, Some(RuleId::ProteinVeto));
    }

    #[test]
    fn test_run_order_insensitive(names in prop::collection::vec(spaced_name(), 0..12)) {
        let dedup = Deduplicator::new();
        let forward = dedup.run(&names);
        let backward = dedup.run(names.iter().rev());
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward, dedup.run(&names));
    }

    #[test]
    fn test_parallel_matches_sequential(names in prop::collection::vec(dish_name(), 0..12)) {
        let parallel = Deduplicator::new().run(&names);
        let sequential = Deduplicator::new().sequential().run(&names);
        prop_assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_report_well_formed(names in prop::collection::vec(spaced_name(), 0..15)) {
        let report = Deduplicator::new().run(&names);
        let mut seen = HashSet::new();

        for group in &report.groups {
            prop_assert!(group.len() >= 2);
            prop_assert!(group.members.contains(&group.canonical));
            for member in &group.members {
                prop_assert!(seen.insert(member.clone()), "{} in two groups", member);
            }
        }

        for (old, canonical) in report.mapping.iter() {
            prop_assert_ne!(old, canonical);
            // Canonical names are fixed points
            prop_assert_eq!(report.mapping.get(canonical), None);
        }
        prop_assert_eq!(report.mapping.len(), report.merge_count());
    }
}
