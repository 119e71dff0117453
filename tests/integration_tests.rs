// Integration tests for Breed Assist

use breed_assist::core::{AffinityMatrix, AffinityModel, CharacterUniverse, Filter, FilterError};
use breed_assist::models::{FilterOutcome, ParentSlot, Selection, Thresholds, WhitelistStatus};
use breed_assist::services::{LoaderError, MatrixLoader};
use std::collections::HashSet;

/// Twelve characters with symmetric, uneven global affinity
fn create_test_world() -> (CharacterUniverse, AffinityMatrix, AffinityMatrix) {
    let n = 12;
    let universe = CharacterUniverse::new((0..n).map(|i| format!("C{}", i)).collect()).unwrap();
    let global = AffinityMatrix::from_rows(
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            0
                        } else {
                            ((i * i * 5 + j * j * 5 + i * j * 3 + 7) % 23) as i64
                        }
                    })
                    .collect()
            })
            .collect(),
    )
    .unwrap();
    let child = AffinityMatrix::from_rows(
        (0..n)
            .map(|i| (0..n).map(|j| ((i * 13 + j * 17) % 9) as i64).collect())
            .collect(),
    )
    .unwrap();
    (universe, global, child)
}

fn assert_well_formed(outcome: &FilterOutcome, universe: &CharacterUniverse, selection: &Selection) {
    let white: HashSet<&String> = outcome.whitelist.iter().collect();
    let black: HashSet<&String> = outcome.blacklist.iter().collect();

    assert_eq!(white.len(), outcome.whitelist.len(), "duplicate whitelist entry");
    assert_eq!(black.len(), outcome.blacklist.len(), "duplicate blacklist entry");
    assert!(white.is_disjoint(&black), "name on both lists");
    assert!(outcome.blacklist.len() <= outcome.stats.blacklist_target);
    assert!(!black.contains(&selection.child));

    for name in outcome.whitelist.iter().chain(&outcome.blacklist) {
        assert!(universe.index_of(name).is_some(), "{} not in universe", name);
    }
}

#[test]
fn test_integration_end_to_end_no_parents() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();
    let selection = Selection::new("C0");

    let outcome = Filter::new(Thresholds::new(20.0, 25.0))
        .run(&model, &selection, None)
        .unwrap();

    assert_well_formed(&outcome, &universe, &selection);
    assert_eq!(outcome.stats.total_pairs, 66);
    assert_eq!(outcome.stats.per_pass, 13);
    assert_eq!(outcome.stats.blacklist_target, 3);
    assert_eq!(outcome.stats.candidates_per_pair, 1);
    assert_eq!(outcome.stats.max_passes, 3);
    assert_eq!(outcome.blacklist, vec!["C2", "C1", "C10"]);
    assert_eq!(outcome.whitelist, vec!["C7", "C4"]);
    assert_eq!(outcome.status, WhitelistStatus::Recommended);
}

#[test]
fn test_integration_manual_ancestor_never_blacklisted() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();
    let filter = Filter::new(Thresholds::new(20.0, 25.0));

    let base = filter.run(&model, &Selection::new("C0"), None).unwrap();
    assert!(base.blacklist.contains(&"C2".to_string()));

    for side in [1, 2] {
        let mut selection = Selection::new("C0");
        let slot = ParentSlot::unselected().with_ancestors(["C2"]);
        if side == 1 {
            selection.parent1 = slot;
        } else {
            selection.parent2 = slot;
        }

        let outcome = filter.run(&model, &selection, None).unwrap();
        assert_well_formed(&outcome, &universe, &selection);
        assert!(!outcome.blacklist.contains(&"C2".to_string()));
        assert_eq!(outcome.blacklist.len(), 3);
    }
}

#[test]
fn test_integration_owned_side_ignores_manual_ancestors() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();
    let filter = Filter::new(Thresholds::new(20.0, 25.0));

    let mut plain = Selection::new("C0");
    plain.parent1 = ParentSlot::selected("C1", true);
    plain.parent2 = ParentSlot::selected("C2", false);

    let mut with_ancestors = plain.clone();
    with_ancestors.parent1 = ParentSlot::selected("C1", true).with_ancestors(["C8"]);

    let a = filter.run(&model, &plain, None).unwrap();
    let b = filter.run(&model, &with_ancestors, None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_integration_one_parent_owned() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();

    let mut selection = Selection::new("C0");
    selection.parent1 = ParentSlot::selected("C1", true);
    selection.parent2 = ParentSlot::selected("C2", false);

    let outcome = Filter::new(Thresholds::new(20.0, 25.0))
        .run(&model, &selection, None)
        .unwrap();

    assert_well_formed(&outcome, &universe, &selection);
    assert_eq!(outcome.whitelist, vec!["C2"]);
    assert_eq!(outcome.stats.total_pairs, 1);
    assert!(!outcome.blacklist.is_empty());
    for name in ["C1", "C2"] {
        assert!(!outcome.blacklist.contains(&name.to_string()));
    }
}

#[test]
fn test_integration_single_owned_parent_left_out() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();

    let mut selection = Selection::new("C0");
    selection.parent1 = ParentSlot::selected("C1", true);

    let outcome = Filter::new(Thresholds::new(20.0, 25.0))
        .run(&model, &selection, None)
        .unwrap();

    assert_well_formed(&outcome, &universe, &selection);
    assert_eq!(outcome.stats.total_pairs, 11);
    assert!(!outcome.whitelist.contains(&"C1".to_string()));
    assert_eq!(outcome.whitelist, vec!["C5"]);
}

#[test]
fn test_integration_parent2_only() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();

    let mut selection = Selection::new("C0");
    selection.parent2 = ParentSlot::selected("C3", false);

    let outcome = Filter::new(Thresholds::new(20.0, 25.0))
        .run(&model, &selection, None)
        .unwrap();

    assert_well_formed(&outcome, &universe, &selection);
    assert_eq!(outcome.stats.total_pairs, 11);
    assert!(!outcome.blacklist.contains(&"C3".to_string()));
    assert_eq!(outcome.whitelist, vec!["C3", "C7"]);
}

#[test]
fn test_integration_multi_pass_blacklist() {
    let n = 10;
    let universe = CharacterUniverse::new((0..n).map(|i| format!("C{}", i)).collect()).unwrap();
    let global = AffinityMatrix::from_rows(
        (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0 } else { (i + j) as i64 }).collect())
            .collect(),
    )
    .unwrap();
    let child = AffinityMatrix::from_rows(
        (0..n)
            .map(|i| (0..n).map(|j| ((i * 7 + j * 3) % 10) as i64).collect())
            .collect(),
    )
    .unwrap();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();

    let mut selection = Selection::new("C9");
    selection.parent1 = ParentSlot::selected("C8", true);

    let outcome = Filter::new(Thresholds::new(10.0, 40.0))
        .run(&model, &selection, None)
        .unwrap();

    assert_well_formed(&outcome, &universe, &selection);
    assert_eq!(outcome.stats.per_pass, 1);
    assert_eq!(outcome.stats.blacklist_target, 4);
    assert_eq!(outcome.stats.candidates_per_pair, 1);
    assert_eq!(outcome.stats.max_passes, 4);
    assert_eq!(outcome.stats.passes_run, 4);
    // Every pass scans the top pair (C8, C7) again
    assert_eq!(outcome.blacklist, vec!["C4", "C1", "C5", "C2"]);
}

#[test]
fn test_integration_deterministic() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();
    let filter = Filter::new(Thresholds::new(10.0, 40.0));

    let mut selection = Selection::new("C5");
    selection.parent1 = ParentSlot::selected("C9", false).with_ancestors(["C3"]);

    let first = filter.run(&model, &selection, None).unwrap();
    for _ in 0..5 {
        assert_eq!(filter.run(&model, &selection, None).unwrap(), first);
    }
}

#[test]
fn test_integration_blacklist_grows_with_y() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();

    for child_name in ["C0", "C1", "C2"] {
        for x in [5.0, 10.0, 20.0, 50.0] {
            let mut previous = 0;
            for step in 0..=20 {
                let y = step as f64 * 5.0;
                let selection = Selection::new(child_name);
                let outcome = Filter::new(Thresholds::new(x, y))
                    .run(&model, &selection, None)
                    .unwrap();
                assert_well_formed(&outcome, &universe, &selection);
                assert!(
                    outcome.blacklist.len() >= previous,
                    "blacklist shrank for child {} at x={}, y={}",
                    child_name,
                    x,
                    y
                );
                previous = outcome.blacklist.len();
            }
        }
    }
}

#[test]
fn test_integration_both_owned() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();

    let mut selection = Selection::new("C0");
    selection.parent1 = ParentSlot::selected("C4", true);
    selection.parent2 = ParentSlot::selected("C7", true);

    let outcome = Filter::default().run(&model, &selection, None).unwrap();
    assert!(outcome.whitelist.is_empty());
    assert!(outcome.blacklist.is_empty());
    assert_eq!(outcome.status, WhitelistStatus::NothingNeeded);
}

#[test]
fn test_integration_degenerate_universes() {
    let universe = CharacterUniverse::new(vec!["Solo".into()]).unwrap();
    let matrix = AffinityMatrix::zeros(1);
    let model = AffinityModel::new(&universe, &matrix, &matrix).unwrap();

    let outcome = Filter::new(Thresholds::new(100.0, 100.0))
        .run(&model, &Selection::new("Solo"), None)
        .unwrap();
    assert_eq!(outcome.stats.total_pairs, 0);
    assert!(outcome.whitelist.is_empty());
    assert!(outcome.blacklist.is_empty());
    assert_eq!(outcome.status, WhitelistStatus::NoCandidates);

    let universe = CharacterUniverse::new(vec!["A".into(), "B".into()]).unwrap();
    let matrix = AffinityMatrix::zeros(2);
    let model = AffinityModel::new(&universe, &matrix, &matrix).unwrap();
    let outcome = Filter::new(Thresholds::new(100.0, 100.0))
        .run(&model, &Selection::new("A"), None)
        .unwrap();
    // The only pair holds both characters, so nothing can be eliminated
    assert_eq!(outcome.stats.total_pairs, 1);
    assert!(outcome.blacklist.is_empty());
    assert_eq!(outcome.whitelist, vec!["A", "B"]);
}

#[test]
fn test_integration_unknown_names_fail_fast() {
    let (universe, global, child) = create_test_world();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();

    let mut selection = Selection::new("C0");
    selection.parent2 = ParentSlot::selected("Nobody", false);
    let err = Filter::default().run(&model, &selection, None).unwrap_err();
    assert_eq!(err, FilterError::UnknownCharacter("Nobody".to_string()));
}

#[test]
fn test_integration_loads_tables_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let global_path = dir.path().join("2gen.csv");
    std::fs::write(
        &global_path,
        "\
No,名前,列クリックでソート→,A,B,C,D,合計
1,A,,0,10,0,0,10
2,B,,10,0,0,0,10
3,C,,0,0,0,0,0
4,D,,0,0,0,0,0
",
    )
    .unwrap();

    let child_dir = dir.path().join("3gen");
    std::fs::create_dir(&child_dir).unwrap();
    // Shift_JIS export, columns in a different order than the rows
    let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(
        "\
,名前,親相性,D,C,B,A,合計
,A,,0,0,0,0,0
,B,,0,0,0,0,0
,C,,0,0,0,0,0
,D,,0,0,0,0,0
",
    );
    std::fs::write(child_dir.join("A.csv"), &encoded).unwrap();

    let loader = MatrixLoader::default();
    let (universe, global) = loader.load_global(&global_path).unwrap();
    let child = loader.load_child(&child_dir, "A", &universe).unwrap();
    let model = AffinityModel::new(&universe, &global, &child).unwrap();

    let outcome = Filter::new(Thresholds::new(50.0, 25.0))
        .run(&model, &Selection::new("A"), None)
        .unwrap();
    assert_eq!(outcome.blacklist, vec!["C"]);
    assert_eq!(outcome.whitelist.first().map(String::as_str), Some("B"));

    let missing = loader.load_child(&child_dir, "B", &universe).unwrap_err();
    assert!(matches!(missing, LoaderError::NotFound(_)));
}
