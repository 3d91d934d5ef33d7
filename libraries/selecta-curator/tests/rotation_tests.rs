mod test_helpers;

use rand::rngs::StdRng;
use rand::SeedableRng;
use selecta_core::{strip_ordinal_prefix, Manifest};
use selecta_curator::{
    sequence::adjacent_pairs, AlwaysConfirm, ManifestStore, NeverConfirm, RotationConfig,
    RotationController,
};
use std::fs;
use test_helpers::Fixture;

fn run(config: RotationConfig, seed: u64) -> selecta_curator::RotationSummary {
    let mut controller = RotationController::from_config(config).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    controller.run(&mut rng, &NeverConfirm).unwrap()
}

fn load(fixture: &Fixture) -> Manifest {
    ManifestStore::new(fixture.manifest_path())
        .load()
        .unwrap()
        .expect("manifest written")
}

#[test]
fn test_ingestion_rounds_are_part_ascending_per_category() {
    let fixture = Fixture::new();
    for category in ["A", "B"] {
        for part in 1..=3 {
            fixture.add_source(&format!("{category} - show parte {part}.mp4"), 10);
        }
    }
    let config = RotationConfig {
        max_per_category_per_round: 1,
        ..fixture.config(1_000_000)
    };

    let summary = run(config, 21);
    assert_eq!(summary.admitted, 6);

    let manifest = load(&fixture);
    let parts: Vec<u32> = manifest.items.iter().map(|i| i.part_number).collect();
    assert_eq!(parts, vec![1, 1, 2, 2, 3, 3]);
    for category in ["A", "B"] {
        let own: Vec<u32> = manifest
            .items
            .iter()
            .filter(|i| i.category == category)
            .map(|i| i.part_number)
            .collect();
        assert_eq!(own, vec![1, 2, 3]);
    }
}

#[test]
fn test_reduction_evicts_from_the_largest_category() {
    let fixture = Fixture::new();
    for part in 1..=3 {
        fixture.add_selected(&format!("A - show parte {part}.mp4"), 2);
    }
    fixture.add_selected("B - solo.mp4", 1);

    let summary = run(fixture.config(3), 4);

    assert_eq!(summary.evicted, 2);
    assert_eq!(summary.final_bytes, 3);
    assert!(summary.budget_satisfied);

    let manifest = load(&fixture);
    let mut remaining: Vec<&str> = manifest.canonical_names().into_iter().collect();
    remaining.sort_unstable();
    assert_eq!(remaining, vec!["A - show parte 1.mp4", "B - solo.mp4"]);
    assert!(!fixture.selection.path().join("A - show parte 3.mp4").exists());
}

#[test]
fn test_second_run_without_changes_is_a_no_op() {
    let fixture = Fixture::new();
    fixture.add_source("A - one.mp4", 5);
    fixture.add_source("B - two.mp4", 5);

    let first = run(fixture.config(1_000), 1);
    assert_eq!(first.admitted, 2);
    let before = fs::read(fixture.manifest_path()).unwrap();

    let second = run(fixture.config(1_000), 2);
    assert_eq!(second.admitted, 0);
    assert_eq!(second.evicted, 0);
    assert_eq!(fs::read(fixture.manifest_path()).unwrap(), before);
}

#[test]
fn test_manual_changes_are_absorbed() {
    let fixture = Fixture::new();
    fixture.add_source("A - one.mp4", 5);
    run(fixture.config(1_000), 1);

    fixture.remove_selected("A - one.mp4");
    fixture.add_selected("C - dropped in.mp4", 7);

    let summary = run(fixture.config(1_000), 2);

    assert_eq!(summary.reconciled_removed, 1);
    assert_eq!(summary.reconciled_added, 1);
    // The deleted item is back from the pool in the same run
    assert_eq!(summary.admitted, 1);
    let manifest = load(&fixture);
    assert_eq!(manifest.count(), 2);
    assert_eq!(manifest.total_bytes(), 12);
}

#[test]
fn test_corrupt_manifest_is_rebuilt_from_disk() {
    let fixture = Fixture::new();
    fixture.add_selected("A - x.mp4", 3);
    fixture.add_selected("0002 - B - y parte 2.mp4", 4);
    fs::write(fixture.manifest_path(), b"{ broken").unwrap();

    let summary = run(fixture.config(1_000), 3);

    assert_eq!(summary.reconciled_added, 2);
    let manifest = load(&fixture);
    assert_eq!(manifest.total_bytes(), 7);
    assert!(manifest.contains_canonical("B - y parte 2.mp4"));
}

#[test]
fn test_oversized_item_leaves_an_empty_selection() {
    let fixture = Fixture::new();
    fixture.add_source("A - huge.mp4", 50);

    let summary = run(fixture.config(10), 5);

    // Admitted on overshoot, evicted by the follow-up reduction, not re-admitted
    assert_eq!(summary.admitted, 1);
    assert_eq!(summary.evicted, 1);
    assert_eq!(summary.item_count, 0);
    assert!(summary.budget_satisfied);
    assert!(fixture.pool.path().join("A - huge.mp4").exists());
}

#[test]
fn test_randomized_order_interleaves_categories() {
    let fixture = Fixture::new();
    for n in 1..=3 {
        fixture.add_source(&format!("A - a{n}.mp4"), 1);
        fixture.add_source(&format!("B - b{n}.mp4"), 1);
        fixture.add_source(&format!("C - c{n}.mp4"), 1);
    }
    let config = RotationConfig {
        randomize_final_order: true,
        ..fixture.config(1_000)
    };

    let summary = run(config, 77);
    assert!(summary.sequenced);
    assert_eq!(summary.renamed, 9);

    let manifest = load(&fixture);
    assert_eq!(adjacent_pairs(&manifest.items), 0);
    for (index, item) in manifest.items.iter().enumerate() {
        assert!(item.current_name.starts_with(&format!("{:04} - ", index + 1)));
        assert_eq!(strip_ordinal_prefix(&item.current_name), item.canonical_name);
        assert!(fixture.selection.path().join(&item.current_name).exists());
    }
}

#[test]
fn test_unchanged_selection_asks_the_gate() {
    let fixture = Fixture::new();
    fixture.add_source("A - one.mp4", 1);
    fixture.add_source("B - two.mp4", 1);
    let config = RotationConfig {
        randomize_final_order: true,
        ..fixture.config(1_000)
    };
    run(config.clone(), 1);

    let mut controller = RotationController::from_config(config).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let declined = controller.run(&mut rng, &NeverConfirm).unwrap();
    assert!(!declined.sequenced);

    let accepted = controller.run(&mut rng, &AlwaysConfirm).unwrap();
    assert!(accepted.sequenced);
    assert_eq!(accepted.item_count, 2);
}

#[test]
fn test_rebuild_and_resequence() {
    let fixture = Fixture::new();
    fixture.add_selected("A - x.mp4", 2);
    fixture.add_selected("B - y.mp4", 2);
    let mut controller = RotationController::from_config(fixture.config(1_000)).unwrap();

    let rebuilt = controller.rebuild().unwrap();
    assert_eq!(rebuilt.count(), 2);
    assert!(fixture.manifest_path().exists());

    let mut rng = StdRng::seed_from_u64(6);
    let summary = controller.resequence(&mut rng).unwrap();
    assert!(summary.sequenced);
    assert_eq!(summary.renamed, 2);
    assert_eq!(fixture.selection.path().read_dir().unwrap().count(), 3);
}

#[test]
fn test_flagged_entries_are_purged_under_budget() {
    let fixture = Fixture::new();
    fixture.add_selected("A - fine.mp4", 4);
    fixture.add_selected("B - unreadable.mp4", 4);

    let mut recorded = Manifest::new(1_000);
    recorded.push(selecta_core::Item::from_disk_name("A - fine.mp4", 4));
    let mut flagged = selecta_core::Item::from_disk_name("B - unreadable.mp4", 0);
    flagged.pending_eviction = true;
    recorded.push(flagged);
    ManifestStore::new(fixture.manifest_path())
        .save(&mut recorded)
        .unwrap();

    let summary = run(fixture.config(1_000), 6);

    assert_eq!(summary.evicted, 1);
    assert!(summary.budget_satisfied);
    let manifest = load(&fixture);
    assert_eq!(manifest.count(), 1);
    assert!(manifest.items.iter().all(|i| !i.pending_eviction));
    assert!(!fixture.selection.path().join("B - unreadable.mp4").exists());
}

#[test]
fn test_reduction_keeps_uneven_categories_fair() {
    let fixture = Fixture::new();
    for part in 1..=10 {
        fixture.add_selected(&format!("A - show parte {part}.mp4"), 1);
    }
    fixture.add_selected("B - solo.mp4", 1);

    let summary = run(fixture.config(6), 13);

    assert_eq!(summary.evicted, 5);
    let manifest = load(&fixture);
    let counts = manifest.category_counts();
    assert_eq!(counts.get("A").copied(), Some(6));
    assert_eq!(counts.get("B"), None);
}
