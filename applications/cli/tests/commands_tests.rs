use selecta_cli::{commands, CliConfig};
use selecta_curator::{NeverConfirm, LOCK_FILE_NAME};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, selection: &TempDir, pool: &TempDir, budget: u64) -> CliConfig {
    let path = dir.path().join("selecta.toml");
    fs::write(
        &path,
        format!(
            "selection_path = {:?}\nsource_paths = [{:?}]\nbudget_bytes = {}\nrandomize_final_order = true\n",
            selection.path().display().to_string(),
            pool.path().display().to_string(),
            budget
        ),
    )
    .unwrap();
    CliConfig::load(Some(&path)).unwrap()
}

#[test]
fn test_run_then_status() {
    let dir = TempDir::new().unwrap();
    let selection = TempDir::new().unwrap();
    let pool = TempDir::new().unwrap();
    fs::write(pool.path().join("A - one.mp4"), vec![0u8; 10]).unwrap();
    fs::write(pool.path().join("B - two.mp4"), vec![0u8; 10]).unwrap();
    let config = write_config(&dir, &selection, &pool, 1_000);

    let summary = commands::run(&config, &NeverConfirm, Some(42)).unwrap();
    assert_eq!(summary.admitted, 2);
    assert!(summary.sequenced);

    let status = commands::status(&config).unwrap();
    assert!(status.contains("Items:  2"));
    assert!(status.contains("  A: 1"));
    assert!(status.contains("  B: 1"));
}

#[test]
fn test_same_seed_gives_same_order() {
    let mut orders = Vec::new();
    for _ in 0..2 {
        let dir = TempDir::new().unwrap();
        let selection = TempDir::new().unwrap();
        let pool = TempDir::new().unwrap();
        for name in ["A - 1.mp4", "A - 2.mp4", "B - 1.mp4", "B - 2.mp4", "C - 1.mp4"] {
            fs::write(pool.path().join(name), b"x").unwrap();
        }
        let config = write_config(&dir, &selection, &pool, 1_000);
        commands::run(&config, &NeverConfirm, Some(7)).unwrap();

        let mut names: Vec<String> = fs::read_dir(selection.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".mp4"))
            .collect();
        names.sort();
        orders.push(names);
    }
    assert_eq!(orders[0], orders[1]);
}

#[test]
fn test_unlock_and_rebuild() {
    let dir = TempDir::new().unwrap();
    let selection = TempDir::new().unwrap();
    let pool = TempDir::new().unwrap();
    fs::write(selection.path().join("A - kept.mp4"), b"abc").unwrap();
    fs::write(selection.path().join(LOCK_FILE_NAME), b"999").unwrap();
    let config = write_config(&dir, &selection, &pool, 1_000);

    assert!(commands::rebuild(&config).is_err());
    assert!(commands::unlock(&config).unwrap());
    assert!(!commands::unlock(&config).unwrap());

    let manifest = commands::rebuild(&config).unwrap();
    assert_eq!(manifest.count(), 1);
    assert_eq!(manifest.total_bytes(), 3);
}
