#![allow(dead_code)]

use selecta_curator::RotationConfig;
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// A selection directory plus one source pool
pub struct Fixture {
    pub selection: TempDir,
    pub pool: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            selection: TempDir::new().expect("selection dir"),
            pool: TempDir::new().expect("pool dir"),
        }
    }

    pub fn config(&self, budget_bytes: u64) -> RotationConfig {
        RotationConfig {
            selection_path: self.selection.path().to_path_buf(),
            source_paths: vec![self.pool.path().to_path_buf()],
            budget_bytes,
            ..Default::default()
        }
    }

    pub fn add_source(&self, name: &str, size: usize) {
        write_file(self.pool.path(), name, size);
    }

    pub fn add_selected(&self, name: &str, size: usize) {
        write_file(self.selection.path(), name, size);
    }

    pub fn remove_selected(&self, name: &str) {
        fs::remove_file(self.selection.path().join(name)).expect("remove selected file");
    }

    pub fn manifest_path(&self) -> std::path::PathBuf {
        self.selection
            .path()
            .join(selecta_curator::DEFAULT_MANIFEST_FILE)
    }
}

pub fn write_file(dir: &Path, name: &str, size: usize) {
    fs::write(dir.join(name), vec![0u8; size]).expect("write fixture file");
}
