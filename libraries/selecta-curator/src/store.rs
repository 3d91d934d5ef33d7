//! Manifest persistence
//!
//! The manifest is written to `<name>.tmp` and renamed over the real file, so a
//! crash mid-write leaves the previous manifest intact.

use selecta_core::{Manifest, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Durable store for the selection manifest
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the manifest
    ///
    /// Returns `Ok(None)` when the file is absent or cannot be parsed; a corrupt
    /// manifest is rebuilt from disk by the caller. Only I/O failures other than
    /// "not found" are errors.
    pub fn load(&self) -> Result<Option<Manifest>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!("Manifest {} is not valid UTF-8, ignoring it", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Manifest>(&contents) {
            Ok(manifest) => {
                tracing::info!(
                    "Manifest loaded ({} items, {})",
                    manifest.count(),
                    selecta_core::format_bytes(manifest.total_bytes())
                );
                Ok(Some(manifest))
            }
            Err(e) => {
                tracing::warn!("Manifest {} is invalid ({}), ignoring it", self.path.display(), e);
                Ok(None)
            }
        }
    }

    /// Atomically replace the manifest on disk
    pub fn save(&self, manifest: &mut Manifest) -> Result<()> {
        manifest.updated_at = Some(chrono::Utc::now());
        let json = serde_json::to_vec_pretty(manifest)?;

        let tmp_path = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::info!(
            "Manifest saved | {} items | {}",
            manifest.count(),
            selecta_core::format_bytes(manifest.total_bytes())
        );
        Ok(())
    }

    /// Remove the manifest (used before a full rebuild)
    pub fn discard(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selecta_core::Item;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_none() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path().join("m.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_returns_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("m.json");
        fs::write(&path, b"{ not json").unwrap();
        assert!(ManifestStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path().join("m.json"));
        let mut manifest = Manifest::new(1000);
        manifest.push(Item::from_disk_name("A - x.mp4", 10).with_source("/pool"));

        store.save(&mut manifest).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, manifest);
        assert!(!temp.path().join("m.json.tmp").exists());
    }

    #[test]
    fn test_save_fails_loudly_when_directory_is_gone() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path().join("missing").join("m.json"));
        assert!(store.save(&mut Manifest::new(1)).is_err());
    }

    #[test]
    fn test_discard() {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(temp.path().join("m.json"));
        store.save(&mut Manifest::new(1)).unwrap();
        store.discard().unwrap();
        assert!(store.load().unwrap().is_none());
        store.discard().unwrap();
    }
}
