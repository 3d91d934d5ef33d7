//! Exclusive run lock for a selection directory

use selecta_core::{Result, SelectaError};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Lock file name inside the selection directory
pub const LOCK_FILE_NAME: &str = ".selecta.lock";

/// Held for the duration of one rotation run; removed on drop
#[derive(Debug)]
pub struct SelectionLock {
    path: PathBuf,
}

impl SelectionLock {
    /// Take the lock, failing with `AlreadyRunning` if another run holds it
    pub fn acquire(selection_path: &Path) -> Result<Self> {
        let path = selection_path.join(LOCK_FILE_NAME);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())?;
                tracing::debug!("Acquired selection lock {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(SelectaError::AlreadyRunning(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stale lock left by an aborted run; returns whether one existed
    pub fn force_release(selection_path: &Path) -> Result<bool> {
        match fs::remove_file(selection_path.join(LOCK_FILE_NAME)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for SelectionLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_fails_until_drop() {
        let temp = TempDir::new().unwrap();
        let lock = SelectionLock::acquire(temp.path()).unwrap();
        assert!(matches!(
            SelectionLock::acquire(temp.path()),
            Err(SelectaError::AlreadyRunning(_))
        ));
        drop(lock);
        assert!(!temp.path().join(LOCK_FILE_NAME).exists());
        assert!(SelectionLock::acquire(temp.path()).is_ok());
    }

    #[test]
    fn test_force_release() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(LOCK_FILE_NAME), b"123").unwrap();
        assert!(SelectionLock::force_release(temp.path()).unwrap());
        assert!(!SelectionLock::force_release(temp.path()).unwrap());
    }
}
