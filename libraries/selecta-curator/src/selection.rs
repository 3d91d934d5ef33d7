//! Selection directory access
//!
//! Every file operation the engine performs on the selection goes through
//! `SelectionDir`, so "what is on disk" has a single definition.

use crate::lock::LOCK_FILE_NAME;
use selecta_core::{Result, SelectaError};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The curated selection directory
#[derive(Debug, Clone)]
pub struct SelectionDir {
    base_path: PathBuf,
    extensions: Vec<String>,
    manifest_file_name: String,
}

impl SelectionDir {
    pub fn new(
        base_path: impl Into<PathBuf>,
        extensions: &[String],
        manifest_file_name: impl Into<String>,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            extensions: normalize_extensions(extensions),
            manifest_file_name: manifest_file_name.into(),
        }
    }

    /// Create the directory if it does not exist yet
    pub fn initialize(&self) -> Result<()> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path).map_err(|e| {
                SelectaError::SelectionMissing(format!("{}: {}", self.base_path.display(), e))
            })?;
        }
        if !self.base_path.is_dir() {
            return Err(SelectaError::SelectionMissing(format!(
                "{} is not a directory",
                self.base_path.display()
            )));
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.base_path.join(&self.manifest_file_name)
    }

    /// Full path of a file in the selection
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// Whether `name` is a media file by extension
    pub fn is_media_name(&self, name: &str) -> bool {
        is_media_name(name, &self.extensions)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Media file names currently in the directory (non-recursive)
    ///
    /// The manifest, its temp file and the run lock are never listed.
    pub fn list_media(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!("Skipping non UTF-8 file name: {:?}", entry.file_name());
                continue;
            };
            if name == self.manifest_file_name || name == LOCK_FILE_NAME || name.ends_with(".tmp") {
                continue;
            }
            if self.is_media_name(&name) {
                names.insert(name);
            }
        }
        Ok(names)
    }

    /// Size of a file in the selection
    pub fn size_of(&self, name: &str) -> io::Result<u64> {
        fs::metadata(self.path_of(name)).map(|m| m.len())
    }

    /// Delete a file; returns `false` if it was already gone
    pub fn remove(&self, name: &str) -> io::Result<bool> {
        match fs::remove_file(self.path_of(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Rename a file inside the selection without clobbering another file
    pub fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        if from == to {
            return Ok(());
        }
        let target = self.path_of(to);
        if target.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            ));
        }
        fs::rename(self.path_of(from), target)
    }
}

/// Check if a file name carries one of the media extensions
pub fn is_media_name(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

/// Lower-case, strip leading dots, drop empties
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
