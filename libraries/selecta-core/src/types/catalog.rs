/// Source catalog entries produced by scanning source pools
use crate::descriptor::ItemDescriptor;
use std::path::{Path, PathBuf};

/// A candidate found in a source pool, not yet admitted
///
/// Recomputed on every ingestion run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub descriptor: ItemDescriptor,
    /// Name of the file inside `source_directory`
    pub file_name: String,
    pub source_directory: PathBuf,
}

impl CatalogEntry {
    pub fn new(descriptor: ItemDescriptor, file_name: impl Into<String>, source_directory: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            file_name: file_name.into(),
            source_directory: source_directory.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.descriptor.category
    }

    pub fn part_number(&self) -> u32 {
        self.descriptor.part_number
    }

    pub fn canonical_name(&self) -> &str {
        &self.descriptor.canonical_name
    }

    /// Absolute path of the source file
    pub fn source_path(&self) -> PathBuf {
        self.source_directory.join(&self.file_name)
    }

    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }
}
