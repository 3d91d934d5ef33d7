/// Items held in the selection
use crate::descriptor::{parse_descriptor, ItemDescriptor};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One media unit in the selection
///
/// `canonical_name` is identity and never changes after admission;
/// `current_name` is the on-disk display name and only the sequencer changes it.
/// Field aliases accept manifests written by the legacy script tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(alias = "canal")]
    pub category: String,

    #[serde(default, alias = "titulo")]
    pub title: String,

    #[serde(default = "default_part", alias = "parte")]
    pub part_number: u32,

    #[serde(alias = "file")]
    pub canonical_name: String,

    #[serde(alias = "finalName")]
    pub current_name: String,

    #[serde(default, alias = "size")]
    pub size_bytes: u64,

    /// Pool the item was copied from; absent for items absorbed from disk
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "folder")]
    pub source_directory: Option<PathBuf>,

    /// Set when the file could not be stat'ed during reconciliation
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending_eviction: bool,
}

fn default_part() -> u32 {
    1
}

impl Item {
    /// Build an item from a parsed descriptor and the name it has on disk
    pub fn from_descriptor(descriptor: ItemDescriptor, current_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            category: descriptor.category,
            title: descriptor.title,
            part_number: descriptor.part_number,
            canonical_name: descriptor.canonical_name,
            current_name: current_name.into(),
            size_bytes,
            source_directory: None,
            pending_eviction: false,
        }
    }

    /// Build an item from an on-disk name found in the selection directory
    pub fn from_disk_name(current_name: &str, size_bytes: u64) -> Self {
        Self::from_descriptor(parse_descriptor(current_name), current_name, size_bytes)
    }

    /// Attach the originating source pool
    pub fn with_source(mut self, source_directory: impl Into<PathBuf>) -> Self {
        self.source_directory = Some(source_directory.into());
        self
    }
}
