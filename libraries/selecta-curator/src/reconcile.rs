//! Reconciliation of the manifest with the selection directory
//!
//! Manual deletions and additions made directly on disk are absorbed here so
//! the manifest never drifts from what the playback collaborator actually sees.

use crate::selection::SelectionDir;
use selecta_core::{Item, Manifest};
use std::collections::{BTreeSet, HashSet};

/// Outcome of reconciling a manifest against a disk listing
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub manifest: Manifest,
    /// Names found on disk but not in the manifest
    pub added: Vec<String>,
    /// Names recorded in the manifest but missing on disk
    pub removed: Vec<String>,
}

impl Reconciliation {
    /// Whether any manual change was absorbed
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Reconcile `manifest` with the media names currently on disk
///
/// When nothing was added or removed the manifest is handed back untouched.
/// Otherwise removed entries are dropped, added files are parsed and inserted,
/// and every remaining size is refreshed from disk. A file that cannot be
/// stat'ed counts as zero bytes and is flagged for eviction.
pub fn reconcile(
    mut manifest: Manifest,
    disk_listing: &BTreeSet<String>,
    selection: &SelectionDir,
) -> Reconciliation {
    let recorded: HashSet<String> = manifest
        .items
        .iter()
        .map(|i| i.current_name.clone())
        .collect();

    let mut removed: Vec<String> = recorded
        .iter()
        .filter(|name| !disk_listing.contains(name.as_str()))
        .cloned()
        .collect();
    removed.sort();

    let added: Vec<String> = disk_listing
        .iter()
        .filter(|name| !recorded.contains(name.as_str()))
        .cloned()
        .collect();

    if removed.is_empty() && added.is_empty() {
        return Reconciliation {
            manifest,
            added,
            removed,
        };
    }

    if !removed.is_empty() {
        let gone: HashSet<&str> = removed.iter().map(String::as_str).collect();
        manifest.items.retain(|item| {
            let keep = !gone.contains(item.current_name.as_str());
            if !keep {
                tracing::info!("Removed from disk: {}", item.current_name);
            }
            keep
        });
    }

    for name in &added {
        tracing::info!("Found on disk: {}", name);
        manifest.push(Item::from_disk_name(name, 0));
    }

    for item in &mut manifest.items {
        match selection.size_of(&item.current_name) {
            Ok(size) => {
                item.size_bytes = size;
                item.pending_eviction = false;
            }
            Err(e) => {
                tracing::warn!(
                    "Cannot stat {} ({}), counting it as 0 bytes and flagging for eviction",
                    item.current_name,
                    e
                );
                item.size_bytes = 0;
                item.pending_eviction = true;
            }
        }
    }

    tracing::info!(
        "Reconciled manual changes: {} added, {} removed, now {} items ({})",
        added.len(),
        removed.len(),
        manifest.count(),
        selecta_core::format_bytes(manifest.total_bytes())
    );

    Reconciliation {
        manifest,
        added,
        removed,
    }
}
