//! Source pool scanning

use crate::selection::{is_media_name, normalize_extensions};
use selecta_core::{parse_descriptor, CatalogEntry};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scanner for candidate media files in source pools
#[derive(Debug, Clone)]
pub struct SourceScanner {
    /// Media extensions (lower case)
    extensions: Vec<String>,

    /// Whether to follow symbolic links
    follow_links: bool,

    /// Maximum depth to traverse; 1 = only the pool itself
    max_depth: usize,
}

impl SourceScanner {
    /// Create a new scanner for the given extensions
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: normalize_extensions(extensions),
            follow_links: false,
            max_depth: 1,
        }
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Media files in one pool, as (directory, file name) pairs
    ///
    /// A pool that does not exist is logged and yields nothing.
    pub fn scan_pool(&self, pool: &Path) -> Vec<(PathBuf, String)> {
        if !pool.is_dir() {
            tracing::warn!("Source pool not found, skipping: {}", pool.display());
            return Vec::new();
        }

        let walker = WalkDir::new(pool)
            .min_depth(1)
            .max_depth(self.max_depth)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        let mut found = Vec::new();
        for entry in walker.into_iter().filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Error walking {}: {}", pool.display(), err);
                None
            }
        }) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if name.ends_with(".tmp") || !is_media_name(name, &self.extensions) {
                continue;
            }
            let dir = entry
                .path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| pool.to_path_buf());
            found.push((dir, name.to_string()));
        }
        found
    }

    /// Build the source catalog for all pools
    ///
    /// Candidates whose canonical name is in `known` (already admitted, or
    /// evicted earlier in the same run) are skipped. When the same canonical
    /// name appears in several pools the first one wins.
    pub fn catalog(&self, pools: &[PathBuf], known: &HashSet<String>) -> Vec<CatalogEntry> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut catalog = Vec::new();
        let mut skipped_known = 0usize;

        for pool in pools {
            let files = self.scan_pool(pool);
            tracing::debug!("Found {} media files in {}", files.len(), pool.display());

            for (dir, name) in files {
                let descriptor = parse_descriptor(&name);
                if known.contains(&descriptor.canonical_name) {
                    skipped_known += 1;
                    continue;
                }
                if !seen.insert(descriptor.canonical_name.clone()) {
                    tracing::debug!(
                        "Duplicate candidate {} in {}, keeping the first",
                        descriptor.canonical_name,
                        dir.display()
                    );
                    continue;
                }
                catalog.push(CatalogEntry::new(descriptor, name, dir));
            }
        }

        tracing::info!(
            "Source catalog: {} new candidates ({} already selected)",
            catalog.len(),
            skipped_known
        );
        catalog
    }
}
