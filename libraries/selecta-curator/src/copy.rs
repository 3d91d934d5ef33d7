//! Copying source files into the selection

use crate::selection::SelectionDir;
use selecta_core::{CatalogEntry, Item, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Copy a catalog entry into the selection under its canonical name
///
/// Bytes land in `<canonical>.tmp` first and are renamed into place, so an
/// aborted copy never shows up as a truncated media file. Problems opening
/// the source are skipped; failures on the selection side propagate.
///
/// # Returns
///
/// The admitted item, or `None` when the source vanished or became unreadable
/// since the scan, or a file with the canonical name is already present.
pub fn copy_into_selection(entry: &CatalogEntry, selection: &SelectionDir) -> Result<Option<Item>> {
    let source_path = entry.source_path();
    let name = entry.canonical_name();

    let mut source = match File::open(&source_path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("Source vanished, skipping: {}", source_path.display());
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!("Cannot read source {}, skipping: {}", source_path.display(), e);
            return Ok(None);
        }
    };
    if !source.metadata().map(|m| m.is_file()).unwrap_or(false) {
        tracing::warn!("Source is not a regular file, skipping: {}", source_path.display());
        return Ok(None);
    }

    let dest_path = selection.path_of(name);
    if dest_path.exists() {
        tracing::warn!("{} already exists in the selection, skipping", name);
        return Ok(None);
    }

    let tmp_path = selection.path_of(&format!("{name}.tmp"));
    let size = match write_tmp(&mut source, &tmp_path) {
        Ok(size) => size,
        Err(e) => {
            discard_partial(&tmp_path);
            return Err(e.into());
        }
    };

    if let Err(e) = fs::rename(&tmp_path, &dest_path) {
        discard_partial(&tmp_path);
        return Err(e.into());
    }

    Ok(Some(
        Item::from_descriptor(entry.descriptor.clone(), name, size)
            .with_source(entry.source_directory()),
    ))
}

fn write_tmp(source: &mut File, tmp_path: &Path) -> io::Result<u64> {
    let mut tmp = File::create(tmp_path)?;
    let size = io::copy(source, &mut tmp)?;
    tmp.sync_all()?;
    Ok(size)
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!("Could not remove partial copy {}: {}", path.display(), e);
        }
    }
}
