//! Item descriptor parsing
//!
//! Media names follow the `Category - Title parte N.ext` convention produced by
//! the fetch and transcode collaborators. The selection may additionally carry
//! a zero-padded ordinal prefix (`0007 - `, wider past 9999) written by the sequencer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Category used when a name carries no category segment
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Separator between category and title
const SEPARATOR: &str = " - ";

static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4,}\s*-\s*").expect("static regex"));

static PART_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)parte\s+(\d+)").expect("static regex"));

/// Metadata derived from a media file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDescriptor {
    pub category: String,
    pub title: String,
    pub part_number: u32,
    /// Name without ordinal prefix; identity key for dedup
    pub canonical_name: String,
}

/// Parse a raw file name (with or without ordinal prefix) into a descriptor
pub fn parse_descriptor(file_name: &str) -> ItemDescriptor {
    let name = strip_ordinal_prefix(file_name);
    let (stem, extension) = split_extension(name);

    let mut segments = stem.split(SEPARATOR);
    let category = segments
        .next()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_CATEGORY)
        .to_string();
    let rest = segments.collect::<Vec<_>>().join(SEPARATOR);

    let (title, part) = match PART_MARKER.captures(&rest) {
        Some(caps) => {
            let marker = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let part = caps
                .get(1)
                .and_then(|n| n.as_str().parse::<u32>().ok())
                .unwrap_or(1)
                .max(1);
            let mut title = String::with_capacity(rest.len());
            title.push_str(&rest[..marker.start]);
            title.push_str(&rest[marker.end..]);
            (title.trim().to_string(), Some(part))
        }
        None => (rest.trim().to_string(), None),
    };

    let canonical_name = canonical_name(&category, &title, part, extension.as_deref());

    ItemDescriptor {
        category,
        title,
        part_number: part.unwrap_or(1),
        canonical_name,
    }
}

/// Build the canonical name for a category/title/part triple
///
/// The ` parte N` suffix is only written when the source name carried one.
pub fn canonical_name(category: &str, title: &str, part: Option<u32>, extension: Option<&str>) -> String {
    let mut name = if title.is_empty() {
        category.to_string()
    } else {
        format!("{category}{SEPARATOR}{title}")
    };
    if let Some(part) = part {
        name.push_str(&format!(" parte {part}"));
    }
    if let Some(ext) = extension {
        name.push('.');
        name.push_str(ext);
    }
    name
}

/// Remove a leading `NNNN - ` ordinal prefix, if present
pub fn strip_ordinal_prefix(name: &str) -> &str {
    match ORDINAL_PREFIX.find(name) {
        Some(m) => &name[m.end()..],
        None => name,
    }
}

/// Display name for an item at `ordinal` (1-based) in the replay order
pub fn format_ordinal_name(ordinal: usize, canonical_name: &str) -> String {
    format!("{ordinal:04}{SEPARATOR}{canonical_name}")
}

/// Split off a short alphanumeric extension, lower-cased
fn split_extension(name: &str) -> (&str, Option<String>) {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (stem, Some(ext.to_ascii_lowercase()))
        }
        _ => (name, None),
    }
}
