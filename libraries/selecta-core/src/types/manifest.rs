/// The durable record of the selection
use super::item::Item;
use crate::units::bytes_to_gib;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};

/// Items grouped by category, in deterministic (sorted) category order
pub type CategoryGroups = BTreeMap<String, Vec<Item>>;

/// Ordered collection of items plus the byte budget they were curated for
///
/// `totalBytes` and `count` are always derived from `items`; they are written
/// to disk for the playback collaborator and ignored when reading.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub target_bytes: u64,

    #[serde(default, alias = "videos")]
    pub items: Vec<Item>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Manifest {
    /// Create an empty manifest for a budget
    pub fn new(target_bytes: u64) -> Self {
        Self {
            target_bytes,
            items: Vec::new(),
            updated_at: None,
        }
    }

    /// Sum of all item sizes
    pub fn total_bytes(&self) -> u64 {
        self.items.iter().map(|i| i.size_bytes).sum()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identity keys currently recorded
    pub fn canonical_names(&self) -> HashSet<&str> {
        self.items.iter().map(|i| i.canonical_name.as_str()).collect()
    }

    pub fn contains_canonical(&self, canonical_name: &str) -> bool {
        self.items.iter().any(|i| i.canonical_name == canonical_name)
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Remove the item recorded under `current_name`
    pub fn remove_by_current_name(&mut self, current_name: &str) -> Option<Item> {
        let index = self.items.iter().position(|i| i.current_name == current_name)?;
        Some(self.items.remove(index))
    }

    /// Number of items per category
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.category.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Move the items out into per-category groups, preserving manifest order
    /// within each group
    pub fn take_category_groups(&mut self) -> CategoryGroups {
        let mut groups = CategoryGroups::new();
        for item in self.items.drain(..) {
            groups.entry(item.category.clone()).or_default().push(item);
        }
        groups
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestDocument<'a> {
    target_bytes: u64,
    final_bytes: u64,
    #[serde(rename = "finalGB")]
    final_gb: String,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<&'a DateTime<Utc>>,
    items: &'a [Item],
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let total = self.total_bytes();
        ManifestDocument {
            target_bytes: self.target_bytes,
            final_bytes: total,
            final_gb: format!("{:.2}", bytes_to_gib(total)),
            count: self.items.len(),
            updated_at: self.updated_at.as_ref(),
            items: &self.items,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, size: u64) -> Item {
        Item::from_disk_name(name, size)
    }

    #[test]
    fn test_derived_totals() {
        let mut manifest = Manifest::new(100);
        manifest.push(item("A - x.mp4", 10));
        manifest.push(item("B - y.mp4", 32));
        assert_eq!(manifest.total_bytes(), 42);
        assert_eq!(manifest.count(), 2);
    }

    #[test]
    fn test_serialized_document_carries_derived_fields() {
        let mut manifest = Manifest::new(1 << 30);
        manifest.push(item("A - x.mp4", 1 << 29));
        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["targetBytes"], 1u64 << 30);
        assert_eq!(value["finalBytes"], 1u64 << 29);
        assert_eq!(value["finalGB"], "0.50");
        assert_eq!(value["count"], 1);
        assert_eq!(value["items"][0]["canonicalName"], "A - x.mp4");
    }

    #[test]
    fn test_round_trip_ignores_derived_fields() {
        let mut manifest = Manifest::new(500);
        manifest.push(item("0001 - A - x parte 2.mp4", 7));
        let json = serde_json::to_string(&manifest).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn test_legacy_videos_key() {
        let json = r#"{ "targetGB": 40, "finalGB": "0.00", "count": 1,
            "videos": [{ "canal": "A", "file": "A - x.mp4", "parte": 1, "size": 3, "finalName": "A - x.mp4" }] }"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.count(), 1);
        assert_eq!(manifest.target_bytes, 0);
        assert_eq!(manifest.total_bytes(), 3);
    }

    #[test]
    fn test_take_category_groups_keeps_order() {
        let mut manifest = Manifest::new(0);
        manifest.push(item("B - 1.mp4", 1));
        manifest.push(item("A - 1.mp4", 1));
        manifest.push(item("B - 2.mp4", 1));
        let groups = manifest.take_category_groups();
        assert!(manifest.is_empty());
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(groups["B"][0].canonical_name, "B - 1.mp4");
        assert_eq!(groups["B"][1].canonical_name, "B - 2.mp4");
    }

    #[test]
    fn test_remove_by_current_name() {
        let mut manifest = Manifest::new(0);
        manifest.push(item("0001 - A - 1.mp4", 1));
        assert!(manifest.remove_by_current_name("A - 1.mp4").is_none());
        assert!(manifest.remove_by_current_name("0001 - A - 1.mp4").is_some());
        assert!(manifest.is_empty());
    }
}
