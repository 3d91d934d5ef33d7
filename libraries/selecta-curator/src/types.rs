//! Common types for the curator

use selecta_core::{SelectaError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default manifest file name inside the selection directory
pub const DEFAULT_MANIFEST_FILE: &str = "selected_manifest.json";

/// Configuration for a rotation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationConfig {
    /// Directory holding the curated selection and its manifest
    pub selection_path: PathBuf,

    /// Source pools scanned (read-only) for candidates
    pub source_paths: Vec<PathBuf>,

    /// Maximum total size of the selection
    pub budget_bytes: u64,

    /// Items admitted per category per round (0 = unlimited)
    pub max_per_category_per_round: usize,

    /// Opt into the category-interleaved replay order
    pub randomize_final_order: bool,

    /// Media file extensions (lower case, no dot)
    pub extensions: Vec<String>,

    /// Manifest file name inside `selection_path`
    pub manifest_file_name: String,

    /// Directory depth walked inside each source pool
    pub scan_depth: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            selection_path: PathBuf::from("selected"),
            source_paths: Vec::new(),
            budget_bytes: selecta_core::gib_to_bytes(40.0),
            max_per_category_per_round: 0,
            randomize_final_order: false,
            extensions: vec!["mp4".to_string()],
            manifest_file_name: DEFAULT_MANIFEST_FILE.to_string(),
            scan_depth: 1,
        }
    }
}

impl RotationConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.budget_bytes == 0 {
            return Err(SelectaError::invalid_config("budget must be greater than zero"));
        }
        if self.selection_path.as_os_str().is_empty() {
            return Err(SelectaError::invalid_config("selection path is required"));
        }
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(SelectaError::invalid_config(
                "at least one media extension is required",
            ));
        }
        if self.manifest_file_name.trim().is_empty() {
            return Err(SelectaError::invalid_config("manifest file name is required"));
        }
        if self.source_paths.iter().any(|p| p == &self.selection_path) {
            return Err(SelectaError::invalid_config(
                "a source pool cannot be the selection directory",
            ));
        }
        Ok(())
    }
}

/// Phase of the rotation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPhase {
    Idle,
    Reconciling,
    Reducing,
    Ingesting,
    Sequencing,
    Persisted,
}

/// Summary of a completed rotation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSummary {
    pub run_id: String,
    pub reconciled_added: usize,
    pub reconciled_removed: usize,
    pub admitted: usize,
    pub admitted_bytes: u64,
    pub evicted: usize,
    pub evicted_bytes: u64,
    pub renamed: usize,
    pub rename_failures: usize,
    pub final_bytes: u64,
    pub target_bytes: u64,
    pub item_count: usize,
    pub sequenced: bool,
    pub budget_satisfied: bool,
}

impl RotationSummary {
    pub fn summary_text(&self) -> String {
        format!(
            "Rotation complete: {} admitted, {} evicted, {} renamed ({} rename failures), {} items, {} / {}",
            self.admitted,
            self.evicted,
            self.renamed,
            self.rename_failures,
            self.item_count,
            selecta_core::format_bytes(self.final_bytes),
            selecta_core::format_bytes(self.target_bytes),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RotationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = RotationConfig {
            budget_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SelectaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_source_equal_to_selection_rejected() {
        let config = RotationConfig {
            source_paths: vec![PathBuf::from("selected")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
