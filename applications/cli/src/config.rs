/// CLI configuration
use crate::error::{CliError, Result};
use selecta_core::gib_to_bytes;
use selecta_curator::{RotationConfig, DEFAULT_MANIFEST_FILE};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Config files tried, in order, when none is given on the command line
pub const DEFAULT_CONFIG_FILES: &[&str] = &["selecta.toml", "config.json"];

/// Settings read from the config file and `SELECTA_*` environment variables
///
/// The aliases accept the legacy `config.json` keys; `config` may hand them
/// over lower-cased.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default, alias = "selectedPath", alias = "selectedpath")]
    pub selection_path: PathBuf,

    #[serde(
        default,
        alias = "downloadsPath",
        alias = "downloadspath",
        deserialize_with = "one_or_many"
    )]
    pub source_paths: Vec<PathBuf>,

    #[serde(default = "default_target_gb", alias = "targetGB", alias = "targetgb")]
    pub target_gb: f64,

    /// Exact budget; overrides `target_gb` when set
    #[serde(default)]
    pub budget_bytes: Option<u64>,

    #[serde(
        default,
        alias = "maxVideosPerChannelPerRound",
        alias = "maxvideosperchannelperround"
    )]
    pub max_per_category_per_round: usize,

    #[serde(
        default,
        alias = "generateRandomNames",
        alias = "generaterandomnames"
    )]
    pub randomize_final_order: bool,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_manifest_file_name")]
    pub manifest_file_name: String,

    #[serde(default = "default_scan_depth")]
    pub scan_depth: usize,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise the first default file found in
    /// the working directory is used, if any.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                if let Some(found) = DEFAULT_CONFIG_FILES
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists())
                {
                    tracing::debug!("Using config file {}", found.display());
                    settings = settings.add_source(config::File::from(found));
                }
            }
        }

        // Override with environment variables (prefixed with SELECTA_)
        settings = settings.add_source(
            config::Environment::with_prefix("SELECTA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("source_paths")
                .with_list_parse_key("extensions"),
        );

        let config = settings.build()?.try_deserialize::<Self>()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.selection_path.as_os_str().is_empty() {
            return Err(CliError::Config(
                "selection_path is required (set SELECTA_SELECTION_PATH)".to_string(),
            ));
        }

        match self.budget_bytes {
            Some(0) => {
                return Err(CliError::Config(
                    "budget_bytes must be greater than zero".to_string(),
                ))
            }
            Some(_) => {}
            None if !(self.target_gb.is_finite() && self.target_gb > 0.0) => {
                return Err(CliError::Config(format!(
                    "target_gb must be a positive number, got {}",
                    self.target_gb
                )));
            }
            None => {}
        }

        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(CliError::Config(
                "at least one media extension is required".to_string(),
            ));
        }

        Ok(())
    }

    pub fn budget(&self) -> u64 {
        self.budget_bytes
            .unwrap_or_else(|| gib_to_bytes(self.target_gb))
    }

    pub fn to_rotation_config(&self) -> RotationConfig {
        RotationConfig {
            selection_path: self.selection_path.clone(),
            source_paths: self.source_paths.clone(),
            budget_bytes: self.budget(),
            max_per_category_per_round: self.max_per_category_per_round,
            randomize_final_order: self.randomize_final_order,
            extensions: self.extensions.clone(),
            manifest_file_name: self.manifest_file_name.clone(),
            scan_depth: self.scan_depth,
        }
    }
}

/// Accept a single path where a list is expected
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}

// Default values
fn default_target_gb() -> f64 {
    40.0
}

fn default_extensions() -> Vec<String> {
    vec!["mp4".to_string()]
}

fn default_manifest_file_name() -> String {
    DEFAULT_MANIFEST_FILE.to_string()
}

fn default_scan_depth() -> usize {
    1
}
