//! Analyzer configuration loaded from YAML.
//!
//! Every field has a default, so an absent or empty config file yields
//! a fully usable configuration.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

fn default_time_window_hours() -> i64 {
    24
}

fn default_max_hops() -> u32 {
    2
}

/// The logger's own node appears in both bang-prefixed and bare form
/// across the logs; exclude both spellings.
fn default_excluded_nodes() -> Vec<String> {
    vec!["!ab123456".to_string(), "ab123456".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Observation recency window in hours
    pub time_window_hours: i64,
    /// Maximum hop distance for a node row to count as active
    pub max_hops: u32,
    /// Node IDs dropped from every route record
    pub excluded_nodes: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            time_window_hours: default_time_window_hours(),
            max_hops: default_max_hops(),
            excluded_nodes: default_excluded_nodes(),
        }
    }
}

impl AnalyzerConfig {
    /// Load from a YAML file. A missing file is not an error; the
    /// defaults apply.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!(
                "Config file {} not found, using defaults",
                path.display()
            );
            return Ok(AnalyzerConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AnalyzerConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_window_hours <= 0 {
            return Err(ConfigError::Validation(format!(
                "time_window_hours must be positive, got {}",
                self.time_window_hours
            )));
        }
        Ok(())
    }

    /// Exclusion set for the route parser.
    pub fn excluded_set(&self) -> HashSet<String> {
        self.excluded_nodes.iter().cloned().collect()
    }
}
