mod lookback;

pub use lookback::{parse_duration, Lookback, LookbackUnit};

use crate::error::{Result, TailError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables echoed at startup for diagnostics
pub const DIAGNOSTIC_ENV_VARS: [&str; 2] = ["AWS_ACCESS_KEY_ID", "AWS_DEFAULT_REGION"];

/// Resolved settings for a tail session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailConfig {
    /// Log group to search
    #[serde(default = "default_log_group")]
    pub log_group: String,

    /// Substring a stream name must contain
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Lookback window, e.g. "30m" or "1h"
    #[serde(default = "default_since")]
    pub since: String,

    /// Region override; the SDK default chain is used when unset
    #[serde(default)]
    pub region: Option<String>,
}

// Default value functions for serde
fn default_log_group() -> String {
    "/aws/eks/eks-tibco-test-cluster".to_string()
}

fn default_filter() -> String {
    "utility".to_string()
}

fn default_since() -> String {
    "5m".to_string()
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            log_group: default_log_group(),
            filter: default_filter(),
            since: default_since(),
            region: None,
        }
    }
}

impl TailConfig {
    /// Load a configuration file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<TailConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TailError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let mut config: TailConfig = match extension {
            "toml" => toml::from_str(&contents)
                .map_err(|e| TailError::InvalidConfig(format!("Failed to parse TOML: {}", e)))?,
            "json" => serde_json::from_str(&contents)
                .map_err(|e| TailError::InvalidConfig(format!("Failed to parse JSON: {}", e)))?,
            _ => {
                return Err(TailError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        config.log_group = expand_env_in_string(&config.log_group);
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.log_group.trim().is_empty() {
            return Err(TailError::ConfigError(
                "log_group must not be empty".to_string(),
            ));
        }

        self.lookback()?;

        Ok(())
    }

    /// Parsed lookback window
    pub fn lookback(&self) -> Result<Lookback> {
        Lookback::parse(&self.since)
    }
}

/// Expand `$VAR` and `${VAR}` references in a string
fn expand_env_in_string(s: &str) -> String {
    let mut result = s.to_string();

    for (key, value) in std::env::vars() {
        result = result.replace(&format!("${{{}}}", key), &value);
        result = result.replace(&format!("${}", key), &value);
    }

    result
}

/// Log the credential and region variables the SDK will pick up
pub fn log_environment() {
    for name in DIAGNOSTIC_ENV_VARS {
        let value = std::env::var(name).unwrap_or_else(|_| "<unset>".to_string());
        tracing::info!(variable = name, value = %value, "environment");
    }
}
