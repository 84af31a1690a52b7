//! Job configuration.
//!
//! All deployment constants in one explicit structure: the warehouse
//! destination, the credential reference, and the upstream window. Loaded
//! from TOML; the lookback window and currency carry defaults so a minimal
//! config only names the destination.

use crate::warehouse::Destination;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Static configuration for one deployment of the snapshot job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Warehouse project / account identifier.
    pub project: String,
    /// Destination dataset name.
    pub dataset: String,
    /// Destination table name.
    pub table: String,
    /// Target region of the warehouse (e.g. "US").
    pub location: String,
    /// Credential-connection identifier handed to the warehouse client.
    pub credential_ref: String,
    /// Trailing window requested from the upstream provider, in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Quote currency requested from the upstream provider.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_lookback_days() -> u32 {
    180
}

fn default_currency() -> String {
    "usd".to_string()
}

/// Errors loading or validating a job configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl JobConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("project", &self.project),
            ("dataset", &self.dataset),
            ("table", &self.table),
            ("location", &self.location),
            ("credential_ref", &self.credential_ref),
            ("currency", &self.currency),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        if self.lookback_days == 0 {
            return Err(ConfigError::Invalid(
                "lookback_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The warehouse destination this config points at.
    pub fn destination(&self) -> Destination {
        Destination {
            project: self.project.clone(),
            dataset: self.dataset.clone(),
            table: self.table.clone(),
            location: self.location.clone(),
        }
    }
}
