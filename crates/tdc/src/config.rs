//! Configuration for the deletion coordinator.
//!
//! One configuration knob: a process-wide boolean for whether topic
//! deletion is enabled at all, loaded from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io { path: String, source: String },

    #[error("TOML error in {path}: {source}")]
    Toml { path: String, source: String },
}

/// Deletion-coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionConfig {
    /// When `false`, every coordinator operation is a no-op except
    /// `init`, which purges stale intent markers instead.
    pub enabled: bool,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl DeletionConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.display().to_string(),
            source: e.to_string(),
        })
    }
}
