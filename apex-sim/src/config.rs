use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Frame loop tuning.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SessionConfig {
    /// Catalog index selected at startup.
    #[serde(default)]
    pub initial_car: usize,
    /// Upper bound for a single frame's `dt`. `None` integrates whatever the
    /// clock reports, including long stalls.
    #[serde(default)]
    pub max_frame_dt: Option<f32>,
    /// Start with the garage overlay open.
    #[serde(default)]
    pub start_in_garage: bool,
}

/// Contents of `drive.toml`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DriveConfig {
    /// Catalog file; the bundled garage is used when absent.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub session: SessionConfig,
}

impl DriveConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::builtin()),
        }
    }
}
