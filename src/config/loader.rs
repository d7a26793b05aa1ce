//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::types::GroveConfig;

/// File name of the per-workspace configuration.
const WORKSPACE_CONFIG: &str = ".grove.toml";

/// Configuration loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader for a workspace: the workspace-local file wins over
    /// the user config directory.
    #[must_use]
    pub fn for_workspace(root: &Path) -> Self {
        let mut search_paths = vec![root.join(WORKSPACE_CONFIG)];
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("grove").join("config.toml"));
        }
        Self { search_paths }
    }

    /// Create a loader with a specific config file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Load configuration from the first available file, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<GroveConfig, ConfigError> {
        for path in &self.search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config file");
                return Self::load_from_path(path);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(GroveConfig::default())
    }

    fn load_from_path(path: &Path) -> Result<GroveConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The search paths, for diagnostics.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
