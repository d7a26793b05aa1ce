//! Configuration types.

use serde::{Deserialize, Serialize};

/// Top-level grove configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroveConfig {
    /// Fetch settings.
    pub fetch: FetchConfig,
    /// Listing settings.
    pub list: ListConfig,
    /// Hook settings.
    pub hooks: HooksConfig,
}

/// Fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Remote used when tracking branches and as the fallback fetch target.
    pub default_remote: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_remote: "origin".to_string(),
        }
    }
}

/// Listing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Skip sync-status computation by default.
    pub fast: bool,
}

/// Hook configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Commands (argv vectors, run without a shell) executed in a new
    /// worktree after `grove add`.
    pub post_create: Vec<Vec<String>>,
}
