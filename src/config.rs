//! Configuration: TOML file loading and defaults.
//!
//! Resolution order (first found wins):
//! 1. Explicit path (CLI `--config`)
//! 2. `$FILE_INDEX_CONFIG` environment variable (path to config file)
//! 3. Project-local `.file-index.toml` in the current working directory
//! 4. Global `~/.config/file-index/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::entry::{SortBy, SortDirection, SortSpec};
use crate::error::Result;

/// Tree ordering settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Sort field: "name", "size", "modified".
    pub sort_by: Option<String>,
    /// Sort direction: "asc", "desc".
    pub direction: Option<String>,
    /// Pin the `untracked` bucket first within its group.
    pub pin_untracked: Option<bool>,
}

/// Notification settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Also report successful mutations, not just failures.
    pub verbose: Option<bool>,
}

/// Top-level configuration.
///
/// All fields are optional so partial files merge over the built-in
/// defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct IndexConfig {
    pub tree: TreeConfig,
    pub notifications: NotificationsConfig,
}

impl IndexConfig {
    /// Load configuration following the resolution order above. A missing
    /// file at every location yields the defaults; a present-but-invalid
    /// file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(env_path) = std::env::var("FILE_INDEX_CONFIG") {
            return Self::from_file(Path::new(&env_path));
        }
        let local = PathBuf::from(".file-index.toml");
        if local.is_file() {
            return Self::from_file(&local);
        }
        if let Some(global) = Self::global_path() {
            if global.is_file() {
                return Self::from_file(&global);
            }
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("file-index").join("config.toml"))
    }

    /// Effective sort order.
    pub fn sort_spec(&self) -> SortSpec {
        let by = self
            .tree
            .sort_by
            .as_deref()
            .map(SortBy::from_config)
            .unwrap_or(SortBy::Name);
        let direction = match self.tree.direction.as_deref() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        SortSpec { by, direction }
    }

    pub fn pin_untracked(&self) -> bool {
        self.tree.pin_untracked.unwrap_or(false)
    }

    pub fn verbose_notifications(&self) -> bool {
        self.notifications.verbose.unwrap_or(false)
    }
}
