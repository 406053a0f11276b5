// Configuration file loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::filter::{SortMode, StatusFilter};
use crate::prefs::Theme;

const APP_NAME: &str = "tasklist";

/// User configuration, read from `tasklist.yml`
///
/// Every field is optional; an absent file is the same as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the `.tasklist` store
    pub store_path: Option<PathBuf>,
    /// Overrides terminal color-scheme detection for the default theme
    pub color_scheme: Option<Theme>,
    pub default_filter: StatusFilter,
    pub default_sort: SortMode,
    /// One of trace, debug, info, warn, error
    pub log_level: Option<String>,
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Store directory: explicit override, then config, then the user data dir
    pub fn resolve_store_path(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.store_path.clone())
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_NAME)))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// `<config_dir>/tasklist/tasklist.yml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join(format!("{}.yml", APP_NAME)))
}
