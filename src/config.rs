//! Configuration for the catalog front end.
//!
//! Settings live in `<config_dir>/bookshelf/bookshelf.yml`:
//!
//! ```yaml
//! data_file: /home/me/books/media.json
//! rename_policy: reinsert   # or in-place
//! log_level: warn
//! ```
//!
//! Every key is optional. The data file is resolved in priority order:
//! 1. Explicit override (the `--file` flag)
//! 2. `data_file` from the config file
//! 3. `<data_dir>/bookshelf/media.json`
//! 4. `./media.json`

use crate::catalog::RenamePolicy;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "bookshelf";
const CONFIG_FILE: &str = "bookshelf.yml";
pub const DATA_FILE: &str = "media.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    pub rename_policy: RenamePolicy,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            rename_policy: RenamePolicy::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from an explicit path, or from [`Config::default_path`]
    ///
    /// A missing file yields the defaults; a file that does not parse is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            debug!(file = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Pick the data file: override, then config, then platform default
    pub fn resolve_data_file(&self, cli_override: Option<PathBuf>) -> PathBuf {
        if let Some(p) = cli_override {
            return p;
        }
        if let Some(p) = &self.data_file {
            return p.clone();
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR).join(DATA_FILE))
            .unwrap_or_else(|| PathBuf::from(DATA_FILE))
    }
}
