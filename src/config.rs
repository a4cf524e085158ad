//! User settings
//!
//! Read from `--config <PATH>`, else `$STACKY_CONFIG`, else
//! `<config dir>/stacky/config.json`. A missing file means defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV_VAR: &str = "STACKY_CONFIG";
const CONFIG_FILENAME: &str = "config.json";
const MAX_THUMBNAIL_SIZE: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Reserved name of the cache file inside the target directory
    pub cache_file_name: String,
    /// Prefix of the synthetic "open this folder" entry
    pub open_label: String,
    /// Disabled menu row shown after a rebuild
    pub rebuilt_notice: String,
    /// Suffix hidden from menu labels
    pub strip_suffix: String,
    /// Edge length of rendered thumbnails, in pixels
    pub thumbnail_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_file_name: ".stacky.cache".to_string(),
            open_label: "Open:  ".to_string(),
            rebuilt_notice: "Stack cache rebuilt!".to_string(),
            strip_suffix: ".lnk".to_string(),
            thumbnail_size: 16,
        }
    }
}

impl Settings {
    /// Load settings, honoring an explicit path first
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        match path {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validated()
    }

    fn validated(mut self) -> Result<Self> {
        if self.cache_file_name.is_empty() {
            bail!("cache_file_name must not be empty");
        }
        if self.cache_file_name.contains(['/', '\\', '\0']) {
            bail!("cache_file_name must be a plain file name: {}", self.cache_file_name);
        }
        self.thumbnail_size = self.thumbnail_size.clamp(1, MAX_THUMBNAIL_SIZE);
        Ok(self)
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR)
        && !path.is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("stacky").join(CONFIG_FILENAME))
}
