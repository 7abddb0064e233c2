//! Saved client state.
//!
//! One small JSON file holds the instance URL and session cookie so commands
//! can resume a login. Lives at `~/.ctfgrab.json` unless `CTFGRAB_CONFIG`
//! points elsewhere.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment override for the state file location.
pub const CONFIG_ENV: &str = "CTFGRAB_CONFIG";

const CONFIG_FILE: &str = ".ctfgrab.json";

/// Persisted client state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedData {
    /// Instance URL of the last login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Session cookie header value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

/// Where the state file lives.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE)
}

impl SavedData {
    /// Load saved state; a missing file is just empty state.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(SavedData::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string(self)?;
        fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))
    }
}
