use crate::storage::LocalStorage;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_EVENTS_CACHE_KEY: &str = "nsh-events";
pub const DEFAULT_FLYER_CACHE_KEY: &str = "nsh-flyers";

/// Contents of `config.toml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spreadsheet endpoint. Empty means offline: the local cache is the only store.
    pub endpoint_url: String,
    pub events_cache_key: String,
    pub flyer_cache_key: String,
    pub allow_insecure_certs: bool,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            events_cache_key: DEFAULT_EVENTS_CACHE_KEY.to_string(),
            flyer_cache_key: DEFAULT_FLYER_CACHE_KEY.to_string(),
            allow_insecure_certs: false,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "marquee", "marquee")
            .map(|proj| proj.config_dir().join("config.toml"))
    }

    /// Missing file means defaults; a file that does not parse is an error.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config at {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(LocalStorage::default_data_dir)
            .context("No data directory on this platform")
    }

    pub fn is_offline(&self) -> bool {
        self.endpoint_url.trim().is_empty()
    }
}
