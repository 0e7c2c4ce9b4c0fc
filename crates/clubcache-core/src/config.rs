//! Application configuration management.
//!
//! This module handles loading and saving the configuration: API location,
//! list cache tuning, and where session snapshots are kept.
//!
//! Configuration is stored at `~/.config/clubcache/config.json`. The bearer
//! token is never written there; it is read from `CLUBCACHE_TOKEN`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::cache::policy::{
    DEFAULT_MAX_AGE_SECS, DEFAULT_PAGE_SIZE, DEFAULT_PREFETCH_AHEAD, DEFAULT_PREFETCH_DEBOUNCE_MS,
};
use crate::cache::CachePolicy;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "clubcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable holding the bearer token supplied by the host
pub const TOKEN_ENV: &str = "CLUBCACHE_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: Option<String>,
    pub page_size: u32,
    pub max_age_secs: i64,
    pub prefetch_ahead: u32,
    pub prefetch_debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub session_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            prefetch_ahead: DEFAULT_PREFETCH_AHEAD,
            prefetch_debounce_ms: DEFAULT_PREFETCH_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for session snapshots; defaults under the user cache dir.
    pub fn session_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.session_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join("session"))
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            page_size: self.page_size.max(1),
            max_age: chrono::Duration::seconds(self.max_age_secs.max(0)),
            prefetch_ahead: self.prefetch_ahead,
            prefetch_debounce: Duration::from_millis(self.prefetch_debounce_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Bearer token from the environment; blank values count as absent.
    pub fn token() -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_policy(), CachePolicy::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "https://club.test/api", "page_size": 20}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://club.test/api"));
        assert_eq!(config.cache_policy().page_size, 20);
        assert_eq!(config.prefetch_ahead, DEFAULT_PREFETCH_AHEAD);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            prefetch_ahead: 0,
            session_dir: Some(dir.path().join("session")),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.session_dir().unwrap(), dir.path().join("session"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "page_size = 10").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_policy_clamps_values() {
        let config = Config {
            page_size: 0,
            max_age_secs: -5,
            request_timeout_secs: 0,
            ..Config::default()
        };
        let policy = config.cache_policy();
        assert_eq!(policy.page_size, 1);
        assert_eq!(policy.max_age, chrono::Duration::zero());
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
