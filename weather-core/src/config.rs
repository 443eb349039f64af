use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::notify::{Notification, Severity};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";

/// Timing and length thresholds for the city search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub debounce_ms: u64,
    pub blur_grace_ms: u64,
    /// Queries shorter than this (in characters) never hit the network.
    pub min_query_len: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 500, blur_grace_ms: 150, min_query_len: 3 }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// forecast_days = 3
///
/// [search]
/// debounce_ms = 500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Overrides the WeatherAPI endpoint, mostly useful for proxies.
    pub base_url: Option<String>,

    /// Number of forecast days to request (WeatherAPI allows 1..=14).
    pub forecast_days: Option<u8>,

    #[serde(default)]
    pub search: SearchSettings,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-lookup", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `WEATHERAPI_KEY` from the process environment, if set.
    pub fn with_env_overrides(self) -> Self {
        let key = std::env::var(API_KEY_ENV).ok();
        self.with_api_key_override(key)
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Returns the API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/')
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days.unwrap_or(3).clamp(1, 14)
    }

    /// Startup notice shown when lookups cannot work for lack of a key.
    pub fn credential_notice(&self) -> Option<Notification> {
        if self.api_key().is_some() {
            return None;
        }

        let notice = Notification::new(
            Severity::Error,
            "Missing API key",
            format!(
                "No WeatherAPI key configured. Run `weather configure` or set {API_KEY_ENV}; \
                 searches will fail until then."
            ),
        );
        Some(notice.persistent())
    }
}
