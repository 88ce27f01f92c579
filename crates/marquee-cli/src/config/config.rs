//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use marquee_core::KindFilter;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default `X-RapidAPI-Host`.
const DEFAULT_HOST: &str = "imdb236.p.rapidapi.com";

/// Default spacing between chart requests.
const DEFAULT_MIN_INTERVAL_MS: u64 = 250;

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Remote catalog settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Favorites listing settings.
    #[serde(default)]
    pub favorites: FavoritesConfig,
}

/// Remote catalog settings. The API key is never stored here.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Overrides the chart endpoint base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// `X-RapidAPI-Host` header value.
    #[serde(default = "default_host")]
    pub host: String,
    /// Minimum spacing between requests, in milliseconds.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Per-request timeout, in seconds. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Favorites listing settings.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FavoritesConfig {
    /// Kind filter used when `--kind` is not given.
    #[serde(default)]
    pub default_filter: KindFilter,
}

fn default_host() -> String {
    String::from(DEFAULT_HOST)
}

const fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            host: default_host(),
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Parsed `base_url`, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn base_url(&self) -> Result<Option<Url>> {
        self.base_url
            .as_deref()
            .map(|raw| Url::parse(raw).with_context(|| format!("invalid api.base_url: {raw}")))
            .transpose()
    }

    /// `min_interval_ms` as a duration.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// `timeout_secs` as a duration.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Renders the config as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config to TOML")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert_eq!(config.api.host, "imdb236.p.rapidapi.com");
        assert_eq!(config.api.min_interval(), Duration::from_millis(250));
        assert_eq!(config.api.timeout(), None);
        assert_eq!(config.favorites.default_filter, KindFilter::All);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            api: ApiConfig {
                base_url: Some(String::from("http://127.0.0.1:8080/api/")),
                timeout_secs: Some(10),
                ..ApiConfig::default()
            },
            favorites: FavoritesConfig {
                default_filter: KindFilter::Series,
            },
        };

        // Act
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 5\n").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.api.host, "imdb236.p.rapidapi.com");
        assert_eq!(config.api.min_interval_ms, 250);
        assert_eq!(config.favorites, FavoritesConfig::default());
    }

    #[test]
    fn test_load_rejects_unknown_filter() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[favorites]\ndefault_filter = \"documentary\"\n").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        // Arrange
        let api = ApiConfig {
            base_url: Some(String::from("not a url")),
            ..ApiConfig::default()
        };

        // Act
        let result = api.base_url();

        // Assert
        assert!(result.is_err());
    }
}
