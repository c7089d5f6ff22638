use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub anilist: SourceConfig,

    pub jikan: SourceConfig,

    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            anilist: SourceConfig::anilist_defaults(),
            jikan: SourceConfig::jikan_defaults(),
            cache: CacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// 0 lets tokio pick the worker count.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 0,
        }
    }
}

/// Endpoint and pacing for one upstream source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,

    /// Upper bound on request rate; the queue waits `60s / rate_per_minute`
    /// between requests.
    pub rate_per_minute: u32,

    /// Pause after a 429 before the stalled request is retried.
    pub retry_cooldown_secs: u64,
}

impl SourceConfig {
    /// AniList allows 90 requests per minute and asks for a long back-off.
    #[must_use]
    pub fn anilist_defaults() -> Self {
        Self {
            base_url: "https://graphql.anilist.co".to_string(),
            rate_per_minute: 90,
            retry_cooldown_secs: 60,
        }
    }

    /// Jikan allows ~4 requests per second with a short back-off.
    #[must_use]
    pub fn jikan_defaults() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            rate_per_minute: 240,
            retry_cooldown_secs: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,

    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            max_entries: 256,
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.anilist.rate_per_minute > 0,
            "anilist.rate_per_minute must be positive"
        );
        anyhow::ensure!(
            self.jikan.rate_per_minute > 0,
            "jikan.rate_per_minute must be positive"
        );
        anyhow::ensure!(self.cache.max_entries > 0, "cache.max_entries must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.anilist.rate_per_minute, 90);
        assert_eq!(config.jikan.retry_cooldown_secs, 1);
        assert_eq!(config.cache.ttl_secs, 1800);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.jikan.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.cache.max_entries, 256);
    }
}
