use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::SizeTier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub logos: LogoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub raw_lists_path: PathBuf,
    pub logo_path: PathBuf,
    pub playlist_path: PathBuf,
    pub cache_file: PathBuf,
    pub categories_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoConfig {
    /// Fixed public base path embedded into playlist logo URLs.
    pub public_base_url: String,
    pub fetch_timeout_seconds: u64,
    pub cache_ttl_days: i64,
    pub retention_days: i64,
    pub tiers: Vec<SizeTier>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                raw_lists_path: PathBuf::from("./raw_lists"),
                logo_path: PathBuf::from("./data/logos"),
                playlist_path: PathBuf::from("./playlist.m3u"),
                cache_file: PathBuf::from("./data/logo-cache.json"),
                categories_file: PathBuf::from("./data/categories.json"),
            },
            logos: LogoConfig {
                public_base_url: "http://localhost:8080/logos".to_string(),
                fetch_timeout_seconds: 10,
                cache_ttl_days: 7,
                retention_days: 30,
                tiers: vec![
                    SizeTier {
                        name: "small".to_string(),
                        width: 64,
                        height: 64,
                        quality: 80,
                    },
                    SizeTier {
                        name: "medium".to_string(),
                        width: 128,
                        height: 128,
                        quality: 80,
                    },
                    SizeTier {
                        name: "large".to_string(),
                        width: 256,
                        height: 256,
                        quality: 80,
                    },
                ],
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::create_dir_all(&default_config.storage.raw_lists_path)?;
            std::fs::create_dir_all(&default_config.storage.logo_path)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }

    /// Reject configurations the cache lifecycle cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.logos.tiers.is_empty() {
            anyhow::bail!("at least one logo size tier must be configured");
        }
        if self.logos.retention_days < self.logos.cache_ttl_days {
            anyhow::bail!(
                "retention_days ({}) must be >= cache_ttl_days ({})",
                self.logos.retention_days,
                self.logos.cache_ttl_days
            );
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::days(self.logos.cache_ttl_days)
    }

    pub fn retention(&self) -> Duration {
        Duration::days(self.logos.retention_days)
    }

    /// Tier referenced by the playlist `tvg-logo` attribute: the tier named
    /// "medium", or the first configured tier when no such name exists.
    pub fn playlist_tier(&self) -> &SizeTier {
        self.logos
            .tiers
            .iter()
            .find(|t| t.name == "medium")
            .unwrap_or(&self.logos.tiers[0])
    }
}
