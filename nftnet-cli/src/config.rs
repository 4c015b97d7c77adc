//! NFTNET configuration loading from `.nftnetrc.toml`.
//!
//! Configuration is optional. Without a config file NFTNET talks to the
//! default catalog and holder endpoints with the default pacing.
//!
//! # Example Configuration
//!
//! ```toml
//! [catalog]
//! base_url = "https://api-mainnet.magiceden.dev/v3/rtp/monad-testnet"
//! page_size = 20
//! chain = "monad-testnet"
//!
//! [holders]
//! base_url = "https://monad-testnet.g.alchemy.com/nft/v3/<key>"
//!
//! [fetch]
//! inter_request_delay_ms = 1500
//! rate_limit_cooldown_secs = 60
//! request_timeout_secs = 30
//!
//! [output]
//! format = "table"
//! color = true
//! ```
//!
//! `NFTNET_CATALOG_URL` and `NFTNET_HOLDERS_URL` override the base URLs.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use nftnet_sources::{FetchPolicy, SourceConfig};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".nftnetrc.toml";

/// Environment variable overriding `[catalog].base_url`.
pub const CATALOG_URL_ENV: &str = "NFTNET_CATALOG_URL";

/// Environment variable overriding `[holders].base_url`.
pub const HOLDERS_URL_ENV: &str = "NFTNET_HOLDERS_URL";

/// Errors surfaced by strict config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration structure loaded from `.nftnetrc.toml`.
///
/// All sections are optional and fall back to defaults.
#[derive(Debug, Deserialize, Default)]
pub struct NftnetConfig {
    /// Collection catalog source.
    #[serde(default)]
    pub catalog: CatalogSection,

    /// Holder listing source.
    #[serde(default)]
    pub holders: HoldersSection,

    /// Request pacing.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Default)]
pub struct CatalogSection {
    #[serde(default)]
    pub base_url: Option<String>,

    /// Records requested per page (the API caps this at 20).
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Chain slug used in marketplace links.
    #[serde(default)]
    pub chain: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HoldersSection {
    /// Holder API root, including the API key path segment.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Request pacing. Every field is optional.
#[derive(Debug, Deserialize, Default)]
pub struct FetchSection {
    #[serde(default)]
    pub inter_request_delay_ms: Option<u64>,

    #[serde(default)]
    pub rate_limit_cooldown_secs: Option<u64>,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Output formatting preferences.
///
/// Command-line flags (e.g., `--format json`) override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table` or `json`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output. Auto-detected when unset.
    #[serde(default)]
    pub color: Option<bool>,
}

impl NftnetConfig {
    /// Load configuration from `.nftnetrc.toml` in the given directory.
    ///
    /// Missing or unreadable files fall back to defaults; problems are
    /// logged as warnings.
    pub fn load(root: &Path) -> Self {
        match Self::try_load(root) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load configuration, failing on any problem with an existing file.
    ///
    /// A missing file is not an error.
    pub fn try_load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self =
            toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.page_size == Some(0) {
            return Err(ConfigError::Invalid(
                "catalog.page_size must be at least 1".to_string(),
            ));
        }
        if self.fetch.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "fetch.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Configured color preference, or `None` to auto-detect.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }

    /// Source settings with the process environment applied.
    pub fn source_config(&self) -> SourceConfig {
        self.source_config_with_env(|key| std::env::var(key).ok())
    }

    /// Source settings with overrides read through `env`.
    pub fn source_config_with_env<F>(&self, env: F) -> SourceConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SourceConfig::default();

        if let Some(url) = &self.catalog.base_url {
            config.catalog_url = url.clone();
        }
        if let Some(url) = &self.holders.base_url {
            config.holders_url = url.clone();
        }
        if let Some(url) = env(CATALOG_URL_ENV).filter(|u| !u.is_empty()) {
            config.catalog_url = url;
        }
        if let Some(url) = env(HOLDERS_URL_ENV).filter(|u| !u.is_empty()) {
            config.holders_url = url;
        }

        if let Some(page_size) = self.catalog.page_size {
            config.page_size = page_size;
        }
        if let Some(chain) = &self.catalog.chain {
            config.chain = chain.clone();
        }

        config.policy = FetchPolicy {
            inter_request_delay: self
                .fetch
                .inter_request_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(config.policy.inter_request_delay),
            rate_limit_cooldown: self
                .fetch
                .rate_limit_cooldown_secs
                .map(Duration::from_secs)
                .unwrap_or(config.policy.rate_limit_cooldown),
        };
        if let Some(secs) = self.fetch.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }

        config
    }
}
