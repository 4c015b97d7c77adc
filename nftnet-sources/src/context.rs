//! Pipeline context.
//!
//! Owns the catalog loader and holder resolver, and with them both caches.
//! The caller creates a context, passes it to every pipeline call, and
//! decides when to reset or drop it.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogLoader, DEFAULT_CHAIN, DEFAULT_PAGE_SIZE};
use crate::error::SourceResult;
use crate::fetcher::{FetchPolicy, PaginatedFetcher};
use crate::holders::HolderResolver;
use crate::source::{HttpSource, PageSource};

/// Default collection-listing API root.
pub const DEFAULT_CATALOG_URL: &str = "https://api-mainnet.magiceden.dev/v3/rtp/monad-testnet";

/// Default holder-listing API root.
pub const DEFAULT_HOLDERS_URL: &str = "https://monad-testnet.g.alchemy.com/nft/v3/demo";

/// Default per-call timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the external sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub catalog_url: String,
    pub holders_url: String,
    pub chain: String,
    pub page_size: usize,
    pub policy: FetchPolicy,
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            holders_url: DEFAULT_HOLDERS_URL.to_string(),
            chain: DEFAULT_CHAIN.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            policy: FetchPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Explicit state shared by the pipeline stages.
pub struct NetworkContext {
    pub catalog: CatalogLoader,
    pub holders: HolderResolver,
}

impl NetworkContext {
    /// Build a context from arbitrary sources.
    pub fn new(
        catalog_source: Arc<dyn PageSource>,
        holder_source: Arc<dyn PageSource>,
        policy: FetchPolicy,
    ) -> Self {
        let fetcher = PaginatedFetcher::new(policy);
        Self {
            catalog: CatalogLoader::new(catalog_source, fetcher),
            holders: HolderResolver::new(holder_source, fetcher),
        }
    }

    /// Build a context talking to the configured HTTP APIs.
    pub fn from_config(config: &SourceConfig) -> SourceResult<Self> {
        let catalog_source = HttpSource::new("catalog", &config.catalog_url, config.request_timeout)?;
        let holder_source = HttpSource::new("holders", &config.holders_url, config.request_timeout)?;

        let fetcher = PaginatedFetcher::new(config.policy);
        Ok(Self {
            catalog: CatalogLoader::new(Arc::new(catalog_source), fetcher)
                .with_page_size(config.page_size)
                .with_chain(config.chain.clone()),
            holders: HolderResolver::new(Arc::new(holder_source), fetcher),
        })
    }

    /// Drop both caches.
    pub fn reset(&mut self) {
        self.catalog.invalidate();
        self.holders.clear();
    }
}
