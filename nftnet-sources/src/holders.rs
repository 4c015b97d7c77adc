//! Holder set resolver.
//!
//! Resolves the full holder-address set of a collection at most once per
//! resolver lifetime. Every outcome, including failures, is cached, so a
//! collection whose holders could not be fetched is never requested again.
//!
//! Failures resolve to an empty set; no placeholder addresses are ever
//! substituted. Internally the resolver still remembers whether an empty
//! set came from the source or from a failed fetch (see [`HolderStatus`]).

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use nftnet_core::types::HolderSet;

use crate::fetcher::{PageQuery, PaginatedFetcher};
use crate::source::PageSource;

/// Only values with this prefix are treated as wallet addresses.
pub const ADDRESS_PREFIX: &str = "0x";

const OWNERS_ENDPOINT: &str = "getOwnersForContract";

/// Resolution state of a single collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderStatus {
    /// Never requested
    NotAttempted,
    /// Fetched successfully (possibly zero holders)
    Resolved { holders: usize },
    /// Fetch failed; the collection resolves to an empty set
    Failed { reason: String },
}

#[derive(Debug, Clone)]
enum Outcome {
    Resolved,
    Failed(String),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    holders: Arc<HolderSet>,
    outcome: Outcome,
}

/// Fetches and caches holder sets keyed by collection id.
pub struct HolderResolver {
    source: Arc<dyn PageSource>,
    fetcher: PaginatedFetcher,
    cache: HashMap<String, CacheEntry>,
}

impl HolderResolver {
    pub fn new(source: Arc<dyn PageSource>, fetcher: PaginatedFetcher) -> Self {
        Self {
            source,
            fetcher,
            cache: HashMap::new(),
        }
    }

    fn query(collection_id: &str) -> PageQuery {
        PageQuery::new(OWNERS_ENDPOINT)
            .param("contractAddress", collection_id)
            .param("withTokenBalances", "false")
            .items("owners")
            .cursor("pageKey", "pageKey")
    }

    /// Holder set for a collection, fetching it on first request only.
    pub async fn resolve_holders(&mut self, collection_id: &str) -> Arc<HolderSet> {
        if let Some(entry) = self.cache.get(collection_id) {
            debug!("Holder cache hit for {}", short_id(collection_id));
            return Arc::clone(&entry.holders);
        }

        info!("Fetching holders for collection {}", short_id(collection_id));

        let entry = match self
            .fetcher
            .fetch_all(self.source.as_ref(), &Self::query(collection_id), None)
            .await
        {
            Ok(pages) => {
                let holders = extract_addresses(&pages.items);
                info!(
                    "Found {} holders for {}",
                    holders.len(),
                    short_id(collection_id)
                );
                CacheEntry {
                    holders: Arc::new(holders),
                    outcome: Outcome::Resolved,
                }
            }
            Err(e) => {
                warn!(
                    "Error fetching holders for {}: {}",
                    short_id(collection_id),
                    e
                );
                CacheEntry {
                    holders: Arc::new(HolderSet::new()),
                    outcome: Outcome::Failed(e.to_string()),
                }
            }
        };

        let holders = Arc::clone(&entry.holders);
        self.cache.insert(collection_id.to_string(), entry);
        holders
    }

    pub fn status(&self, collection_id: &str) -> HolderStatus {
        match self.cache.get(collection_id) {
            None => HolderStatus::NotAttempted,
            Some(CacheEntry {
                holders,
                outcome: Outcome::Resolved,
            }) => HolderStatus::Resolved {
                holders: holders.len(),
            },
            Some(CacheEntry {
                outcome: Outcome::Failed(reason),
                ..
            }) => HolderStatus::Failed {
                reason: reason.clone(),
            },
        }
    }

    /// Number of collections whose fetch failed.
    pub fn failure_count(&self) -> usize {
        self.cache
            .values()
            .filter(|e| matches!(e.outcome, Outcome::Failed(_)))
            .count()
    }

    /// True when no collection has been attempted yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Forget every cached outcome.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Collect normalized addresses from owner records.
///
/// Accepts bare address strings and objects with an `ownerAddress` field.
/// Anything else, or any value without the `0x` prefix, is skipped.
pub fn extract_addresses(owners: &[Value]) -> HolderSet {
    owners
        .iter()
        .filter_map(|owner| match owner {
            Value::String(addr) => Some(addr.as_str()),
            Value::Object(map) => map.get("ownerAddress").and_then(Value::as_str),
            _ => None,
        })
        .filter(|addr| addr.starts_with(ADDRESS_PREFIX))
        .map(|addr| addr.to_lowercase())
        .collect()
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(10) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
