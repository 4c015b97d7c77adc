//! Collection catalog loader.
//!
//! Loads the top collections by 30-day volume and caches them for the life
//! of the loader. Cache rules:
//!
//! - `limit` <= cached size: cached prefix, no network activity
//! - `limit` > cached size: re-fetch, unless the cached list already holds
//!   everything the source had (a re-fetch could not return more)
//! - [`CatalogLoader::invalidate`] drops the cache
//!
//! The fetch stops once `limit` raw records have arrived, counting duplicate
//! ids. After deduplication a non-exhausted source can therefore yield fewer
//! than `limit` collections, and a repeat call with the same `limit` misses
//! the cache and fetches again.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use nftnet_core::types::{CollectionDescriptor, CollectionDetails, VolumeFigures};

use crate::error::SourceError;
use crate::fetcher::{PageQuery, PaginatedFetcher};
use crate::source::PageSource;

/// Catalog API page size limit.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Chain slug used in marketplace links.
pub const DEFAULT_CHAIN: &str = "monad-testnet";

const COLLECTIONS_ENDPOINT: &str = "collections/v7";

struct CatalogCache {
    collections: Vec<CollectionDescriptor>,
    exhausted: bool,
}

/// Loads and caches the top-by-volume collection catalog.
pub struct CatalogLoader {
    source: Arc<dyn PageSource>,
    fetcher: PaginatedFetcher,
    page_size: usize,
    chain: String,
    cache: Option<CatalogCache>,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn PageSource>, fetcher: PaginatedFetcher) -> Self {
        Self {
            source,
            fetcher,
            page_size: DEFAULT_PAGE_SIZE,
            chain: DEFAULT_CHAIN.to_string(),
            cache: None,
        }
    }

    /// Builder: set the page size sent to the source.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Builder: set the chain slug used for marketplace links.
    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = chain.into();
        self
    }

    /// Number of cached collections (0 when nothing is cached).
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.collections.len())
    }

    /// Drop the cached catalog.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn query(&self) -> PageQuery {
        PageQuery::new(COLLECTIONS_ENDPOINT)
            .param("sortBy", "30DayVolume")
            .param("limit", self.page_size)
            .param("includeMintStages", "false")
            .param("includeSecurityConfigs", "false")
            .param("normalizeRoyalties", "false")
            .param("useNonFlaggedFloorAsk", "false")
            .items("collections")
            .cursor("continuation", "continuation")
    }

    /// Top `limit` collections by 30-day volume, highest first.
    ///
    /// Returns an empty list when the source fails; the failure is logged.
    pub async fn load_top_collections(&mut self, limit: usize) -> Vec<CollectionDescriptor> {
        if limit == 0 {
            return Vec::new();
        }

        if let Some(cache) = &self.cache {
            if cache.collections.len() >= limit || cache.exhausted {
                debug!(
                    "Catalog cache hit ({} cached, {} requested)",
                    cache.collections.len(),
                    limit
                );
                return cache.collections.iter().take(limit).cloned().collect();
            }
        }

        info!("Fetching top {} collections by 30-day volume", limit);

        let pages = match self
            .fetcher
            .fetch_all(self.source.as_ref(), &self.query(), Some(limit))
            .await
        {
            Ok(pages) => pages,
            Err(e) => {
                warn!("Error fetching collections: {}", e);
                return Vec::new();
            }
        };

        let mut collections = dedupe_and_rank(decode_records(pages.items));
        collections.truncate(limit);

        info!("Fetched and cached {} collections", collections.len());

        self.cache = Some(CatalogCache {
            collections: collections.clone(),
            exhausted: pages.exhausted,
        });

        collections
    }

    /// Detailed view of one collection.
    ///
    /// Served from the cached catalog when possible, otherwise fetched
    /// individually. A rate-limit response is waited out and retried once.
    pub async fn collection_details(&self, collection_id: &str) -> Option<CollectionDetails> {
        if let Some(cache) = &self.cache {
            if let Some(collection) = cache.collections.iter().find(|c| c.id == collection_id) {
                return Some(CollectionDetails::from_descriptor(collection, &self.chain));
            }
        }

        let endpoint = format!("collections/{}/v7", collection_id);
        let body = match self.source.get(&endpoint, &[]).await {
            Err(SourceError::RateLimited) => {
                warn!(
                    "Rate limit hit for collection details, waiting {:?}",
                    self.fetcher.policy().rate_limit_cooldown
                );
                tokio::time::sleep(self.fetcher.policy().rate_limit_cooldown).await;
                self.source.get(&endpoint, &[]).await
            }
            other => other,
        };

        let record = match body {
            Ok(Value::Object(mut map)) => match map.remove("collections") {
                Some(Value::Array(mut list)) if !list.is_empty() => list.swap_remove(0),
                Some(_) => return None,
                None => Value::Object(map),
            },
            Ok(_) => {
                warn!("Unexpected collection details payload for {}", collection_id);
                return None;
            }
            Err(e) => {
                warn!("Error fetching collection details: {}", e);
                return None;
            }
        };

        match serde_json::from_value::<RawCollection>(record) {
            Ok(raw) => Some(CollectionDetails::from_descriptor(
                &raw.into_descriptor(),
                &self.chain,
            )),
            Err(e) => {
                warn!("Malformed collection details for {}: {}", collection_id, e);
                None
            }
        }
    }
}

/// Decode raw catalog records, skipping any that lack the required fields.
fn decode_records(items: Vec<Value>) -> Vec<CollectionDescriptor> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawCollection>(item) {
            Ok(raw) => Some(raw.into_descriptor()),
            Err(e) => {
                warn!("Skipping malformed collection record: {}", e);
                None
            }
        })
        .collect()
}

/// Deduplicate by id (last-seen values, first-seen position) and sort by
/// 30-day volume, highest first. The sort is stable.
pub fn dedupe_and_rank(collections: Vec<CollectionDescriptor>) -> Vec<CollectionDescriptor> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(collections.len());
    let mut unique: Vec<CollectionDescriptor> = Vec::with_capacity(collections.len());

    for collection in collections {
        match positions.get(&collection.id) {
            Some(&idx) => unique[idx] = collection,
            None => {
                positions.insert(collection.id.clone(), unique.len());
                unique.push(collection);
            }
        }
    }

    unique.sort_by(|a, b| b.volume.thirty_day.total_cmp(&a.volume.thirty_day));
    unique
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCollection {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    volume: Option<RawVolume>,
    #[serde(default)]
    floor_ask: Option<RawFloorAsk>,
    #[serde(default, deserialize_with = "lenient_count")]
    token_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    owner_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    on_sale_count: u64,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default, rename = "magicedenVerificationStatus")]
    verification_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVolume {
    #[serde(default, rename = "1day")]
    one_day: Option<f64>,
    #[serde(default, rename = "7day")]
    seven_day: Option<f64>,
    #[serde(default, rename = "30day")]
    thirty_day: Option<f64>,
    #[serde(default, rename = "allTime")]
    all_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFloorAsk {
    #[serde(default)]
    price: Option<RawPrice>,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    #[serde(default)]
    amount: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
struct RawAmount {
    #[serde(default)]
    native: Option<f64>,
}

impl RawCollection {
    fn into_descriptor(self) -> CollectionDescriptor {
        let volume = self.volume.unwrap_or_default();
        let floor_price = self
            .floor_ask
            .and_then(|f| f.price)
            .and_then(|p| p.amount)
            .and_then(|a| a.native)
            .unwrap_or(0.0);

        CollectionDescriptor {
            id: self.id,
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            symbol: self.symbol.unwrap_or_else(|| "unknown".to_string()),
            image: self.image.unwrap_or_default(),
            volume: VolumeFigures {
                one_day: volume.one_day.unwrap_or(0.0),
                seven_day: volume.seven_day.unwrap_or(0.0),
                thirty_day: volume.thirty_day.unwrap_or(0.0),
                all_time: volume.all_time.unwrap_or(0.0),
            },
            floor_price,
            token_count: self.token_count,
            verified: self.verification_status.as_deref() == Some("verified"),
            description: self.description.unwrap_or_default(),
            owner_count: self.owner_count,
            on_sale_count: self.on_sale_count,
            created_at: self.created_at,
        }
    }
}

/// Counts arrive as numbers or numeric strings depending on the endpoint.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_record() {
        let record = json!({
            "id": "0xabc",
            "name": "Chog",
            "symbol": "chog",
            "image": "https://img/chog.png",
            "volume": { "1day": 1.0, "7day": 5.0, "30day": 20.5, "allTime": 99.0 },
            "floorAsk": { "price": { "amount": { "native": 0.25 } } },
            "tokenCount": "4000",
            "ownerCount": 1200,
            "onSaleCount": "31",
            "createdAt": "2025-02-01T00:00:00Z",
            "magicedenVerificationStatus": "verified"
        });

        let collections = decode_records(vec![record]);
        assert_eq!(collections.len(), 1);
        let c = &collections[0];
        assert_eq!(c.id, "0xabc");
        assert_eq!(c.volume.thirty_day, 20.5);
        assert_eq!(c.volume.all_time, 99.0);
        assert_eq!(c.floor_price, 0.25);
        assert_eq!(c.token_count, 4000);
        assert_eq!(c.owner_count, 1200);
        assert_eq!(c.on_sale_count, 31);
        assert!(c.verified);
        assert_eq!(c.market_cap(), 1000.0);
    }

    #[test]
    fn test_decode_sparse_record_uses_defaults() {
        let record = json!({
            "id": "0xdef",
            "name": null,
            "floorAsk": null,
            "volume": { "30day": null },
            "magicedenVerificationStatus": "unverified"
        });

        let c = &decode_records(vec![record])[0];
        assert_eq!(c.name, "Unknown");
        assert_eq!(c.symbol, "unknown");
        assert_eq!(c.image, "");
        assert_eq!(c.floor_price, 0.0);
        assert_eq!(c.volume.thirty_day, 0.0);
        assert_eq!(c.token_count, 0);
        assert!(!c.verified);
    }

    #[test]
    fn test_decode_skips_records_without_id() {
        let records = vec![json!({ "name": "nameless" }), json!({ "id": "0x1" })];
        let collections = decode_records(records);
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].id, "0x1");
    }

    #[test]
    fn test_dedupe_keeps_last_seen_values() {
        let collections = vec![
            CollectionDescriptor::new("a", "A").with_volume_30d(10.0),
            CollectionDescriptor::new("b", "B").with_volume_30d(50.0),
            CollectionDescriptor::new("a", "A").with_volume_30d(70.0),
        ];

        let ranked = dedupe_and_rank(collections);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "a");
        assert_eq!(ranked[0].volume.thirty_day, 70.0);
        assert_eq!(ranked[1].id, "b");
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let collections = vec![
            CollectionDescriptor::new("first", "1").with_volume_30d(5.0),
            CollectionDescriptor::new("second", "2").with_volume_30d(5.0),
            CollectionDescriptor::new("top", "3").with_volume_30d(9.0),
        ];

        let ids: Vec<String> = dedupe_and_rank(collections)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["top", "first", "second"]);
    }

    #[test]
    fn test_lenient_count_shapes() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "lenient_count")]
            n: u64,
        }

        let parse = |v: Value| serde_json::from_value::<Probe>(v).unwrap().n;
        assert_eq!(parse(json!({ "n": 12 })), 12);
        assert_eq!(parse(json!({ "n": "34" })), 34);
        assert_eq!(parse(json!({ "n": 5.0 })), 5);
        assert_eq!(parse(json!({ "n": null })), 0);
        assert_eq!(parse(json!({ "n": "many" })), 0);
        assert_eq!(parse(json!({})), 0);
    }
}
