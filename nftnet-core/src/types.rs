//! Data models for NFT collections and their holders.
//!
//! These types describe a collection as it comes out of the catalog, the
//! detailed view of a single collection, and the holder set used for
//! overlap computation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Set of lower-cased wallet addresses holding at least one token of a collection.
pub type HolderSet = HashSet<String>;

/// Trading volume over the windows reported by the catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeFigures {
    #[serde(rename = "1day")]
    pub one_day: f64,
    #[serde(rename = "7day")]
    pub seven_day: f64,
    #[serde(rename = "30day")]
    pub thirty_day: f64,
    pub all_time: f64,
}

/// A collection from the top-by-volume catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    /// Contract identity, unique across the catalog
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub volume: VolumeFigures,
    /// Floor ask in the chain's native currency
    pub floor_price: f64,
    pub token_count: u64,
    pub verified: bool,
    pub description: String,
    pub owner_count: u64,
    pub on_sale_count: u64,
    pub created_at: Option<String>,
}

impl CollectionDescriptor {
    /// Create a descriptor with an id and name; everything else defaulted.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: "unknown".to_string(),
            ..Default::default()
        }
    }

    /// Builder: set the 30-day volume.
    pub fn with_volume_30d(mut self, volume: f64) -> Self {
        self.volume.thirty_day = volume;
        self
    }

    /// Builder: set floor price and token count.
    pub fn with_supply(mut self, floor_price: f64, token_count: u64) -> Self {
        self.floor_price = floor_price;
        self.token_count = token_count;
        self
    }

    /// Floor price multiplied by token count.
    pub fn market_cap(&self) -> f64 {
        self.floor_price * self.token_count as f64
    }
}

/// Expanded view of a single collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionDetails {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub description: String,
    pub floor_price: f64,
    pub market_cap: f64,
    pub volume: VolumeFigures,
    pub token_count: u64,
    pub owner_count: u64,
    pub listed_count: u64,
    pub verified: bool,
    pub created_at: Option<String>,
    pub magic_eden_url: String,
}

impl CollectionDetails {
    /// Build the detailed view for a collection listed on `chain`.
    pub fn from_descriptor(collection: &CollectionDescriptor, chain: &str) -> Self {
        Self {
            id: collection.id.clone(),
            name: collection.name.clone(),
            symbol: collection.symbol.clone(),
            image: collection.image.clone(),
            description: collection.description.clone(),
            floor_price: collection.floor_price,
            market_cap: collection.market_cap(),
            volume: collection.volume.clone(),
            token_count: collection.token_count,
            owner_count: collection.owner_count,
            listed_count: collection.on_sale_count,
            verified: collection.verified,
            created_at: collection.created_at.clone(),
            magic_eden_url: format!(
                "https://magiceden.io/collections/{}/{}",
                chain, collection.symbol
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_cap() {
        let collection = CollectionDescriptor::new("0xabc", "Apes").with_supply(1.5, 1000);
        assert_eq!(collection.market_cap(), 1500.0);
    }

    #[test]
    fn test_market_cap_without_floor() {
        let collection = CollectionDescriptor::new("0xabc", "Apes");
        assert_eq!(collection.market_cap(), 0.0);
    }

    #[test]
    fn test_details_url_and_counts() {
        let mut collection = CollectionDescriptor::new("0xabc", "Apes").with_supply(2.0, 10);
        collection.symbol = "apes".to_string();
        collection.on_sale_count = 3;

        let details = CollectionDetails::from_descriptor(&collection, "monad-testnet");
        assert_eq!(
            details.magic_eden_url,
            "https://magiceden.io/collections/monad-testnet/apes"
        );
        assert_eq!(details.listed_count, 3);
        assert_eq!(details.market_cap, 20.0);
    }

    #[test]
    fn test_volume_field_names() {
        let volume = VolumeFigures {
            one_day: 1.0,
            seven_day: 7.0,
            thirty_day: 30.0,
            all_time: 100.0,
        };
        let json = serde_json::to_value(&volume).unwrap();
        assert_eq!(json["1day"], 1.0);
        assert_eq!(json["30day"], 30.0);
        assert_eq!(json["all_time"], 100.0);
    }
}
