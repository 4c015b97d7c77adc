//! NFTNET Sources - Data acquisition for the holder-overlap network.
//!
//! This library provides:
//! - A page source trait with a `reqwest` implementation
//! - A rate-limited, cursor-following paginated fetcher
//! - The collection catalog loader and holder resolver, each with its own cache
//! - The generation pipeline tying them to the graph builder

pub mod catalog;
pub mod context;
pub mod error;
pub mod fetcher;
pub mod holders;
pub mod pipeline;
pub mod source;

pub use catalog::CatalogLoader;
pub use context::{NetworkContext, SourceConfig};
pub use error::{FetchFailed, SourceError, SourceResult};
pub use fetcher::{FetchPolicy, PageQuery, Pages, PaginatedFetcher};
pub use holders::{HolderResolver, HolderStatus};
pub use pipeline::{build_network_graph, generate_network, run_generation, GenerationResult};
pub use source::{HttpSource, PageSource, SourceFuture};
