//! Network generation pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use nftnet_core::document::{ErrorDocument, NetworkDocument};
use nftnet_core::graph::{build_graph, CollectionHolders, Graph};
use nftnet_core::types::{CollectionDescriptor, HolderSet};

use crate::context::NetworkContext;
use crate::holders::HolderStatus;

/// How often holder resolution progress is logged.
const PROGRESS_EVERY: usize = 10;

/// Outcome of a successful generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub document: NetworkDocument,
    /// Collections of this run whose holders are unavailable, whether the
    /// fetch failed now or in an earlier run on the same context. They are
    /// absent from the graph.
    pub failed_collections: usize,
    pub duration: Duration,
}

/// Resolve holders for every collection, one at a time, then build the graph.
///
/// Collection `i` is fully resolved (or soft-failed) before `i + 1` starts.
pub async fn build_network_graph(
    ctx: &mut NetworkContext,
    collections: &[CollectionDescriptor],
    min_shared_holders: usize,
) -> Graph {
    info!(
        "Building network graph with {} collections (min shared holders: {})",
        collections.len(),
        min_shared_holders
    );

    let mut holder_sets: Vec<Arc<HolderSet>> = Vec::with_capacity(collections.len());
    for (i, collection) in collections.iter().enumerate() {
        let holders = ctx.holders.resolve_holders(&collection.id).await;

        if holders.is_empty() {
            warn!("Skipping {} - no holders found", collection.name);
        }
        holder_sets.push(holders);

        if (i + 1) % PROGRESS_EVERY == 0 {
            info!("Processed {}/{} collections", i + 1, collections.len());
        }
    }

    let inputs: Vec<CollectionHolders<'_>> = collections
        .iter()
        .zip(holder_sets.iter())
        .map(|(collection, holders)| CollectionHolders::new(collection, holders))
        .collect();

    let graph = build_graph(&inputs, min_shared_holders);

    info!(
        "Network graph complete: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );

    graph
}

/// Load the catalog, resolve holders and build the network document.
///
/// # Returns
///
/// The document, or an [`ErrorDocument`] naming the catalog phase when no
/// collections could be loaded. Collections whose holders could not be
/// fetched are left out of the graph but still counted in
/// `collections_analyzed`.
pub async fn generate_network(
    ctx: &mut NetworkContext,
    limit: usize,
    min_shared_holders: usize,
) -> Result<NetworkDocument, ErrorDocument> {
    run_generation(ctx, limit, min_shared_holders)
        .await
        .map(|result| result.document)
}

/// Same as [`generate_network`], also reporting failures and elapsed time.
pub async fn run_generation(
    ctx: &mut NetworkContext,
    limit: usize,
    min_shared_holders: usize,
) -> Result<GenerationResult, ErrorDocument> {
    let start = Instant::now();

    info!(
        "Starting network generation (limit: {}, min shared holders: {})",
        limit, min_shared_holders
    );

    let collections = ctx.catalog.load_top_collections(limit).await;
    if collections.is_empty() {
        return Err(ErrorDocument::no_collections());
    }

    let graph = build_network_graph(ctx, &collections, min_shared_holders).await;

    // Cached failures from earlier runs on this context count too
    let failed_collections = collections
        .iter()
        .filter(|c| matches!(ctx.holders.status(&c.id), HolderStatus::Failed { .. }))
        .count();

    if failed_collections > 0 {
        warn!(
            "{} of {} collections could not be resolved and were left out",
            failed_collections,
            collections.len()
        );
    }

    Ok(GenerationResult {
        document: NetworkDocument::new(graph, collections.len(), limit),
        failed_collections,
        duration: start.elapsed(),
    })
}
