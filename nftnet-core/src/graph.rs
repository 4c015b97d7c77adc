//! Holder-overlap graph construction.
//!
//! Turns a list of collections with resolved holder sets into an undirected
//! weighted graph. The build runs in three phases:
//!
//! ```text
//! 1. nodes    one per collection with holders > 0, provisional size from holder count
//! 2. edges    one per unordered input pair with shared holders >= threshold
//! 3. metrics  influence = sum of incident edge weights, final size from influence
//! ```
//!
//! The pair scan in phase 2 covers the full input list, not only the
//! collections that became nodes. A pair involving an empty holder set can
//! never reach a threshold above zero, so endpoints always exist as nodes.
//! A threshold of zero is raised to one for the same reason.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::overlap::calculate_overlap;
use crate::types::{CollectionDescriptor, HolderSet};

/// Holder-count divisor for the provisional node size.
const HOLDER_SIZE_DIVISOR: f64 = 20.0;
const HOLDER_SIZE_MIN: f64 = 8.0;
const HOLDER_SIZE_MAX: f64 = 40.0;

/// Influence divisor for the final node size.
const INFLUENCE_SIZE_DIVISOR: f64 = 50.0;
const INFLUENCE_SIZE_MIN: f64 = 5.0;
const INFLUENCE_SIZE_MAX: f64 = 50.0;

/// A collection paired with its resolved holder set.
#[derive(Debug, Clone, Copy)]
pub struct CollectionHolders<'a> {
    pub collection: &'a CollectionDescriptor,
    pub holders: &'a HolderSet,
}

impl<'a> CollectionHolders<'a> {
    pub fn new(collection: &'a CollectionDescriptor, holders: &'a HolderSet) -> Self {
        Self {
            collection,
            holders,
        }
    }
}

/// A collection node in the overlap graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    /// Number of distinct holder addresses
    pub holders: usize,
    pub volume_30d: f64,
    pub volume_all: f64,
    pub floor_price: f64,
    pub token_count: u64,
    pub market_cap: f64,
    /// Visual size, bounded to [5, 50] once influence is known
    pub size: f64,
    pub verified: bool,
    /// Sum of the weights of all edges touching this node
    #[serde(default)]
    pub influence: u64,
}

impl GraphNode {
    fn from_collection(collection: &CollectionDescriptor, holders: usize) -> Self {
        Self {
            id: collection.id.clone(),
            name: collection.name.clone(),
            symbol: collection.symbol.clone(),
            image: collection.image.clone(),
            holders,
            volume_30d: collection.volume.thirty_day,
            volume_all: collection.volume.all_time,
            floor_price: collection.floor_price,
            token_count: collection.token_count,
            market_cap: collection.market_cap(),
            size: holder_size(holders),
            verified: collection.verified,
            influence: 0,
        }
    }
}

/// An undirected edge between two collections sharing holders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Number of shared holders
    pub weight: usize,
    pub overlap_percentage: f64,
}

/// Aggregate statistics for a built graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_collections: usize,
    pub total_connections: usize,
    pub min_shared_holders: usize,
    pub avg_connections_per_collection: f64,
}

/// The holder-overlap network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub stats: GraphStats,
}

impl Graph {
    /// Look up a node by collection id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edge count over the number of possible undirected pairs.
    ///
    /// Returns 0.0 for graphs with fewer than two nodes.
    pub fn density(&self) -> f64 {
        density(self.nodes.len(), self.edges.len())
    }
}

/// Edge density for `nodes` nodes and `edges` undirected edges.
pub fn density(nodes: usize, edges: usize) -> f64 {
    if nodes < 2 {
        return 0.0;
    }
    let possible = nodes as f64 * (nodes as f64 - 1.0) / 2.0;
    edges as f64 / possible
}

/// Average number of connections per node: 2·|edges| / |nodes|.
pub fn avg_connections(nodes: usize, edges: usize) -> f64 {
    if nodes == 0 {
        0.0
    } else {
        edges as f64 * 2.0 / nodes as f64
    }
}

fn holder_size(holders: usize) -> f64 {
    (holders as f64 / HOLDER_SIZE_DIVISOR).clamp(HOLDER_SIZE_MIN, HOLDER_SIZE_MAX)
}

fn influence_size(influence: u64) -> f64 {
    (influence as f64 / INFLUENCE_SIZE_DIVISOR).clamp(INFLUENCE_SIZE_MIN, INFLUENCE_SIZE_MAX)
}

/// Build the holder-overlap graph.
///
/// # Arguments
///
/// * `inputs` - Collections with their holder sets, in catalog order
/// * `min_shared_holders` - Minimum intersection size for an edge
///
/// # Returns
///
/// Graph with nodes in input order and edges in (i, j) pair order.
pub fn build_graph(inputs: &[CollectionHolders<'_>], min_shared_holders: usize) -> Graph {
    // Repeated ids would produce self loops and duplicate pairs
    let mut seen = HashSet::with_capacity(inputs.len());
    let inputs: Vec<&CollectionHolders<'_>> = inputs
        .iter()
        .filter(|input| seen.insert(input.collection.id.as_str()))
        .collect();

    // Phase 1: nodes
    let mut nodes: Vec<GraphNode> = inputs
        .iter()
        .filter(|input| !input.holders.is_empty())
        .map(|input| GraphNode::from_collection(input.collection, input.holders.len()))
        .collect();

    // Phase 2: edges
    let threshold = min_shared_holders.max(1);
    let n = inputs.len();
    let edges: Vec<GraphEdge> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let inputs = &inputs;
            ((i + 1)..n).filter_map(move |j| {
                let (a, b) = (inputs[i], inputs[j]);
                let overlap = calculate_overlap(a.holders, b.holders);
                (overlap.shared_holders >= threshold).then(|| GraphEdge {
                    source: a.collection.id.clone(),
                    target: b.collection.id.clone(),
                    weight: overlap.shared_holders,
                    overlap_percentage: overlap.overlap_percentage,
                })
            })
        })
        .collect();

    // Phase 3: influence and final size
    let mut influence: HashMap<&str, u64> = HashMap::with_capacity(nodes.len());
    for edge in &edges {
        *influence.entry(edge.source.as_str()).or_default() += edge.weight as u64;
        *influence.entry(edge.target.as_str()).or_default() += edge.weight as u64;
    }
    for node in &mut nodes {
        node.influence = influence.get(node.id.as_str()).copied().unwrap_or(0);
        node.size = influence_size(node.influence);
    }

    let stats = GraphStats {
        total_collections: nodes.len(),
        total_connections: edges.len(),
        min_shared_holders,
        avg_connections_per_collection: avg_connections(nodes.len(), edges.len()),
    };

    Graph {
        nodes,
        edges,
        stats,
    }
}
