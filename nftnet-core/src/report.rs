//! Summary report for a generated network.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::document::NetworkDocument;
use crate::graph::{density, GraphNode};

/// Holder distribution across the collections that became nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderStats {
    pub total_collections_with_holders: usize,
    pub average_holders_per_collection: f64,
    pub max_holders: usize,
    pub min_holders: usize,
}

/// A ranked collection entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCollection {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub holders: usize,
    pub influence: u64,
    pub verified: bool,
}

/// A ranked edge with resolved collection names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedConnection {
    pub rank: usize,
    pub source_name: String,
    pub target_name: String,
    pub shared_holders: usize,
    pub overlap_percentage: f64,
}

/// Condensed view of a network document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub collections_analyzed: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub min_shared_holders: usize,
    pub avg_connections_per_collection: f64,
    pub network_density_percent: f64,
    pub holder_stats: HolderStats,
    pub top_by_holders: Vec<RankedCollection>,
    pub top_by_influence: Vec<RankedCollection>,
    pub strongest_connections: Vec<RankedConnection>,
}

impl NetworkSummary {
    /// Summarize a document, keeping `top_n` entries per ranking.
    pub fn from_document(doc: &NetworkDocument, top_n: usize) -> Self {
        let graph = &doc.graph;
        let nodes = &graph.nodes;

        let total_holders: usize = nodes.iter().map(|n| n.holders).sum();
        let holder_stats = HolderStats {
            total_collections_with_holders: nodes.len(),
            average_holders_per_collection: if nodes.is_empty() {
                0.0
            } else {
                total_holders as f64 / nodes.len() as f64
            },
            max_holders: nodes.iter().map(|n| n.holders).max().unwrap_or(0),
            min_holders: nodes.iter().map(|n| n.holders).min().unwrap_or(0),
        };

        let mut by_holders: Vec<&GraphNode> = nodes.iter().collect();
        by_holders.sort_by(|a, b| b.holders.cmp(&a.holders));

        let mut by_influence: Vec<&GraphNode> = nodes.iter().collect();
        by_influence.sort_by(|a, b| b.influence.cmp(&a.influence));

        let names: HashMap<&str, &str> = nodes
            .iter()
            .map(|n| (n.id.as_str(), n.name.as_str()))
            .collect();
        let name_of = |id: &str| names.get(id).copied().unwrap_or("Unknown").to_string();

        let mut edges: Vec<_> = graph.edges.iter().collect();
        edges.sort_by(|a, b| b.weight.cmp(&a.weight));
        let strongest_connections = edges
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(i, e)| RankedConnection {
                rank: i + 1,
                source_name: name_of(&e.source),
                target_name: name_of(&e.target),
                shared_holders: e.weight,
                overlap_percentage: e.overlap_percentage,
            })
            .collect();

        Self {
            collections_analyzed: doc.metadata.collections_analyzed,
            total_nodes: nodes.len(),
            total_edges: graph.edges.len(),
            min_shared_holders: graph.stats.min_shared_holders,
            avg_connections_per_collection: graph.stats.avg_connections_per_collection,
            network_density_percent: density(nodes.len(), graph.edges.len()) * 100.0,
            holder_stats,
            top_by_holders: rank(&by_holders, top_n),
            top_by_influence: rank(&by_influence, top_n),
            strongest_connections,
        }
    }
}

fn rank(nodes: &[&GraphNode], top_n: usize) -> Vec<RankedCollection> {
    nodes
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, n)| RankedCollection {
            rank: i + 1,
            id: n.id.clone(),
            name: n.name.clone(),
            holders: n.holders,
            influence: n.influence,
            verified: n.verified,
        })
        .collect()
}
