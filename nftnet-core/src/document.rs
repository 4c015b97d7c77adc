//! The network document handed to visualizers and reporting tools.
//!
//! # Layout
//!
//! ```json
//! {
//!   "graph": { "nodes": [...], "edges": [...], "stats": {...} },
//!   "metadata": {
//!     "generated_at": "2025-01-01T00:00:00Z",
//!     "data_source": "magic_eden_api",
//!     "collections_analyzed": 1000,
//!     "parameters": { "limit": 1000, "min_shared_holders": 10 }
//!   }
//! }
//! ```
//!
//! Field names and nesting are a compatibility surface; do not rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::graph::Graph;

/// Data source label written into every document.
pub const DATA_SOURCE: &str = "magic_eden_api";

/// Errors reading or validating a network document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Edge {source_id} -> {target_id} references a node that is not in the graph")]
    DanglingEdge {
        source_id: String,
        target_id: String,
    },
}

/// Input parameters recorded with the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    pub limit: usize,
    pub min_shared_holders: usize,
}

/// Generation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetadata {
    pub generated_at: DateTime<Utc>,
    pub data_source: String,
    /// Number of catalog collections considered, including those that produced no node
    pub collections_analyzed: usize,
    pub parameters: Parameters,
}

/// A generated holder-overlap network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub graph: Graph,
    pub metadata: NetworkMetadata,
}

impl NetworkDocument {
    /// Wrap a graph with metadata stamped at the current time.
    pub fn new(graph: Graph, collections_analyzed: usize, limit: usize) -> Self {
        let min_shared_holders = graph.stats.min_shared_holders;
        Self {
            graph,
            metadata: NetworkMetadata {
                generated_at: Utc::now(),
                data_source: DATA_SOURCE.to_string(),
                collections_analyzed,
                parameters: Parameters {
                    limit,
                    min_shared_holders,
                },
            },
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a document.
    pub fn from_json(content: &str) -> Result<Self, DocumentError> {
        let doc: NetworkDocument = serde_json::from_str(content)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Load and validate a document from disk.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write the document to disk as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Check that every edge endpoint is a node.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let ids: HashSet<&str> = self.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &self.graph.edges {
            if !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()) {
                return Err(DocumentError::DanglingEdge {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Pipeline phase a failed run stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Catalog,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Catalog => write!(f, "catalog"),
        }
    }
}

/// Structured result of a run that produced no graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{error} (phase: {phase})")]
pub struct ErrorDocument {
    pub error: String,
    pub phase: Phase,
}

impl ErrorDocument {
    /// The catalog source returned no usable collections.
    pub fn no_collections() -> Self {
        Self {
            error: "Failed to fetch collections".to_string(),
            phase: Phase::Catalog,
        }
    }
}
