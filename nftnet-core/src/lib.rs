//! NFTNET Core - Holder-overlap graph model and builder.
//!
//! This crate holds the pure, network-free half of NFTNET: the collection
//! data model, pairwise holder overlap, graph construction with influence
//! metrics, the serialized network document, and the summary report.
//!
//! # Features
//!
//! - **Overlap math**: Shared holders and overlap percentage for any two holder sets
//! - **Graph builder**: Nodes per collection with holders, edges per qualifying pair
//! - **Parallel pair scan**: C(N,2) intersections evaluated with Rayon, order preserved
//! - **Stable document**: `graph` + `metadata` JSON layout consumed by visualizers
//!
//! # Usage
//!
//! ```ignore
//! use nftnet_core::graph::{build_graph, CollectionHolders};
//!
//! let inputs = vec![CollectionHolders::new(&descriptor, &holders)];
//! let graph = build_graph(&inputs, 10);
//! println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
//! ```

pub mod document;
pub mod graph;
pub mod overlap;
pub mod report;
pub mod types;

pub use document::{DocumentError, ErrorDocument, NetworkDocument, NetworkMetadata, Phase};
pub use graph::{build_graph, CollectionHolders, Graph, GraphEdge, GraphNode, GraphStats};
pub use overlap::{calculate_overlap, OverlapResult};
pub use report::NetworkSummary;
pub use types::{CollectionDescriptor, CollectionDetails, HolderSet, VolumeFigures};
