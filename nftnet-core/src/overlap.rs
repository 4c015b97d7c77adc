//! Pairwise holder overlap.

use serde::{Deserialize, Serialize};

use crate::types::HolderSet;

/// Overlap between the holder sets of two collections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlapResult {
    /// Size of the intersection
    pub shared_holders: usize,
    pub total_holders_1: usize,
    pub total_holders_2: usize,
    /// Shared holders relative to the smaller set, in percent. 0 if either set is empty.
    pub overlap_percentage: f64,
}

/// Calculate the overlap between two holder sets.
///
/// Iterates the smaller set and probes the larger one, so the cost is
/// O(min(|a|, |b|)) hash lookups.
pub fn calculate_overlap(holders1: &HolderSet, holders2: &HolderSet) -> OverlapResult {
    let (small, large) = if holders1.len() <= holders2.len() {
        (holders1, holders2)
    } else {
        (holders2, holders1)
    };

    let shared_holders = small.iter().filter(|addr| large.contains(*addr)).count();

    let overlap_percentage = if small.is_empty() {
        0.0
    } else {
        shared_holders as f64 / small.len() as f64 * 100.0
    };

    OverlapResult {
        shared_holders,
        total_holders_1: holders1.len(),
        total_holders_2: holders2.len(),
        overlap_percentage,
    }
}
