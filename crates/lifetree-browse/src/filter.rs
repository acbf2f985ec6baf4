//! Rank filter
//!
//! The children endpoint returns taxa at multiple ranks below the parent.
//! Only the immediate next rank is kept; everything coarser, finer, or
//! intermediate is dropped. Input order is preserved and nothing is
//! deduplicated.

use lifetree_common::Rank;
use lifetree_gbif::ChildRecord;

/// Narrow a raw children list to records of exactly `target` rank
pub fn filter_to_rank(records: Vec<ChildRecord>, target: Rank) -> Vec<ChildRecord> {
    records
        .into_iter()
        .filter(|record| record.rank == target)
        .collect()
}
