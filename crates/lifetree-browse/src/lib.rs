//! Lifetree Browse - the lazy tree model
//!
//! In-memory representation of the currently materialized taxonomic tree:
//! which nodes are expanded, which are collapsed with cached children, which
//! are unexplored. The [`controller::TreeController`] owns all state and
//! runs the expand/collapse state machine over a [`lifetree_gbif::TaxonSource`];
//! the rank filter narrows raw API children to the single target rank.

pub mod config;
pub mod controller;
pub mod filter;
pub mod node;
pub mod richness;

pub use config::BrowseConfig;
pub use controller::{ExpandOutcome, ToggleOutcome, TreeController, TreeEvent};
pub use filter::filter_to_rank;
pub use node::{NodeId, NodeState, TreeNode, TreeRow};
