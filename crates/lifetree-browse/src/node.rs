//! Tree node records
//!
//! Nodes live in an arena owned by the controller and reference their
//! children by id. Identifiers are minted from the controller's internal
//! counter, never from process-wide state.

use serde::Serialize;

use lifetree_common::Taxon;

/// Identifier of a materialized tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Expansion state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Never expanded; children unknown
    Unexplored,
    /// Children fetched and shown
    Expanded,
    /// Children fetched but hidden; re-expand is cache-only
    Collapsed,
}

/// One materialized node of the lazy tree
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub taxon: Taxon,
    pub depth: usize,
    pub state: NodeState,
    /// Child node ids, in filtered API order; empty unless the node has
    /// been expanded at least once
    pub children: Vec<NodeId>,
    /// Cached expandability affordance, once known
    pub has_known_children: Option<bool>,
    /// Bumped on collapse; an in-flight expansion that started under an
    /// older generation drops its results on arrival
    #[serde(skip)]
    pub(crate) generation: u64,
}

impl TreeNode {
    pub(crate) fn new(id: NodeId, taxon: Taxon, depth: usize) -> Self {
        Self {
            id,
            taxon,
            depth,
            state: NodeState::Unexplored,
            children: Vec::new(),
            has_known_children: None,
            generation: 0,
        }
    }
}

/// Flat render row produced by the controller's visible-tree walk
#[derive(Debug, Clone, Serialize)]
pub struct TreeRow {
    pub id: NodeId,
    pub depth: usize,
    pub taxon: Taxon,
    pub state: NodeState,
    pub has_known_children: Option<bool>,
}

impl From<&TreeNode> for TreeRow {
    fn from(node: &TreeNode) -> Self {
        Self {
            id: node.id,
            depth: node.depth,
            taxon: node.taxon.clone(),
            state: node.state,
            has_known_children: node.has_known_children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetree_common::{Rank, TaxonKey};

    #[test]
    fn test_new_node_is_unexplored() {
        let taxon = Taxon::new(TaxonKey(6), "Plantae", None, Rank::Kingdom);
        let node = TreeNode::new(NodeId::new(0), taxon, 0);

        assert_eq!(node.state, NodeState::Unexplored);
        assert!(node.children.is_empty());
        assert_eq!(node.has_known_children, None);
        assert_eq!(node.generation, 0);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::new(7).to_string(), "#7");
    }
}
