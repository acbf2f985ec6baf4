//! Lazy tree controller
//!
//! Owns the node arena and runs the per-node state machine:
//! `Unexplored → Expanded` on first expand (children fetched, rank-filtered,
//! detail-resolved), `Expanded → Collapsed` on collapse (children retained,
//! hidden), `Collapsed → Expanded` on re-expand (cache only, no network).
//!
//! The lock is never held across an await, so independent expansions
//! interleave freely on the single-threaded runtime. In-flight requests are
//! never cancelled; instead every node carries a generation counter and a
//! finished expansion applies its children only if the node is still
//! unexplored under the generation it started from. Anything else is
//! dropped as stale, which also makes concurrent double expansion resolve
//! to first-writer-wins.

use std::collections::{HashMap, VecDeque};

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use lifetree_common::{LifetreeError, Rank, Result, Taxon, TaxonKey};
use lifetree_gbif::TaxonSource;

use crate::config::BrowseConfig;
use crate::filter::filter_to_rank;
use crate::node::{NodeId, NodeState, TreeNode, TreeRow};

/// View-layer message dispatched into the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    Expand(NodeId),
    Collapse(NodeId),
    Toggle(NodeId),
}

/// Result of an expand request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// The node is expanded; these are its children in display order
    Children(Vec<NodeId>),
    /// The node moved on while the fetch was in flight; results dropped
    Stale,
}

/// Result of handling a [`TreeEvent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Expanded(Vec<NodeId>),
    Collapsed,
    Stale,
}

struct TreeState {
    nodes: HashMap<NodeId, TreeNode>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl TreeState {
    fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            next_id: 0,
        }
    }

    fn insert(&mut self, taxon: Taxon, depth: usize) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, TreeNode::new(id, taxon, depth));
        id
    }

    fn node(&self, id: NodeId) -> Result<&TreeNode> {
        self.nodes
            .get(&id)
            .ok_or_else(|| LifetreeError::UnknownNode(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| LifetreeError::UnknownNode(id.to_string()))
    }
}

enum FirstLook {
    Done(ExpandOutcome),
    Fetch {
        key: TaxonKey,
        depth: usize,
        generation: u64,
        target: Rank,
    },
}

/// The lazy tree model
pub struct TreeController<S> {
    source: S,
    config: BrowseConfig,
    state: Mutex<TreeState>,
}

impl<S: TaxonSource> TreeController<S> {
    /// Create a controller over a taxon source
    pub fn new(source: S, config: BrowseConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(TreeState::new()),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &BrowseConfig {
        &self.config
    }

    /// Add an already-fetched taxon as a root node
    pub async fn insert_root(&self, taxon: Taxon) -> NodeId {
        let mut state = self.state.lock().await;
        let id = state.insert(taxon, 0);
        state.roots.push(id);
        id
    }

    /// Resolve the configured root names into root nodes
    ///
    /// A name the API cannot confidently match is skipped with a warning;
    /// the rest of the list proceeds.
    pub async fn discover_roots(&self) -> Result<Vec<NodeId>> {
        let mut ids = Vec::new();
        for name in self.config.root_names.clone() {
            let matched = match self.source.match_taxon_by_name(&name).await {
                Ok(taxon) => taxon,
                Err(LifetreeError::NotFound(_)) => {
                    warn!(name = %name, "no confident match, skipping root");
                    continue;
                }
                Err(err) => return Err(err),
            };
            // the match response has no vernacular name; fetch the detail
            let taxon = self.source.fetch_taxon(matched.key).await?;
            ids.push(self.insert_root(taxon).await);
        }
        Ok(ids)
    }

    /// Discover roots by searching for taxa of the order's first rank
    pub async fn discover_roots_by_rank(&self, limit: u32) -> Result<Vec<NodeId>> {
        let rank = self.config.rank_order.first();
        let taxa = self.source.search_by_rank(rank, limit).await?;
        let mut ids = Vec::new();
        for taxon in taxa {
            ids.push(self.insert_root(taxon).await);
        }
        Ok(ids)
    }

    /// Dispatch a view-layer event into the state machine
    pub async fn handle(&self, event: TreeEvent) -> Result<ToggleOutcome> {
        match event {
            TreeEvent::Expand(id) => Ok(match self.expand(id).await? {
                ExpandOutcome::Children(children) => ToggleOutcome::Expanded(children),
                ExpandOutcome::Stale => ToggleOutcome::Stale,
            }),
            TreeEvent::Collapse(id) => {
                self.collapse(id).await?;
                Ok(ToggleOutcome::Collapsed)
            }
            TreeEvent::Toggle(id) => self.toggle(id).await,
        }
    }

    /// Expand a node: collapse-state nodes re-show their cached children,
    /// unexplored nodes fetch one rank down
    pub async fn expand(&self, id: NodeId) -> Result<ExpandOutcome> {
        let plan = {
            let mut state = self.state.lock().await;
            let node = state.node_mut(id)?;
            match node.state {
                NodeState::Expanded => FirstLook::Done(ExpandOutcome::Children(node.children.clone())),
                NodeState::Collapsed => {
                    node.state = NodeState::Expanded;
                    debug!(node = %id, "re-expanded from cache");
                    FirstLook::Done(ExpandOutcome::Children(node.children.clone()))
                }
                NodeState::Unexplored => {
                    match self.config.rank_order.next_after(Some(node.taxon.rank)) {
                        // terminal: zero children, no network call
                        None => {
                            node.state = NodeState::Expanded;
                            node.has_known_children = Some(false);
                            FirstLook::Done(ExpandOutcome::Children(Vec::new()))
                        }
                        Some(target) => FirstLook::Fetch {
                            key: node.taxon.key,
                            depth: node.depth,
                            generation: node.generation,
                            target,
                        },
                    }
                }
            }
        };

        let (key, depth, generation, target) = match plan {
            FirstLook::Done(outcome) => return Ok(outcome),
            FirstLook::Fetch {
                key,
                depth,
                generation,
                target,
            } => (key, depth, generation, target),
        };

        // Network phase, lock released. Child details resolve as a bounded,
        // order-preserving fan-out; one failure fails the whole expansion.
        let raw = self.source.fetch_raw_children(key, self.config.child_limit).await?;
        let filtered = filter_to_rank(raw, target);
        debug!(node = %id, target = %target, kept = filtered.len(), "filtered children");

        let taxa: Vec<Taxon> = stream::iter(
            filtered
                .iter()
                .map(|record| self.source.fetch_taxon(record.taxon_key())),
        )
        .buffered(self.config.detail_concurrency.max(1))
        .try_collect()
        .await?;

        let mut state = self.state.lock().await;
        let still_current = {
            let node = state.node(id)?;
            node.state == NodeState::Unexplored && node.generation == generation
        };
        if !still_current {
            debug!(node = %id, "expansion superseded, dropping stale children");
            return Ok(ExpandOutcome::Stale);
        }

        let child_ids: Vec<NodeId> = taxa
            .into_iter()
            .map(|taxon| state.insert(taxon, depth + 1))
            .collect();
        let node = state.node_mut(id)?;
        node.has_known_children = Some(!child_ids.is_empty());
        node.children = child_ids.clone();
        node.state = NodeState::Expanded;
        Ok(ExpandOutcome::Children(child_ids))
    }

    /// Collapse a node, retaining its fetched children
    ///
    /// Also invalidates any expansion currently in flight for the node.
    pub async fn collapse(&self, id: NodeId) -> Result<()> {
        let mut state = self.state.lock().await;
        let node = state.node_mut(id)?;
        node.generation += 1;
        if node.state == NodeState::Expanded {
            node.state = NodeState::Collapsed;
            debug!(node = %id, "collapsed, children retained");
        }
        Ok(())
    }

    /// Toggle: expanded nodes collapse, anything else expands
    pub async fn toggle(&self, id: NodeId) -> Result<ToggleOutcome> {
        let current = self.state.lock().await.node(id)?.state;
        match current {
            NodeState::Expanded => {
                self.collapse(id).await?;
                Ok(ToggleOutcome::Collapsed)
            }
            NodeState::Unexplored | NodeState::Collapsed => Ok(match self.expand(id).await? {
                ExpandOutcome::Children(children) => ToggleOutcome::Expanded(children),
                ExpandOutcome::Stale => ToggleOutcome::Stale,
            }),
        }
    }

    /// Eager expandability probe
    ///
    /// Terminal nodes answer without the network. Otherwise the probe runs
    /// the same children query an expansion would (same limit, same filter)
    /// and caches the answer, so it can never disagree with a later expand.
    pub async fn has_children(&self, id: NodeId) -> Result<bool> {
        let (key, rank, cached) = {
            let state = self.state.lock().await;
            let node = state.node(id)?;
            (node.taxon.key, node.taxon.rank, node.has_known_children)
        };
        if let Some(known) = cached {
            return Ok(known);
        }

        let target = match self.config.rank_order.next_after(Some(rank)) {
            None => {
                let mut state = self.state.lock().await;
                state.node_mut(id)?.has_known_children = Some(false);
                return Ok(false);
            }
            Some(target) => target,
        };

        let raw = self.source.fetch_raw_children(key, self.config.child_limit).await?;
        let answer = raw.iter().any(|record| record.rank == target);

        let mut state = self.state.lock().await;
        let node = state.node_mut(id)?;
        if node.has_known_children.is_none() {
            node.has_known_children = Some(answer);
        }
        Ok(answer)
    }

    /// Breadth-first expansion of a subtree down `depth` levels
    ///
    /// Returns the number of nodes expanded. Cache rules apply: levels
    /// already materialized cost no network calls.
    pub async fn expand_to_depth(&self, root: NodeId, depth: usize) -> Result<usize> {
        let mut queue = VecDeque::new();
        queue.push_back((root, 0usize));
        let mut expanded = 0usize;

        while let Some((id, level)) = queue.pop_front() {
            if level >= depth {
                continue;
            }
            match self.expand(id).await? {
                ExpandOutcome::Children(children) => {
                    expanded += 1;
                    for child in children {
                        queue.push_back((child, level + 1));
                    }
                }
                ExpandOutcome::Stale => {}
            }
        }
        Ok(expanded)
    }

    /// Snapshot of one node
    pub async fn node(&self, id: NodeId) -> Result<TreeNode> {
        Ok(self.state.lock().await.node(id)?.clone())
    }

    /// Taxa for a list of node ids, in the given order
    pub async fn taxa(&self, ids: &[NodeId]) -> Result<Vec<Taxon>> {
        let state = self.state.lock().await;
        ids.iter()
            .map(|id| Ok(state.node(*id)?.taxon.clone()))
            .collect()
    }

    /// Current root node ids
    pub async fn roots(&self) -> Vec<NodeId> {
        self.state.lock().await.roots.clone()
    }

    /// Preorder walk of the visible tree: every root, and the children of
    /// every expanded node
    pub async fn visible(&self) -> Vec<TreeRow> {
        let state = self.state.lock().await;
        let mut rows = Vec::new();
        let mut stack: Vec<NodeId> = state.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if let Some(node) = state.nodes.get(&id) {
                rows.push(TreeRow::from(node));
                if node.state == NodeState::Expanded {
                    for child in node.children.iter().rev() {
                        stack.push(*child);
                    }
                }
            }
        }
        rows
    }
}
