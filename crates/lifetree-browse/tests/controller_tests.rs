//! State-machine tests for the tree controller
//!
//! Run against an in-memory taxon source with call counters, so every
//! "no network call" guarantee is checked literally.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use lifetree_browse::{
    BrowseConfig, ExpandOutcome, NodeState, ToggleOutcome, TreeController, TreeEvent,
};
use lifetree_common::{LifetreeError, Rank, RankOrder, Result, Taxon, TaxonKey};
use lifetree_gbif::{ChildRecord, TaxonSource};

#[derive(Clone, Default)]
struct Counters {
    children: Arc<AtomicUsize>,
    details: Arc<AtomicUsize>,
    matches: Arc<AtomicUsize>,
}

impl Counters {
    fn children_calls(&self) -> usize {
        self.children.load(Ordering::SeqCst)
    }

    fn detail_calls(&self) -> usize {
        self.details.load(Ordering::SeqCst)
    }

    fn match_calls(&self) -> usize {
        self.matches.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct MockSource {
    taxa: HashMap<i64, Taxon>,
    children: HashMap<i64, Vec<ChildRecord>>,
    failing_details: Vec<i64>,
    children_gate: Option<Arc<Semaphore>>,
    counters: Counters,
}

impl MockSource {
    fn new() -> Self {
        Self::default()
    }

    fn with_taxon(mut self, taxon: Taxon) -> Self {
        self.taxa.insert(taxon.key.0, taxon);
        self
    }

    fn with_children(mut self, key: i64, children: Vec<ChildRecord>) -> Self {
        self.children.insert(key, children);
        self
    }

    fn with_failing_detail(mut self, key: i64) -> Self {
        self.failing_details.push(key);
        self
    }

    /// Children queries block until the gate releases a permit
    fn with_children_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.children_gate = Some(gate);
        self
    }

    fn counters(&self) -> Counters {
        self.counters.clone()
    }
}

#[async_trait]
impl TaxonSource for MockSource {
    async fn fetch_taxon(&self, key: TaxonKey) -> Result<Taxon> {
        self.counters.details.fetch_add(1, Ordering::SeqCst);
        if self.failing_details.contains(&key.0) {
            return Err(LifetreeError::status(500, "detail fetch failed"));
        }
        self.taxa
            .get(&key.0)
            .cloned()
            .ok_or_else(|| LifetreeError::not_found(format!("species {}", key)))
    }

    async fn fetch_raw_children(&self, key: TaxonKey, _limit: u32) -> Result<Vec<ChildRecord>> {
        self.counters.children.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.children_gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        Ok(self.children.get(&key.0).cloned().unwrap_or_default())
    }

    async fn match_taxon_by_name(&self, name: &str) -> Result<Taxon> {
        self.counters.matches.fetch_add(1, Ordering::SeqCst);
        self.taxa
            .values()
            .find(|t| t.scientific_name == name)
            .cloned()
            .ok_or_else(|| LifetreeError::not_found(format!("no confident match for '{}'", name)))
    }

    async fn search_by_rank(&self, rank: Rank, _limit: u32) -> Result<Vec<Taxon>> {
        let mut taxa: Vec<Taxon> = self.taxa.values().filter(|t| t.rank == rank).cloned().collect();
        taxa.sort_by_key(|t| t.key);
        Ok(taxa)
    }
}

fn taxon(key: i64, name: &str, rank: Rank) -> Taxon {
    Taxon::new(TaxonKey(key), name, None, rank)
}

fn child(key: i64, name: &str, rank: Rank) -> ChildRecord {
    ChildRecord {
        key,
        scientific_name: name.to_string(),
        rank,
    }
}

/// Plantae with a mixed-rank children list: two phyla and a class
fn plantae_source() -> MockSource {
    MockSource::new()
        .with_taxon(taxon(6, "Plantae", Rank::Kingdom))
        .with_taxon(taxon(13, "Tracheophyta", Rank::Phylum))
        .with_taxon(taxon(35, "Bryophyta", Rank::Phylum))
        .with_taxon(taxon(220, "Magnoliopsida", Rank::Class))
        .with_children(
            6,
            vec![
                child(13, "Tracheophyta", Rank::Phylum),
                child(220, "Magnoliopsida", Rank::Class),
                child(35, "Bryophyta", Rank::Phylum),
            ],
        )
}

fn controller(source: MockSource) -> TreeController<MockSource> {
    TreeController::new(source, BrowseConfig::default())
}

#[tokio::test]
async fn test_expand_keeps_only_next_rank_children_in_api_order() {
    let source = plantae_source();
    let counters = source.counters();
    let ctrl = controller(source);

    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;
    let outcome = ctrl.expand(root).await.unwrap();

    let ExpandOutcome::Children(children) = outcome else {
        panic!("expected children");
    };
    let names: Vec<String> = ctrl
        .taxa(&children)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.scientific_name)
        .collect();
    assert_eq!(names, vec!["Tracheophyta", "Bryophyta"]);

    // one children query, one detail fetch per surviving record
    assert_eq!(counters.children_calls(), 1);
    assert_eq!(counters.detail_calls(), 2);

    let node = ctrl.node(root).await.unwrap();
    assert_eq!(node.state, NodeState::Expanded);
    assert_eq!(node.has_known_children, Some(true));
}

#[tokio::test]
async fn test_terminal_rank_expands_empty_without_network() {
    let source = MockSource::new();
    let counters = source.counters();
    let ctrl = controller(source);

    let genus = ctrl.insert_root(taxon(2877951, "Quercus", Rank::Genus)).await;
    let outcome = ctrl.expand(genus).await.unwrap();

    assert_eq!(outcome, ExpandOutcome::Children(Vec::new()));
    assert_eq!(counters.children_calls(), 0);
    assert_eq!(counters.detail_calls(), 0);

    let node = ctrl.node(genus).await.unwrap();
    assert_eq!(node.state, NodeState::Expanded);
    assert_eq!(node.has_known_children, Some(false));
}

#[tokio::test]
async fn test_reexpand_from_cache_makes_no_network_calls() {
    let source = plantae_source();
    let counters = source.counters();
    let ctrl = controller(source);

    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;
    let ExpandOutcome::Children(first) = ctrl.expand(root).await.unwrap() else {
        panic!("expected children");
    };
    let children_before = counters.children_calls();
    let details_before = counters.detail_calls();

    ctrl.collapse(root).await.unwrap();
    assert_eq!(ctrl.node(root).await.unwrap().state, NodeState::Collapsed);

    let ExpandOutcome::Children(second) = ctrl.expand(root).await.unwrap() else {
        panic!("expected children");
    };

    assert_eq!(first, second);
    assert_eq!(counters.children_calls(), children_before);
    assert_eq!(counters.detail_calls(), details_before);
}

#[tokio::test]
async fn test_toggle_cycles_through_states() {
    let ctrl = controller(plantae_source());
    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;

    let ToggleOutcome::Expanded(first) = ctrl.toggle(root).await.unwrap() else {
        panic!("expected expansion");
    };
    assert_eq!(first.len(), 2);

    assert_eq!(ctrl.toggle(root).await.unwrap(), ToggleOutcome::Collapsed);
    assert_eq!(ctrl.node(root).await.unwrap().state, NodeState::Collapsed);

    let ToggleOutcome::Expanded(second) = ctrl.toggle(root).await.unwrap() else {
        panic!("expected expansion");
    };
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_event_dispatch_matches_direct_calls() {
    let ctrl = controller(plantae_source());
    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;

    let outcome = ctrl.handle(TreeEvent::Expand(root)).await.unwrap();
    assert!(matches!(outcome, ToggleOutcome::Expanded(_)));

    let outcome = ctrl.handle(TreeEvent::Collapse(root)).await.unwrap();
    assert_eq!(outcome, ToggleOutcome::Collapsed);

    let outcome = ctrl.handle(TreeEvent::Toggle(root)).await.unwrap();
    assert!(matches!(outcome, ToggleOutcome::Expanded(_)));
}

#[tokio::test]
async fn test_has_children_probe_agrees_with_expand() {
    // Rosaceae's raw children are species only: nothing at genus rank
    let source = plantae_source()
        .with_taxon(taxon(5015, "Rosaceae", Rank::Family))
        .with_children(5015, vec![child(3, "Rosa canina", Rank::Species)]);
    let counters = source.counters();
    let ctrl = controller(source);

    let plantae = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;
    let rosaceae = ctrl.insert_root(taxon(5015, "Rosaceae", Rank::Family)).await;
    let quercus = ctrl.insert_root(taxon(2877951, "Quercus", Rank::Genus)).await;

    assert!(ctrl.has_children(plantae).await.unwrap());
    assert!(!ctrl.has_children(rosaceae).await.unwrap());
    assert_eq!(counters.children_calls(), 2);

    // terminal rank answers without the network
    assert!(!ctrl.has_children(quercus).await.unwrap());
    assert_eq!(counters.children_calls(), 2);

    // the probe answer is cached
    assert!(ctrl.has_children(plantae).await.unwrap());
    assert_eq!(counters.children_calls(), 2);

    // a false probe means a subsequent expand yields no children
    let outcome = ctrl.expand(rosaceae).await.unwrap();
    assert_eq!(outcome, ExpandOutcome::Children(Vec::new()));
}

#[tokio::test]
async fn test_one_failing_detail_fails_the_whole_expansion() {
    let source = plantae_source().with_failing_detail(35);
    let ctrl = controller(source);

    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;
    let err = ctrl.expand(root).await.unwrap_err();
    assert!(matches!(err, LifetreeError::Status { status: 500, .. }));

    // no partial success: the node is untouched
    let node = ctrl.node(root).await.unwrap();
    assert_eq!(node.state, NodeState::Unexplored);
    assert!(node.children.is_empty());
}

#[tokio::test]
async fn test_collapse_during_inflight_expansion_drops_stale_results() {
    let gate = Arc::new(Semaphore::new(0));
    let source = plantae_source().with_children_gate(gate.clone());
    let ctrl = controller(source);

    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;

    let (outcome, _) = tokio::join!(ctrl.expand(root), async {
        // let the expansion reach its children fetch, then collapse
        tokio::task::yield_now().await;
        ctrl.collapse(root).await.unwrap();
        gate.add_permits(1);
    });

    assert_eq!(outcome.unwrap(), ExpandOutcome::Stale);
    let node = ctrl.node(root).await.unwrap();
    assert_eq!(node.state, NodeState::Unexplored);
    assert!(node.children.is_empty());

    // a fresh expansion under the new generation succeeds
    gate.add_permits(1);
    let outcome = ctrl.expand(root).await.unwrap();
    assert!(matches!(outcome, ExpandOutcome::Children(ref c) if c.len() == 2));
}

#[tokio::test]
async fn test_concurrent_double_expand_is_first_writer_wins() {
    let gate = Arc::new(Semaphore::new(0));
    let source = plantae_source().with_children_gate(gate.clone());
    let ctrl = controller(source);

    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;

    let (first, second, _) = tokio::join!(ctrl.expand(root), ctrl.expand(root), async {
        tokio::task::yield_now().await;
        gate.add_permits(2);
    });

    let first = first.unwrap();
    let second = second.unwrap();
    assert!(matches!(first, ExpandOutcome::Children(ref c) if c.len() == 2));
    assert_eq!(second, ExpandOutcome::Stale);

    // no duplicated children from the losing expansion
    assert_eq!(ctrl.node(root).await.unwrap().children.len(), 2);
}

#[tokio::test]
async fn test_discover_roots_skips_unmatched_names() {
    let source = plantae_source();
    let counters = source.counters();
    let config = BrowseConfig::default()
        .with_root_names(vec!["Plantae".to_string(), "Nonexistentus".to_string()]);
    let ctrl = TreeController::new(source, config);

    let roots = ctrl.discover_roots().await.unwrap();

    assert_eq!(roots.len(), 1);
    assert_eq!(counters.match_calls(), 2);
    let node = ctrl.node(roots[0]).await.unwrap();
    assert_eq!(node.taxon.scientific_name, "Plantae");
    assert_eq!(node.depth, 0);
}

#[tokio::test]
async fn test_discover_roots_by_rank_uses_the_orders_first_rank() {
    let source = plantae_source().with_taxon(taxon(1, "Animalia", Rank::Kingdom));
    let ctrl = controller(source);
    assert_eq!(ctrl.config().rank_order.first(), Rank::Kingdom);

    let roots = ctrl.discover_roots_by_rank(20).await.unwrap();

    assert_eq!(roots.len(), 2);
    assert_eq!(ctrl.roots().await, roots);
    let names: Vec<String> = ctrl
        .taxa(&roots)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.scientific_name)
        .collect();
    assert_eq!(names, vec!["Animalia", "Plantae"]);
}

#[tokio::test]
async fn test_expand_to_depth_is_bounded() {
    let source = plantae_source()
        .with_taxon(taxon(300, "Polypodiopsida", Rank::Class))
        .with_children(
            13,
            vec![
                child(300, "Polypodiopsida", Rank::Class),
                child(301, "Rogue order", Rank::Order),
            ],
        );
    let counters = source.counters();
    let ctrl = controller(source);

    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;
    let expanded = ctrl.expand_to_depth(root, 2).await.unwrap();

    // root plus its two phyla
    assert_eq!(expanded, 3);
    // children queried for the root and both phyla, never for the classes
    assert_eq!(counters.children_calls(), 3);

    let rows = ctrl.visible().await;
    let labels: Vec<(usize, String)> = rows
        .iter()
        .map(|r| (r.depth, r.taxon.scientific_name.clone()))
        .collect();
    assert_eq!(
        labels,
        vec![
            (0, "Plantae".to_string()),
            (1, "Tracheophyta".to_string()),
            (2, "Polypodiopsida".to_string()),
            (1, "Bryophyta".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_visible_hides_collapsed_subtrees() {
    let ctrl = controller(plantae_source());
    let root = ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;

    ctrl.expand(root).await.unwrap();
    assert_eq!(ctrl.visible().await.len(), 3);

    ctrl.collapse(root).await.unwrap();
    let rows = ctrl.visible().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].taxon.scientific_name, "Plantae");
}

#[tokio::test]
async fn test_domain_rooted_order_changes_the_target_rank() {
    // under a domain-rooted order, a kingdom's children are phyla too,
    // but a domain node becomes expandable
    let source = MockSource::new()
        .with_taxon(taxon(1000, "Eukaryota", Rank::Domain))
        .with_taxon(taxon(6, "Plantae", Rank::Kingdom))
        .with_children(1000, vec![child(6, "Plantae", Rank::Kingdom)]);
    let config = BrowseConfig::default().with_rank_order(RankOrder::domain_rooted());
    let ctrl = TreeController::new(source, config);

    let root = ctrl.insert_root(taxon(1000, "Eukaryota", Rank::Domain)).await;
    let ExpandOutcome::Children(children) = ctrl.expand(root).await.unwrap() else {
        panic!("expected children");
    };
    assert_eq!(children.len(), 1);
}

#[tokio::test]
async fn test_unknown_node_is_an_error() {
    // ids are minted per controller; one from another controller's arena
    // that was never minted here is rejected
    let ctrl = controller(plantae_source());
    ctrl.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;

    let other = controller(plantae_source());
    other.insert_root(taxon(6, "Plantae", Rank::Kingdom)).await;
    let foreign = other.insert_root(taxon(2877951, "Quercus", Rank::Genus)).await;

    let err = ctrl.expand(foreign).await.unwrap_err();
    assert!(matches!(err, LifetreeError::UnknownNode(_)));
}
