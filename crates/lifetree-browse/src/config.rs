//! Browse configuration

use lifetree_common::{LifetreeError, RankOrder, Result};

/// Root taxa browsed when no explicit names are given
pub const DEFAULT_ROOT_NAMES: [&str; 6] = [
    "Animalia",
    "Plantae",
    "Fungi",
    "Bacteria",
    "Protozoa",
    "Chromista",
];

/// Default `limit` passed to the children endpoint.
/// The API caps actual results independently of the requested limit.
pub const DEFAULT_CHILD_LIMIT: u32 = 1000;

/// Default number of concurrent child-detail fetches per expansion
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 8;

/// Configuration for the tree controller
#[derive(Debug, Clone)]
pub struct BrowseConfig {
    /// The injected rank ordering that defines "one level below"
    pub rank_order: RankOrder,
    /// Scientific names resolved into root nodes by `discover_roots`
    pub root_names: Vec<String>,
    /// `limit` for children queries (also used by the affordance probe)
    pub child_limit: u32,
    /// Bound on the child-detail fan-out during one expansion
    pub detail_concurrency: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            rank_order: RankOrder::default(),
            root_names: DEFAULT_ROOT_NAMES.iter().map(|s| s.to_string()).collect(),
            child_limit: DEFAULT_CHILD_LIMIT,
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
        }
    }
}

impl BrowseConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// - `LIFETREE_CHILD_LIMIT`: children query limit
    /// - `LIFETREE_DETAIL_CONCURRENCY`: detail fan-out bound
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(limit) = std::env::var("LIFETREE_CHILD_LIMIT") {
            config.child_limit = limit
                .parse()
                .map_err(|_| LifetreeError::config(format!("invalid child limit: {}", limit)))?;
        }

        if let Ok(concurrency) = std::env::var("LIFETREE_DETAIL_CONCURRENCY") {
            config.detail_concurrency = concurrency.parse().map_err(|_| {
                LifetreeError::config(format!("invalid detail concurrency: {}", concurrency))
            })?;
        }

        Ok(config)
    }

    /// Set the rank order
    pub fn with_rank_order(mut self, order: RankOrder) -> Self {
        self.rank_order = order;
        self
    }

    /// Set the root names
    pub fn with_root_names(mut self, names: Vec<String>) -> Self {
        self.root_names = names;
        self
    }

    /// Set the children query limit
    pub fn with_child_limit(mut self, limit: u32) -> Self {
        self.child_limit = limit;
        self
    }

    /// Set the detail fan-out bound
    pub fn with_detail_concurrency(mut self, concurrency: usize) -> Self {
        self.detail_concurrency = concurrency;
        self
    }
}
