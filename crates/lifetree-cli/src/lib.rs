//! Lifetree CLI Library
//!
//! Terminal view binding for the lazy taxonomic tree:
//!
//! - **Name resolution**: resolve a scientific name (`lifetree match`)
//! - **One-level listing**: next-rank children of a taxon (`lifetree children`)
//! - **Eager walk**: expand a subtree a few levels deep (`lifetree tree`)
//! - **Interactive browsing**: expand/collapse by row number (`lifetree browse`)
//! - **Root discovery**: list taxa of the root rank (`lifetree roots`)
//! - **Richness**: occurrence-based species richness grid (`lifetree richness`)

pub mod commands;
pub mod output;

// Re-export commonly used types
pub use lifetree_common::{LifetreeError, Result};

use clap::{Parser, Subcommand};

use lifetree_browse::config::DEFAULT_CHILD_LIMIT;
use lifetree_browse::richness::DEFAULT_MAX_RECORDS;
use lifetree_common::RankOrder;
use lifetree_gbif::DEFAULT_API_URL;

/// lifetree - lazy taxonomic tree browser over the GBIF backbone
#[derive(Parser, Debug)]
#[command(name = "lifetree")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// GBIF API base URL
    #[arg(long, env = "LIFETREE_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Browse with a domain level above the kingdoms
    #[arg(long, global = true)]
    pub with_domain: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a scientific name against the backbone
    Match {
        /// Name to resolve (multiple words are joined)
        name: Vec<String>,
    },

    /// List a taxon's next-rank children
    Children {
        /// Scientific name or numeric taxon key
        query: String,

        /// Children query limit
        #[arg(short, long, default_value_t = DEFAULT_CHILD_LIMIT)]
        limit: u32,

        /// Sort the listing by scientific name
        #[arg(long)]
        sort: bool,
    },

    /// Expand a taxon several levels deep and print the subtree
    Tree {
        /// Scientific name or numeric taxon key
        query: String,

        /// Levels to expand below the root
        #[arg(short, long, default_value_t = 2)]
        depth: usize,
    },

    /// Browse the tree interactively
    Browse {
        /// Root taxa (defaults to the six major kingdoms)
        names: Vec<String>,

        /// Probe expandability of visible nodes before each render
        #[arg(long)]
        probe: bool,

        /// Discover roots by searching the order's first rank instead of
        /// matching names
        #[arg(long, conflicts_with = "names")]
        by_rank: bool,
    },

    /// List root-level taxa of a rank
    Roots {
        /// Rank to search (KINGDOM, PHYLUM, ...)
        #[arg(short, long, default_value = "KINGDOM")]
        rank: String,

        /// Number of taxa to list
        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Sort the listing by scientific name
        #[arg(long)]
        sort: bool,
    },

    /// Summarize species richness from occurrence records
    Richness {
        /// Scientific name or numeric taxon key
        query: String,

        /// Grid cell size in degrees
        #[arg(long, default_value_t = 1.0)]
        cell_size: f64,

        /// Cap on fetched occurrence records
        #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
        max_records: usize,
    },
}

/// The rank order selected by the global flags
pub fn rank_order(with_domain: bool) -> RankOrder {
    if with_domain {
        RankOrder::domain_rooted()
    } else {
        RankOrder::kingdom_rooted()
    }
}
