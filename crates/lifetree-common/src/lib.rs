//! Lifetree Common Library
//!
//! Shared types, error handling, and logging for the lifetree workspace.
//!
//! # Overview
//!
//! This crate provides the pieces every other workspace member needs:
//!
//! - **Error Handling**: the [`LifetreeError`] enum and [`Result`] alias
//! - **Types**: the taxonomic domain model ([`Taxon`], [`Rank`], [`RankOrder`])
//! - **Logging**: `tracing` subscriber initialization

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{LifetreeError, Result};
pub use types::{Rank, RankOrder, Taxon, TaxonKey};
