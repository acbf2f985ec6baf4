//! Lifetree GBIF Client
//!
//! Typed async client for the GBIF species and occurrence REST endpoints.
//! Pure request/response mapping, no state: every operation is one HTTP
//! round-trip whose outcome propagates directly to the caller.
//!
//! The [`TaxonSource`] trait is the seam the tree model consumes; the
//! concrete [`GbifClient`] implements it over `reqwest`.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{GbifClient, TaxonSource, DEFAULT_API_URL};
pub use types::{ChildRecord, NameMatch, OccurrenceRecord, Paged, SpeciesDetail};
