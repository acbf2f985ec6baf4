//! Taxonomic domain model
//!
//! The types every crate in the workspace shares: opaque taxon keys, the
//! GBIF rank vocabulary, the injected rank ordering, and the immutable
//! [`Taxon`] record itself.

use serde::{Deserialize, Serialize};

use crate::error::{LifetreeError, Result};

/// Opaque GBIF backbone identifier for a taxon
///
/// Externally assigned; identity of a [`Taxon`] is its key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaxonKey(pub i64);

impl std::fmt::Display for TaxonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Taxonomic rank, totally ordered coarse-to-fine
///
/// Serde maps GBIF's SCREAMING_CASE strings; anything outside the browsed
/// vocabulary (subspecies, varieties, unranked placeholders) lands on
/// [`Rank::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rank {
    Domain,
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
    #[serde(other)]
    #[default]
    Other,
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rank::Domain => "DOMAIN",
            Rank::Kingdom => "KINGDOM",
            Rank::Phylum => "PHYLUM",
            Rank::Class => "CLASS",
            Rank::Order => "ORDER",
            Rank::Family => "FAMILY",
            Rank::Genus => "GENUS",
            Rank::Species => "SPECIES",
            Rank::Other => "OTHER",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Rank {
    type Err = LifetreeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DOMAIN" => Ok(Rank::Domain),
            "KINGDOM" => Ok(Rank::Kingdom),
            "PHYLUM" => Ok(Rank::Phylum),
            "CLASS" => Ok(Rank::Class),
            "ORDER" => Ok(Rank::Order),
            "FAMILY" => Ok(Rank::Family),
            "GENUS" => Ok(Rank::Genus),
            "SPECIES" => Ok(Rank::Species),
            _ => Err(LifetreeError::config(format!("invalid rank: {}", s))),
        }
    }
}

/// The fixed rank ordering that defines "one level below"
///
/// Injected configuration, never a literal at a use site: whether the tree
/// is rooted at kingdom or domain level is decided by whoever constructs
/// the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOrder {
    ranks: Vec<Rank>,
}

impl RankOrder {
    /// Create a rank order from an explicit sequence
    ///
    /// The sequence must be non-empty, free of duplicates, and must not
    /// contain [`Rank::Other`].
    pub fn new(ranks: Vec<Rank>) -> Result<Self> {
        if ranks.is_empty() {
            return Err(LifetreeError::config("rank order cannot be empty"));
        }
        for (i, rank) in ranks.iter().enumerate() {
            if *rank == Rank::Other {
                return Err(LifetreeError::config("rank order cannot contain OTHER"));
            }
            if ranks[..i].contains(rank) {
                return Err(LifetreeError::config(format!(
                    "duplicate rank in order: {}",
                    rank
                )));
            }
        }
        Ok(Self { ranks })
    }

    /// The standard order rooted at kingdom level
    pub fn kingdom_rooted() -> Self {
        Self {
            ranks: vec![
                Rank::Kingdom,
                Rank::Phylum,
                Rank::Class,
                Rank::Order,
                Rank::Family,
                Rank::Genus,
            ],
        }
    }

    /// Alternative order with a domain level above the kingdoms
    pub fn domain_rooted() -> Self {
        Self {
            ranks: vec![
                Rank::Domain,
                Rank::Kingdom,
                Rank::Phylum,
                Rank::Class,
                Rank::Order,
                Rank::Family,
                Rank::Genus,
            ],
        }
    }

    /// The coarsest rank: what children of the virtual root get
    pub fn first(&self) -> Rank {
        self.ranks[0]
    }

    /// The finest rank: nodes at this rank are terminal
    pub fn last(&self) -> Rank {
        self.ranks[self.ranks.len() - 1]
    }

    /// The ranks in order, coarse to fine
    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// The rank immediately below `parent` in this order
    ///
    /// `None` as input is the ROOT sentinel: before any taxonomic level,
    /// so the answer is the first rank. Returns `None` for the last rank
    /// and for any rank that is not part of the order; such nodes are
    /// terminal and must report zero children without a network call.
    pub fn next_after(&self, parent: Option<Rank>) -> Option<Rank> {
        match parent {
            None => Some(self.first()),
            Some(rank) => {
                let idx = self.ranks.iter().position(|r| *r == rank)?;
                self.ranks.get(idx + 1).copied()
            }
        }
    }
}

impl Default for RankOrder {
    fn default() -> Self {
        Self::kingdom_rooted()
    }
}

/// A named biological classification unit
///
/// Immutable once fetched; lives for the duration of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxon {
    /// GBIF backbone key
    pub key: TaxonKey,
    /// Scientific name (e.g., "Plantae")
    pub scientific_name: String,
    /// Vernacular name (e.g., "plants"), when the backbone has one
    pub common_name: Option<String>,
    /// Taxonomic rank
    pub rank: Rank,
}

impl Taxon {
    /// Create a new Taxon
    pub fn new(
        key: TaxonKey,
        scientific_name: impl Into<String>,
        common_name: Option<String>,
        rank: Rank,
    ) -> Self {
        Self {
            key,
            scientific_name: scientific_name.into(),
            common_name,
            rank,
        }
    }

    /// Display label: scientific name plus the common name when known
    pub fn display_label(&self) -> String {
        match &self.common_name {
            Some(common) => format!("{} ({})", self.scientific_name, common),
            None => self.scientific_name.clone(),
        }
    }
}
