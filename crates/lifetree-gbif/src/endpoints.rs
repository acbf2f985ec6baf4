//! GBIF endpoint URL builders
//!
//! Helper functions to construct the REST URLs the client consumes.

use lifetree_common::{Rank, TaxonKey};

/// Build species detail URL
pub fn species_url(base_url: &str, key: TaxonKey) -> String {
    format!("{}/species/{}", base_url, key)
}

/// Build species children URL
pub fn children_url(base_url: &str, key: TaxonKey, limit: u32) -> String {
    format!("{}/species/{}/children?limit={}", base_url, key, limit)
}

/// Build fuzzy name match URL
pub fn match_url(base_url: &str, name: &str) -> String {
    format!("{}/species/match?name={}", base_url, urlencoding::encode(name))
}

/// Build rank-filtered species search URL
pub fn search_url(base_url: &str, rank: Rank, limit: u32) -> String {
    format!("{}/species/search?rank={}&limit={}", base_url, rank, limit)
}

/// Build occurrence search URL (coordinate-bearing records only)
pub fn occurrence_search_url(base_url: &str, key: TaxonKey, limit: u32, offset: usize) -> String {
    format!(
        "{}/occurrence/search?taxonKey={}&hasCoordinate=true&limit={}&offset={}",
        base_url, key, limit, offset
    )
}
