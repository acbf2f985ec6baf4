//! Command implementations

pub mod browse;
pub mod children;
pub mod match_name;
pub mod richness;
pub mod roots;
pub mod tree;

use lifetree_common::{Result, Taxon, TaxonKey};
use lifetree_gbif::{GbifClient, TaxonSource};

/// Resolve a numeric key or a scientific name to a full taxon record
pub(crate) async fn resolve_taxon(client: &GbifClient, query: &str) -> Result<Taxon> {
    if let Ok(raw) = query.parse::<i64>() {
        client.fetch_taxon(TaxonKey(raw)).await
    } else {
        let matched = client.match_taxon_by_name(query).await?;
        client.fetch_taxon(matched.key).await
    }
}
