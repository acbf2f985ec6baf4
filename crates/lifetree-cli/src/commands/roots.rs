//! Roots command: list taxa of a rank via the search endpoint

use lifetree_common::{Rank, Result};
use lifetree_gbif::{GbifClient, TaxonSource};

use crate::output;

/// Run the roots command
pub async fn run(api_url: &str, rank: &str, limit: u32, sort: bool) -> Result<()> {
    let rank: Rank = rank.parse()?;
    let client = GbifClient::new(api_url)?;

    let mut taxa = client.search_by_rank(rank, limit).await?;
    if sort {
        taxa.sort_by(|a, b| a.scientific_name.cmp(&b.scientific_name));
    }

    if taxa.is_empty() {
        println!("No {} taxa found.", rank);
        return Ok(());
    }

    for taxon in &taxa {
        println!("{}", output::format_taxon(taxon));
    }
    Ok(())
}
