//! Richness command: occurrence-based species richness grid

use colored::Colorize;

use lifetree_browse::richness::occurrence_richness;
use lifetree_common::Result;
use lifetree_gbif::GbifClient;

use crate::commands::resolve_taxon;

/// Run the richness command
pub async fn run(api_url: &str, query: &str, cell_size: f64, max_records: usize) -> Result<()> {
    let client = GbifClient::new(api_url)?;
    let taxon = resolve_taxon(&client, query).await?;

    println!("Fetching occurrences for {}...", taxon.display_label().bold());
    let summary = occurrence_richness(&client, taxon.key, cell_size, max_records).await?;

    if summary.cells.is_empty() {
        println!("No located occurrence records found.");
        return Ok(());
    }

    println!(
        "{} records, {} with coordinates, {} occupied cells:",
        summary.total_records,
        summary.located_records,
        summary.cells.len()
    );
    println!("{:>9} {:>9} {:>9}  species", "lat", "lon", "richness");
    for cell in &summary.cells {
        let mut species = cell.species.join(", ");
        if species.chars().count() > 60 {
            species = species.chars().take(60).collect::<String>() + "…";
        }
        println!(
            "{:>9.2} {:>9.2} {:>9}  {}",
            cell.lat, cell.lon, cell.richness, species
        );
    }
    Ok(())
}
