//! Match command: resolve a free-text name against the backbone

use lifetree_common::{LifetreeError, Result};
use lifetree_gbif::{GbifClient, TaxonSource};

use crate::output;

/// Run the match command
pub async fn run(api_url: &str, name: Vec<String>) -> Result<()> {
    let name = name.join(" ");
    if name.trim().is_empty() {
        return Err(LifetreeError::config("name cannot be empty"));
    }

    let client = GbifClient::new(api_url)?;
    let matched = client.match_taxon_by_name(&name).await?;
    // the match response carries no vernacular name
    let taxon = client.fetch_taxon(matched.key).await?;

    output::print_taxon_detail(&taxon);
    Ok(())
}
