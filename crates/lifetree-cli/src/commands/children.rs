//! Children command: one level of next-rank children

use colored::Colorize;

use lifetree_browse::{BrowseConfig, ExpandOutcome, TreeController};
use lifetree_common::{RankOrder, Result};
use lifetree_gbif::GbifClient;

use crate::commands::resolve_taxon;
use crate::output;

/// Run the children command
pub async fn run(
    api_url: &str,
    order: RankOrder,
    query: &str,
    limit: u32,
    sort: bool,
) -> Result<()> {
    let client = GbifClient::new(api_url)?;
    let parent = resolve_taxon(&client, query).await?;

    let Some(target) = order.next_after(Some(parent.rank)) else {
        println!(
            "{} is terminal at rank {}; nothing below {} is browsed.",
            parent.scientific_name, parent.rank, order.last()
        );
        return Ok(());
    };

    let config = BrowseConfig::default()
        .with_rank_order(order)
        .with_child_limit(limit);
    let ctrl = TreeController::new(client, config);
    let root = ctrl.insert_root(parent.clone()).await;

    let ExpandOutcome::Children(ids) = ctrl.expand(root).await? else {
        return Ok(());
    };
    let mut taxa = ctrl.taxa(&ids).await?;
    if sort {
        taxa.sort_by(|a, b| a.scientific_name.cmp(&b.scientific_name));
    }

    if taxa.is_empty() {
        println!("No {} children found for {}.", target, parent.scientific_name);
        return Ok(());
    }

    println!("{} children of {}:", target, parent.scientific_name.bold());
    for taxon in &taxa {
        println!("{}", output::format_taxon(taxon));
    }
    Ok(())
}
