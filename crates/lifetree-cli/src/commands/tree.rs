//! Tree command: eager depth-limited expansion

use tracing::debug;

use lifetree_browse::{BrowseConfig, TreeController};
use lifetree_common::{RankOrder, Result};
use lifetree_gbif::GbifClient;

use crate::commands::resolve_taxon;
use crate::output;

/// Run the tree command
pub async fn run(api_url: &str, order: RankOrder, query: &str, depth: usize) -> Result<()> {
    let client = GbifClient::new(api_url)?;
    let root_taxon = resolve_taxon(&client, query).await?;

    let config = BrowseConfig::default().with_rank_order(order);
    let ctrl = TreeController::new(client, config);
    let root = ctrl.insert_root(root_taxon).await;

    let expanded = ctrl.expand_to_depth(root, depth).await?;
    debug!(expanded, depth, "eager walk complete");

    let rows = ctrl.visible().await;
    output::print_rows(&rows, false);
    Ok(())
}
