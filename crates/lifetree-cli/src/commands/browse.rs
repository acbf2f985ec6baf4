//! Browse command: interactive expand/collapse loop
//!
//! Renders the visible tree with 1-based row numbers and dispatches
//! `expand N` / `collapse N` / `toggle N` lines from stdin as tree events.
//! An expansion failure leaves the node as it was and browsing continues.

use std::io::{self, BufRead, Write};

use lifetree_browse::{BrowseConfig, NodeState, TreeController, TreeEvent, TreeRow};
use lifetree_common::{RankOrder, Result};
use lifetree_gbif::GbifClient;

use crate::output;

/// Number of root taxa pulled in by a rank-search discovery
const ROOT_SEARCH_LIMIT: u32 = 20;

/// Run the browse command
pub async fn run(
    api_url: &str,
    order: RankOrder,
    names: Vec<String>,
    probe: bool,
    by_rank: bool,
) -> Result<()> {
    let client = GbifClient::new(api_url)?;

    let mut config = BrowseConfig::from_env()?.with_rank_order(order);
    if !names.is_empty() {
        config = config.with_root_names(names);
    }
    let ctrl = TreeController::new(client, config);

    let roots = if by_rank {
        ctrl.discover_roots_by_rank(ROOT_SEARCH_LIMIT).await?
    } else {
        ctrl.discover_roots().await?
    };
    if roots.is_empty() {
        println!("No roots could be resolved.");
        return Ok(());
    }

    println!("Commands: expand N, collapse N, toggle N, quit (shortcuts: e/c/t/q)");
    let mut rows = render(&ctrl, probe).await?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => {
                rows = render(&ctrl, probe).await?;
            }
            ["quit"] | ["q"] | ["exit"] => break,
            ["help"] | ["?"] => {
                println!("Commands: expand N, collapse N, toggle N, quit");
            }
            [verb, number] => {
                let Ok(n) = number.parse::<usize>() else {
                    println!("Not a row number: {}", number);
                    continue;
                };
                let Some(row) = n.checked_sub(1).and_then(|i| rows.get(i)) else {
                    println!("No such row: {}", n);
                    continue;
                };
                let event = match *verb {
                    "expand" | "e" => TreeEvent::Expand(row.id),
                    "collapse" | "c" => TreeEvent::Collapse(row.id),
                    "toggle" | "t" => TreeEvent::Toggle(row.id),
                    other => {
                        println!("Unknown command: {}", other);
                        continue;
                    }
                };

                if let Err(err) = ctrl.handle(event).await {
                    println!("Error: {}", err);
                }
                rows = render(&ctrl, probe).await?;
            }
            _ => {
                println!("Unknown command: {}", line.trim());
            }
        }
    }

    Ok(())
}

/// Print the visible tree and return its rows for row-number dispatch
async fn render(ctrl: &TreeController<GbifClient>, probe: bool) -> Result<Vec<TreeRow>> {
    if probe {
        // resolve the affordance of every fresh node before rendering
        for row in ctrl.visible().await {
            if row.state == NodeState::Unexplored && row.has_known_children.is_none() {
                ctrl.has_children(row.id).await?;
            }
        }
    }

    let rows = ctrl.visible().await;
    output::print_rows(&rows, true);
    Ok(rows)
}
