//! Terminal output helpers

use colored::Colorize;

use lifetree_browse::{NodeState, TreeRow};
use lifetree_common::Taxon;

/// Expand/collapse affordance marker for one row
///
/// `-` expanded, `+` expandable (collapsed, or probed and non-empty),
/// `.` known leaf, `?` unexplored without a probe answer.
pub fn state_marker(state: NodeState, has_known_children: Option<bool>) -> &'static str {
    match (state, has_known_children) {
        (NodeState::Expanded, _) => "-",
        (NodeState::Collapsed, _) => "+",
        (NodeState::Unexplored, Some(true)) => "+",
        (NodeState::Unexplored, Some(false)) => ".",
        (NodeState::Unexplored, None) => "?",
    }
}

/// One-line rendering of a taxon
pub fn format_taxon(taxon: &Taxon) -> String {
    format!(
        "{:>10}  {} [{}]",
        taxon.key,
        taxon.display_label().bold(),
        taxon.rank.to_string().cyan()
    )
}

/// Multi-line detail rendering of a taxon
pub fn print_taxon_detail(taxon: &Taxon) {
    println!("key:    {}", taxon.key);
    println!("name:   {}", taxon.scientific_name.bold());
    println!("common: {}", taxon.common_name.as_deref().unwrap_or("-"));
    println!("rank:   {}", taxon.rank.to_string().cyan());
}

/// Print visible tree rows, indented by depth
///
/// With `numbered`, rows get 1-based indices the interactive commands
/// refer to.
pub fn print_rows(rows: &[TreeRow], numbered: bool) {
    for (index, row) in rows.iter().enumerate() {
        let indent = "  ".repeat(row.depth);
        let marker = state_marker(row.state, row.has_known_children);
        let label = format!(
            "{}{} {} [{}]",
            indent,
            marker,
            row.taxon.display_label().bold(),
            row.taxon.rank.to_string().cyan()
        );
        if numbered {
            println!("{:>3}. {}", index + 1, label);
        } else {
            println!("{}", label);
        }
    }
}
