//! Lifetree CLI - Main entry point

use clap::Parser;
use std::process;
use tracing::error;

use lifetree_cli::{commands, rank_order, Cli, Commands};
use lifetree_common::logging::{init_logging, LogConfig, LogLevel};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Environment configures format and filter; --verbose wins on level
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    } else if std::env::var("LIFETREE_LOG_LEVEL").is_err() {
        log_config.level = LogLevel::Warn;
    }

    // The CLI keeps working even if logging cannot be initialized
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> lifetree_cli::Result<()> {
    let order = rank_order(cli.with_domain);

    match cli.command {
        Commands::Match { name } => commands::match_name::run(&cli.api_url, name).await,

        Commands::Children { query, limit, sort } => {
            commands::children::run(&cli.api_url, order, &query, limit, sort).await
        }

        Commands::Tree { query, depth } => {
            commands::tree::run(&cli.api_url, order, &query, depth).await
        }

        Commands::Browse {
            names,
            probe,
            by_rank,
        } => commands::browse::run(&cli.api_url, order, names, probe, by_rank).await,

        Commands::Roots { rank, limit, sort } => {
            commands::roots::run(&cli.api_url, &rank, limit, sort).await
        }

        Commands::Richness {
            query,
            cell_size,
            max_records,
        } => commands::richness::run(&cli.api_url, &query, cell_size, max_records).await,
    }
}
