use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subtrack_core::{stats::CategoryFilter, AppConfig, Period};

mod commands;

#[derive(Parser)]
#[command(name = "subtrack")]
#[command(author, version, about = "Track subscriptions and what they cost")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run,
    /// Print spending for a period
    Stats {
        /// week, month, quarter or year
        #[arg(short = 'p', long, default_value_t = Period::Month)]
        period: Period,
        /// Category id, or "all"
        #[arg(short = 'c', long, default_value_t = CategoryFilter::All)]
        category: CategoryFilter,
        /// Group by category instead of by subscription
        #[arg(long)]
        by_category: bool,
    },
    /// Show the configuration file
    Config {
        /// Write the default configuration if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let is_tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, is_tui)?;

    // Handle commands
    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Stats {
            period,
            category,
            by_category,
        }) => commands::stats::run(&config, period, category, by_category).await,
        Some(Commands::Config { init }) => commands::config::run(&config, init),
    }
}

/// Initialize logging
///
/// The TUI owns the terminal, so while it runs logs go to a file in the data
/// directory. `RUST_LOG` overrides the configured level.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}
