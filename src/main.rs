//! graphstat CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "graphstat")]
#[command(about = "Structural statistics for undirected node/link graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./graphstat.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every metric as JSON
    Stats {
        /// Graph document ({nodes, links})
        file: PathBuf,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },
    /// List connected components
    Components {
        file: PathBuf,
    },
    /// Hop counts from one node to every other
    Paths {
        file: PathBuf,

        /// Source node id
        #[arg(short, long)]
        source: String,
    },
    /// Extract the largest connected component as a graph document
    Largest {
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recompute stats whenever the document changes
    Watch {
        file: PathBuf,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "graphstat={0},graphstat_core={0},graphstat_watcher={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = graphstat_core::Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Commands::Stats { file, pretty } => commands::stats(&file, &config, pretty).await,
        Commands::Components { file } => commands::components(&file, &config).await,
        Commands::Paths { file, source } => commands::paths(&file, &config, source).await,
        Commands::Largest { file, output } => {
            commands::largest(&file, &config, output.as_deref()).await
        }
        Commands::Watch { file } => commands::watch(file, config).await,
        Commands::Version => {
            println!("graphstat v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
