//! Threadloom Control - CLI client for the Threadloom daemon.
//!
//! Submits generation requests, prints the resulting calendar, and
//! exports the two-section CSV sheet.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_SERVER: &str = "http://127.0.0.1:7910";

#[derive(Parser)]
#[command(name = "threadloomctl")]
#[command(about = "Threadloom - simulated content calendar generator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a weekly calendar from a request file
    Generate {
        /// Path to a JSON generation request
        #[arg(long)]
        request: PathBuf,

        /// Daemon base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,

        /// Write the two-section CSV export here
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Show daemon health
    Health {
        /// Daemon base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            request,
            server,
            export,
        } => commands::generate(&request, &server, export.as_deref()).await,
        Commands::Health { server } => commands::health(&server).await,
    }
}
