mod config;
mod dates;
mod repl;
mod views;

use clap::Parser;
use config::CliConfig;
use paperlot_core::{PaperlotError, Storage};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "paperlot")]
#[command(about = "Paper game ticket tracker for small lottery operators")]
#[command(version)]
struct Cli {
    /// Data directory for the ticket database
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let defaults = CliConfig::default();

    // Initialize logging
    let log_level = if cli.verbose || defaults.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "paperlot_core={0},paperlot_cli={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = cli.data_dir.unwrap_or(defaults.data_dir);

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    let storage = Storage::new(&data_dir.join("game.db")).await?;

    if let Err(e) = repl::run(&storage).await {
        match e {
            PaperlotError::Dialog(msg) => {
                eprintln!("Error: prompt failed: {}", msg);
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
