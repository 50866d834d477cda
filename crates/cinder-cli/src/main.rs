//! Cinder CLI - headless companion to the Cinder player
//!
//! Features:
//! - Stream URL resolution for the upload service
//! - Quality catalog inspection from a live master playlist
//! - Scripted replay of player sessions against headless collaborators

use anyhow::Context;
use clap::{Parser, Subcommand};
use cinder_core::PlayerConfig;
use std::path::PathBuf;

mod commands;
mod output;

use output::OutputFormat;

/// Cinder CLI - playback coordinator toolkit
#[derive(Parser)]
#[command(name = "cinder-cli")]
#[command(version)]
#[command(about = "Inspect streams and replay player sessions headlessly", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Upload service base URL
    #[arg(short, long)]
    base_url: Option<String>,

    /// Player configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the master playlist URL of a video
    Url {
        /// Video identifier
        video_id: String,
    },

    /// Fetch a video's master playlist and list its qualities
    Catalog {
        /// Video identifier
        video_id: String,
    },

    /// Replay a scripted session and print the view after each step
    Replay {
        /// Script file (JSON)
        script: PathBuf,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<PlayerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => PlayerConfig::default(),
    };
    if let Some(base) = &cli.base_url {
        config = config.with_stream_base(base)?;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();
    cinder_core::init();

    let config = load_config(&cli)?;
    let format = OutputFormat::from(cli.format.as_str());

    match &cli.command {
        Commands::Url { video_id } => {
            commands::url(&config, video_id, format)?;
        }
        Commands::Catalog { video_id } => {
            commands::catalog(&config, video_id, format).await?;
        }
        Commands::Replay { script } => {
            commands::replay(config, script, format).await?;
        }
    }

    Ok(())
}
