//! CropSight - crop diagnosis from the command line
//!
//! # Usage
//!
//! ```bash
//! # Diagnose one or more leaf photos
//! cropsight diagnose leaf1.jpg leaf2.jpg --context "spots appeared after rain"
//!
//! # Ask a question (remote generation, local responder when unavailable)
//! cropsight chat "how often should I water tomatoes?"
//!
//! # Transcribe a voice note
//! cropsight transcribe note.mp3
//!
//! # Print the effective configuration
//! cropsight show-config
//! ```
//!
//! # Environment Variables
//!
//! - `CROPSIGHT_CONFIG`: Path to a TOML config (default: ./cropsight.toml)
//! - `HF_API_TOKEN`: Inference API token (name configurable via `inference.api_token_env`)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use cropsight::{AdvisorConfig, Asset, Orchestrator};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "cropsight")]
#[command(about = "Crop disease diagnosis and farming advice")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides CROPSIGHT_CONFIG and ./cropsight.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the response as JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Diagnose crop images and print the advisory narrative
    Diagnose {
        /// Image files, in the order they should be reported
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Free-text description of what the farmer observed
        #[arg(long, default_value = "")]
        context: String,
    },

    /// Ask a farming question, optionally attaching images
    Chat {
        /// The question or message
        message: String,
        /// Attach an image (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    /// Transcribe a voice recording
    Transcribe {
        /// Audio file (mp3, wav, ogg, webm, ...)
        audio: PathBuf,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize logging (stderr, so stdout carries only the response)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &args.config {
        Some(path) => AdvisorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AdvisorConfig::load(),
    };
    config.validate().context("Invalid configuration")?;

    if let SubCommand::ShowConfig = args.command {
        print!("{}", config.to_toml().context("Failed to render config")?);
        return Ok(());
    }

    let orchestrator =
        Orchestrator::from_config(&config).context("Failed to initialize orchestrator")?;

    match args.command {
        SubCommand::Diagnose { images, context } => {
            let assets: Vec<Asset> = images.into_iter().map(Asset::from_path).collect();
            let response = orchestrator
                .diagnose(&assets, &context)
                .await
                .context("Diagnosis failed")?;
            emit(args.json, &response, &response.narrative)?;
        }
        SubCommand::Chat { message, images } => {
            let assets: Vec<Asset> = images.into_iter().map(Asset::from_path).collect();
            let response = orchestrator
                .chat(&message, &assets)
                .await
                .context("Chat failed")?;
            emit(args.json, &response, &response.narrative)?;
        }
        SubCommand::Transcribe { audio } => {
            let response = orchestrator
                .transcribe(&Asset::from_path(audio))
                .await
                .context("Transcription failed")?;
            emit(args.json, &response, &response.text)?;
        }
        SubCommand::ShowConfig => {}
    }

    info!("{}", orchestrator.stats().await);
    Ok(())
}

/// Print either the full response as JSON or just its text.
fn emit<T: Serialize>(json: bool, response: &T, text: &str) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(response).context("Failed to serialize response")?;
        println!("{rendered}");
    } else {
        println!("{text}");
    }
    Ok(())
}
