//! Darkroom CLI - upload image ingestion pipeline.
//!
//! Darkroom takes uploaded image files and turns them into stored artifacts:
//! rotated upright, flattened to an opaque color mode, width-clamped, and
//! re-encoded under collision-resistant names. Thumbnails are derived
//! separately, and deletion removes an artifact together with its sibling.
//!
//! # Usage
//!
//! ```bash
//! # Ingest a single upload
//! darkroom ingest photo.jpg
//!
//! # Ingest a directory, deriving thumbnails as well
//! darkroom ingest ./incoming/ --thumbnail
//!
//! # Derive a thumbnail later
//! darkroom thumbnail 3f2a...9c.jpg
//!
//! # Remove an artifact and its thumbnail
//! darkroom delete 3f2a...9c.jpg
//!
//! # View configuration
//! darkroom config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Darkroom - upload image ingestion pipeline.
#[derive(Parser, Debug)]
#[command(name = "darkroom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run uploads through the pipeline into the artifact store
    Ingest(cli::ingest::IngestArgs),

    /// Derive thumbnails for stored artifacts
    Thumbnail(cli::thumbnail::ThumbnailArgs),

    /// Remove artifacts (and their thumbnails) from the store
    Delete(cli::delete::DeleteArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match darkroom_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `darkroom config path`."
            );
            darkroom_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("darkroom v{}", darkroom_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Ingest(args) => cli::ingest::execute(args, config),
        Commands::Thumbnail(args) => cli::thumbnail::execute(args, config),
        Commands::Delete(args) => cli::delete::execute(args, config),
        Commands::Config(args) => cli::config::execute(args),
    }
}
