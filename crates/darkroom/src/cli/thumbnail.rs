//! The `darkroom thumbnail` command: derive thumbnails for stored artifacts.
//!
//! Runs independently of ingestion, against artifacts already in the store.

use clap::Args;
use darkroom_core::{Config, Darkroom};

/// Arguments for the `thumbnail` command.
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Artifact names to derive thumbnails for
    #[arg(required = true)]
    pub artifacts: Vec<String>,

    /// Bounding box width override
    #[arg(long)]
    pub width: Option<u32>,

    /// Bounding box height override
    #[arg(long)]
    pub height: Option<u32>,
}

/// Execute the thumbnail command.
pub fn execute(args: ThumbnailArgs, config: Config) -> anyhow::Result<()> {
    let darkroom = Darkroom::new(config)?;

    let mut bounds = darkroom.thumbnail_bounds();
    if let Some(width) = args.width {
        bounds.max_width = width;
    }
    if let Some(height) = args.height {
        bounds.max_height = height;
    }

    let mut failed = 0usize;
    for artifact in &args.artifacts {
        match darkroom.derive_thumbnail(artifact, bounds) {
            Ok(thumb) => println!("{thumb}"),
            Err(e) => {
                tracing::error!(artifact = %artifact, error = %e, "thumbnail derivation failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} derivation(s) failed", args.artifacts.len());
    }
    Ok(())
}
