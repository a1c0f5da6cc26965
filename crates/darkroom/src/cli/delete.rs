//! The `darkroom delete` command: idempotent artifact removal.
//!
//! Each artifact is removed together with its thumbnail sibling; names that
//! are already absent count as deleted.

use clap::Args;
use darkroom_core::{Config, Darkroom};

/// Arguments for the `delete` command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Artifact names to remove
    #[arg(required = true)]
    pub artifacts: Vec<String>,
}

/// Execute the delete command.
pub fn execute(args: DeleteArgs, config: Config) -> anyhow::Result<()> {
    let darkroom = Darkroom::new(config)?;

    let mut failed = 0usize;
    for artifact in &args.artifacts {
        if darkroom.delete(artifact) {
            println!("deleted {artifact}");
        } else {
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} deletion(s) failed", args.artifacts.len());
    }
    Ok(())
}
