//! The `darkroom ingest` command: run uploads through the pipeline.
//!
//! The command owns the caller-side half of the contract: it expands
//! directories, filters by allowed extension, enforces the byte-size limit
//! *before* invoking the pipeline, and treats a multi-file submission as
//! partial-success: a failed file is logged and skipped, the rest proceed.

use anyhow::Context;
use clap::Args;
use darkroom_core::{Config, Darkroom, IngestStats, StoredImage};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Arguments for the `ingest` command.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Image files or directories to ingest
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Store directory (defaults to the configured upload dir)
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Also derive a thumbnail for each stored artifact
    #[arg(long)]
    pub thumbnail: bool,

    /// Emit one JSON record per stored artifact instead of plain names
    #[arg(long)]
    pub json: bool,
}

/// One line of ingest output.
#[derive(Debug, Serialize)]
struct IngestRecord {
    /// Source file the upload came from
    source: PathBuf,

    #[serde(flatten)]
    stored: StoredImage,

    /// Thumbnail sibling, when `--thumbnail` was given
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
}

/// Execute the ingest command.
pub fn execute(args: IngestArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(dir) = args.store_dir {
        config.store.upload_dir = dir;
    }
    let darkroom = Darkroom::new(config)?;

    let files = discover(&args.inputs, &darkroom.config().upload.allowed_extensions);
    if files.is_empty() {
        anyhow::bail!(
            "no ingestible files found (allowed: {})",
            darkroom.config().upload.allowed_display()
        );
    }

    let progress = (files.len() > 1 && !args.json).then(|| {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .expect("static progress template"),
        );
        bar
    });

    let mut stats = IngestStats::default();
    for path in &files {
        if let Some(bar) = &progress {
            bar.set_message(path.display().to_string());
        }

        match ingest_one(&darkroom, path, args.thumbnail) {
            Ok(Some(record)) => {
                stats.succeeded += 1;
                if args.json {
                    println!("{}", serde_json::to_string(&record)?);
                } else if let Some(bar) = &progress {
                    bar.println(format!("{} -> {}", path.display(), record.stored.artifact));
                } else {
                    println!("{}", record.stored.artifact);
                }
            }
            Ok(None) => stats.skipped += 1,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "upload skipped");
                stats.failed += 1;
            }
        }

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    eprintln!(
        "Ingested {} of {} file(s) ({} failed, {} skipped)",
        stats.succeeded,
        files.len(),
        stats.failed,
        stats.skipped
    );
    if stats.succeeded == 0 {
        anyhow::bail!("no uploads were ingested");
    }
    Ok(())
}

/// Ingest a single file. `Ok(None)` means it was skipped before the
/// pipeline ran (over the configured size limit).
fn ingest_one(
    darkroom: &Darkroom,
    path: &Path,
    with_thumbnail: bool,
) -> anyhow::Result<Option<IngestRecord>> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("cannot stat {}", path.display()))?;
    let max_bytes = darkroom.config().upload.max_bytes;
    if metadata.len() > max_bytes {
        tracing::warn!(
            file = %path.display(),
            size = metadata.len(),
            max_bytes,
            "skipping upload over the size limit"
        );
        return Ok(None);
    }

    let bytes =
        fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let claimed = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stored = darkroom.process(&bytes, &claimed)?;
    let thumbnail = if with_thumbnail {
        Some(darkroom.derive_thumbnail(&stored.artifact, darkroom.thumbnail_bounds())?)
    } else {
        None
    };

    Ok(Some(IngestRecord {
        source: path.to_path_buf(),
        stored,
        thumbnail,
    }))
}

/// Expand the input paths into a deterministic file list.
///
/// Directories are walked recursively and filtered by allowed extension;
/// explicitly named files are kept as-is so a bad extension surfaces as a
/// pipeline error instead of disappearing silently.
fn discover(inputs: &[PathBuf], allowed: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && has_allowed_extension(path, allowed) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    files
}

fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
