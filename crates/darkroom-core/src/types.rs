//! Core data types for the darkroom upload pipeline.

use serde::{Deserialize, Serialize};

/// The record returned for a successfully stored main artifact.
///
/// The `artifact` name is the contract with the surrounding application;
/// dimensions and byte count are carried along so callers don't have to
/// re-open the stored file to display or log them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredImage {
    /// Generated artifact filename (`<hex128>.<ext>`)
    pub artifact: String,

    /// Stored width in pixels (after orientation and width clamping)
    pub width: u32,

    /// Stored height in pixels
    pub height: u32,

    /// Encode target ("jpeg", "png", ...)
    pub format: String,

    /// Encoded size in bytes
    pub bytes: u64,
}

/// Bounding box for thumbnail derivation: neither output dimension exceeds
/// these, and the source is never upscaled to reach them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

/// Outcome counts for a multi-file submission.
///
/// The pipeline itself has no notion of a submission; this aggregate belongs
/// to the caller, which skips failed files and proceeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Uploads processed and stored
    pub succeeded: usize,

    /// Uploads rejected by the pipeline
    pub failed: usize,

    /// Uploads skipped before invocation (over the size limit)
    pub skipped: usize,
}
