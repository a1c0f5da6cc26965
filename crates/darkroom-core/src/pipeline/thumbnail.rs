//! Thumbnail derivation against already-stored artifacts.
//!
//! Runs independently of ingestion, possibly much later: the main artifact
//! is re-opened from the store, shrunk into a bounding box, and stored under
//! the sibling name (`<stem>_thumb.<ext>`).

use crate::config::{LimitsConfig, ThumbnailConfig};
use crate::error::PipelineError;
use crate::pipeline::{color, decode, encode, resize, sniff};
use crate::store::{self, ArtifactStore};
use crate::types::BoundingBox;

/// Derives bounded-size thumbnails from stored main artifacts.
pub struct ThumbnailDeriver {
    config: ThumbnailConfig,
    limits: LimitsConfig,
}

impl ThumbnailDeriver {
    /// Create a new deriver with the given configuration.
    pub fn new(config: ThumbnailConfig, limits: LimitsConfig) -> Self {
        Self { config, limits }
    }

    /// The configured default bounding box.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.config.max_width, self.config.max_height)
    }

    /// Derive a thumbnail for `artifact` and store it under the sibling name.
    ///
    /// Fails with `NotFound` if the main artifact is missing; decode and
    /// encode failures propagate from the underlying stages.
    pub fn derive(
        &self,
        store: &ArtifactStore,
        artifact: &str,
        bounds: BoundingBox,
    ) -> Result<String, PipelineError> {
        let bytes = store.load(artifact)?;

        let extension = sniff::claimed_extension(artifact).ok_or_else(|| {
            PipelineError::Decode {
                name: artifact.to_string(),
                message: "artifact name carries no extension".to_string(),
            }
        })?;
        let target = encode::target_for(&extension).ok_or_else(|| PipelineError::Decode {
            name: artifact.to_string(),
            message: format!("artifact extension '{extension}' has no encoder"),
        })?;

        let decoded = decode::decode(&bytes, artifact, &self.limits)?;
        let shrunk = resize::fit_within(decoded.image, bounds)?;
        // Lossy targets cannot carry alpha; mains are stored flat, but the
        // deriver must hold for any artifact the store hands back.
        let flat = if target.lossy && !target.supports_alpha {
            color::normalize(shrunk)?
        } else {
            shrunk
        };
        let encoded = encode::encode(&flat, target, self.config.quality)?;

        let thumb = store::thumbnail_name(artifact);
        store.store(&thumb, &encoded)?;
        tracing::debug!(artifact, thumbnail = %thumb, "derived thumbnail");
        Ok(thumb)
    }
}
