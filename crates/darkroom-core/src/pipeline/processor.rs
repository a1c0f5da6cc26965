//! Pipeline orchestration - wires the stages into one ingestion run.
//!
//! Each run is synchronous and single-threaded, owns its raster exclusively,
//! and holds no lock: concurrent runs coordinate through nothing but the
//! randomness of their artifact names.

use image::GenericImageView;

use crate::config::{Config, LimitsConfig, UploadConfig};
use crate::error::PipelineError;
use crate::store::ArtifactStore;
use crate::types::{BoundingBox, StoredImage};

use super::thumbnail::ThumbnailDeriver;
use super::{color, decode, encode, orient, resize, sniff};

/// The main upload processor: decode → orient → normalize → resize →
/// encode → store, plus thumbnail derivation and deletion against the same
/// store.
pub struct UploadProcessor {
    upload: UploadConfig,
    limits: LimitsConfig,
    store: ArtifactStore,
    thumbnailer: ThumbnailDeriver,
}

impl UploadProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            upload: config.upload.clone(),
            limits: config.limits.clone(),
            store: ArtifactStore::new(config.upload_dir()),
            thumbnailer: ThumbnailDeriver::new(config.thumbnail.clone(), config.limits.clone()),
        }
    }

    /// The artifact store this processor writes to.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The configured default thumbnail bounding box.
    pub fn thumbnail_bounds(&self) -> BoundingBox {
        self.thumbnailer.bounds()
    }

    /// Run one upload through the full pipeline.
    ///
    /// Consumes the byte stream, stores exactly one artifact on success, and
    /// returns its record. On failure nothing is committed.
    pub fn process(
        &self,
        bytes: &[u8],
        claimed_filename: &str,
    ) -> Result<StoredImage, PipelineError> {
        let start = std::time::Instant::now();
        tracing::debug!(
            file = claimed_filename,
            size = bytes.len(),
            "ingesting upload"
        );

        let (extension, target) = sniff::validate(claimed_filename, &self.upload)?;

        let stage = std::time::Instant::now();
        let decoded = decode::decode(bytes, claimed_filename, &self.limits)?;
        tracing::trace!("  decode: {:?}", stage.elapsed());

        let stage = std::time::Instant::now();
        let upright = orient::apply(decoded.image, decoded.orientation);
        let flat = color::normalize(upright)?;
        let sized = resize::clamp_width(flat, self.upload.max_width)?;
        tracing::trace!("  transform: {:?}", stage.elapsed());

        let stage = std::time::Instant::now();
        let (width, height) = sized.dimensions();
        let encoded = encode::encode(&sized, target, self.upload.quality)?;
        tracing::trace!("  encode: {:?}", stage.elapsed());

        let artifact = encode::artifact_name(&extension);
        self.store.store(&artifact, &encoded)?;

        tracing::debug!(
            file = claimed_filename,
            artifact = %artifact,
            width,
            height,
            elapsed = ?start.elapsed(),
            "upload stored"
        );

        Ok(StoredImage {
            artifact,
            width,
            height,
            format: encode::format_label(target.format).to_string(),
            bytes: encoded.len() as u64,
        })
    }

    /// Derive a thumbnail for a previously stored artifact.
    pub fn derive_thumbnail(
        &self,
        artifact: &str,
        bounds: BoundingBox,
    ) -> Result<String, PipelineError> {
        self.thumbnailer.derive(&self.store, artifact, bounds)
    }

    /// Remove an artifact and its thumbnail sibling, idempotently.
    pub fn delete(&self, artifact: &str) -> Result<(), PipelineError> {
        self.store.delete(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.store.upload_dir = dir.join("uploads");
        config
    }

    fn png_upload(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn process_stores_exactly_one_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let processor = UploadProcessor::new(&test_config(dir.path()));

        let stored = processor.process(&png_upload(20, 10), "photo.png").unwrap();
        assert_eq!((stored.width, stored.height), (20, 10));
        assert_eq!(stored.format, "png");
        assert!(processor.store().exists(&stored.artifact));

        let entries = std::fs::read_dir(processor.store().root()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn rejected_upload_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let processor = UploadProcessor::new(&test_config(dir.path()));

        let result = processor.process(b"MZ\x90\x00", "payload.exe");
        assert!(matches!(
            result,
            Err(PipelineError::UnsupportedFormat { .. })
        ));
        // the store directory was never created
        assert!(!processor.store().root().exists());
    }

    #[test]
    fn two_runs_never_share_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let processor = UploadProcessor::new(&test_config(dir.path()));

        let bytes = png_upload(8, 8);
        let first = processor.process(&bytes, "same.png").unwrap();
        let second = processor.process(&bytes, "same.png").unwrap();
        assert_ne!(first.artifact, second.artifact);
    }
}
