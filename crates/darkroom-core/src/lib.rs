//! Darkroom Core - upload image ingestion library.
//!
//! Darkroom takes a user-uploaded byte stream and turns it into a stored,
//! well-formed image artifact: decoded defensively, rotated upright from its
//! camera metadata, flattened to an opaque canonical color mode, constrained
//! to a maximum width, re-encoded, and written under a collision-resistant
//! random name. A bounded thumbnail can be derived later from any stored
//! artifact, and deletion removes both halves idempotently.
//!
//! # Architecture
//!
//! ```text
//! Upload bytes → Sniff → Decode → Orient → Normalize → Resize → Encode → Store
//! ```
//!
//! The library never touches sessions, users, or a database; its whole
//! contract with the surrounding application is bytes plus a claimed
//! filename in, an artifact name (or a typed failure) out.
//!
//! # Usage
//!
//! ```rust,ignore
//! use darkroom_core::{BoundingBox, Config, Darkroom};
//!
//! fn main() -> darkroom_core::Result<()> {
//!     let darkroom = Darkroom::new(Config::load()?)?;
//!
//!     let bytes = std::fs::read("./upload.jpg")?;
//!     let stored = darkroom.process(&bytes, "upload.jpg")?;
//!     let thumb = darkroom.derive_thumbnail(&stored.artifact, BoundingBox::new(200, 200))?;
//!     println!("stored {} with thumbnail {}", stored.artifact, thumb);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, DarkroomError, PipelineError, PipelineResult, Result};
pub use pipeline::{ThumbnailDeriver, UploadProcessor};
pub use store::ArtifactStore;
pub use types::{BoundingBox, IngestStats, StoredImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Darkroom processor - the main entry point for upload ingestion.
///
/// Thin facade over [`UploadProcessor`] that validates configuration once
/// and exposes the three operations the surrounding application calls:
/// [`process`](Darkroom::process),
/// [`derive_thumbnail`](Darkroom::derive_thumbnail), and
/// [`delete`](Darkroom::delete).
pub struct Darkroom {
    config: Config,
    processor: UploadProcessor,
}

impl Darkroom {
    /// Create a new darkroom with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        tracing::debug!("initializing darkroom v{}", VERSION);
        let processor = UploadProcessor::new(&config);
        Ok(Self { config, processor })
    }

    /// Create a new darkroom with configuration from the default location.
    pub fn with_defaults() -> Result<Self> {
        Self::new(Config::load()?)
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The artifact store backing this darkroom.
    pub fn store(&self) -> &ArtifactStore {
        self.processor.store()
    }

    /// The configured default thumbnail bounding box.
    pub fn thumbnail_bounds(&self) -> BoundingBox {
        self.processor.thumbnail_bounds()
    }

    /// Ingest one upload; returns the stored artifact's record.
    pub fn process(&self, bytes: &[u8], claimed_filename: &str) -> PipelineResult<StoredImage> {
        self.processor.process(bytes, claimed_filename)
    }

    /// Derive a thumbnail for a stored artifact; returns the sibling name.
    pub fn derive_thumbnail(&self, artifact: &str, bounds: BoundingBox) -> PipelineResult<String> {
        self.processor.derive_thumbnail(artifact, bounds)
    }

    /// Remove an artifact and its thumbnail sibling.
    ///
    /// Idempotent: absence is success. Returns `false` only when a
    /// filesystem operation failed on a file that does exist; whichever
    /// half was removed stays removed.
    pub fn delete(&self, artifact: &str) -> bool {
        match self.processor.delete(artifact) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(artifact, error = %e, "delete failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = Config::default();
        config.upload.quality = 0;
        assert!(matches!(
            Darkroom::new(config),
            Err(DarkroomError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn new_accepts_the_defaults() {
        let darkroom = Darkroom::new(Config::default()).unwrap();
        assert_eq!(darkroom.config().upload.max_width, 1200);
        assert_eq!(darkroom.thumbnail_bounds(), BoundingBox::new(200, 200));
    }

    #[test]
    fn delete_of_a_never_stored_name_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.upload_dir = dir.path().join("uploads");
        let darkroom = Darkroom::new(config).unwrap();
        assert!(darkroom.delete("0123456789abcdef0123456789abcdef.jpg"));
    }
}
