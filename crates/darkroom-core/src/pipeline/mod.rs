//! The upload image pipeline, one module per stage:
//! - **sniff**: claimed extension against the allow-list
//! - **decode**: bomb-guarded decode plus orientation metadata
//! - **orient**: upright pixel order from the EXIF tag
//! - **color**: flatten alpha/palette onto opaque white
//! - **resize**: width clamping and thumbnail box fitting
//! - **encode**: serialization and artifact naming
//! - **thumbnail**: derivation against stored artifacts
//! - **processor**: orchestrates one ingestion run
//!
//! Stages consume their raster by value and return a new one, so each is
//! independently testable and the chain has a single owner at every step.

pub mod color;
pub mod decode;
pub mod encode;
pub mod orient;
pub mod processor;
pub mod resize;
pub mod sniff;
pub mod thumbnail;

// Re-exports for convenient access
pub use decode::DecodedUpload;
pub use encode::EncodeTarget;
pub use processor::UploadProcessor;
pub use thumbnail::ThumbnailDeriver;
