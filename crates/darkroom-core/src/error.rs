//! Error types for the darkroom upload pipeline.
//!
//! Pipeline errors are organized by stage so callers can tell a rejected
//! upload (bad extension, corrupt bytes) apart from a storage problem or an
//! internal defect. All variants are terminal for the run that produced them;
//! nothing in the pipeline retries.

use thiserror::Error;

/// Top-level error type for darkroom operations.
#[derive(Error, Debug)]
pub enum DarkroomError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Pipeline processing errors, one variant per failure class.
///
/// Malformed orientation metadata is deliberately *not* represented here:
/// it degrades to the identity transform and is only visible in the logs.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Claimed extension is absent or not in the allow-list
    #[error("unsupported upload extension '{extension}' (allowed: {allowed})")]
    UnsupportedFormat { extension: String, allowed: String },

    /// Bytes do not parse as a supported image
    #[error("decode failed for '{name}': {message}")]
    Decode { name: String, message: String },

    /// Header claims more pixels than the configured decode ceiling
    #[error("refusing {width}x{height} image: {pixels} pixels exceeds ceiling of {max_pixels}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        pixels: u64,
        max_pixels: u64,
    },

    /// Channel data inconsistent during alpha/palette flattening
    #[error("color normalization failed: {message}")]
    ColorConversion { message: String },

    /// Degenerate target dimensions or resampling failure
    #[error("resize failed: {message}")]
    Resize { message: String },

    /// Serialization to the target format failed
    #[error("encode to {format} failed: {message}")]
    Encode { format: String, message: String },

    /// Source artifact missing (thumbnail derivation, load)
    #[error("artifact not found: {name}")]
    NotFound { name: String },

    /// Filesystem failure on write or delete of an existing file
    #[error("storage error for '{name}': {source}")]
    Storage {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for darkroom results.
pub type Result<T> = std::result::Result<T, DarkroomError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_the_allow_list() {
        let err = PipelineError::UnsupportedFormat {
            extension: "exe".to_string(),
            allowed: "png, jpg, jpeg".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exe"));
        assert!(msg.contains("png, jpg, jpeg"));
    }

    #[test]
    fn image_too_large_reports_the_ceiling() {
        let err = PipelineError::ImageTooLarge {
            width: 50_000,
            height: 50_000,
            pixels: 2_500_000_000,
            max_pixels: 40_000_000,
        };
        assert!(err.to_string().contains("2500000000"));
        assert!(err.to_string().contains("40000000"));
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DarkroomError>();
        assert_send_sync::<PipelineError>();
    }
}
