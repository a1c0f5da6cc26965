//! Upload validation: the claimed extension against the allow-list.
//!
//! This is the only stage that looks at the claimed filename. The extension
//! decides the encode target for the whole run; the actual byte container is
//! sniffed independently by the decoder, so a PNG uploaded as `photo.jpg`
//! decodes as PNG and is re-encoded as JPEG.

use crate::config::UploadConfig;
use crate::error::PipelineError;
use crate::pipeline::encode::{self, EncodeTarget};

/// Extract the claimed extension: the last dot-suffix, lowercased.
///
/// Returns `None` for filenames without one (`README`, `archive.`).
pub fn claimed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check the claimed filename against the allow-list and resolve its encode
/// target in one lookup.
pub fn validate(
    filename: &str,
    upload: &UploadConfig,
) -> Result<(String, EncodeTarget), PipelineError> {
    let extension = claimed_extension(filename).ok_or_else(|| {
        PipelineError::UnsupportedFormat {
            extension: String::new(),
            allowed: upload.allowed_display(),
        }
    })?;

    let allowed = upload
        .allowed_extensions
        .iter()
        .any(|a| a.eq_ignore_ascii_case(&extension));
    if !allowed {
        return Err(PipelineError::UnsupportedFormat {
            extension,
            allowed: upload.allowed_display(),
        });
    }

    let target = encode::target_for(&extension).ok_or_else(|| {
        // allowed by config but unknown to the encoder table
        PipelineError::UnsupportedFormat {
            extension: extension.clone(),
            allowed: upload.allowed_display(),
        }
    })?;

    Ok((extension, target))
}
