//! Serialization to the target container, plus artifact name generation.
//!
//! The encode target is resolved once from the validated extension through a
//! static table; nothing downstream branches on the extension again.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageFormat};
use rand::Rng;

use crate::error::PipelineError;

/// Encode parameters for one allowed extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeTarget {
    /// The container to serialize to
    pub format: ImageFormat,

    /// Whether the container can carry an alpha channel
    pub supports_alpha: bool,

    /// Whether `quality` applies (lossy targets only)
    pub lossy: bool,
}

/// Extension -> encode target table. One lookup per pipeline run.
pub fn target_for(extension: &str) -> Option<EncodeTarget> {
    let target = match extension {
        "jpg" | "jpeg" => EncodeTarget {
            format: ImageFormat::Jpeg,
            supports_alpha: false,
            lossy: true,
        },
        "png" => EncodeTarget {
            format: ImageFormat::Png,
            supports_alpha: true,
            lossy: false,
        },
        "gif" => EncodeTarget {
            format: ImageFormat::Gif,
            supports_alpha: true,
            lossy: false,
        },
        "webp" => EncodeTarget {
            format: ImageFormat::WebP,
            supports_alpha: true,
            lossy: false,
        },
        _ => return None,
    };
    Some(target)
}

/// Short label for a format ("jpeg", "png", ...), for records and errors.
pub fn format_label(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        _ => "unknown",
    }
}

/// Serialize the raster for `target`.
///
/// Lossy targets use `quality`; lossless targets get best-effort maximum
/// compression. A raster mode the encoder rejects here is a logic defect:
/// color normalization upstream should have made that impossible.
pub fn encode(
    image: &DynamicImage,
    target: EncodeTarget,
    quality: u8,
) -> Result<Vec<u8>, PipelineError> {
    let mut buffer = Cursor::new(Vec::new());
    let result = match target.format {
        ImageFormat::Jpeg => {
            image.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
        }
        ImageFormat::Png => image.write_with_encoder(PngEncoder::new_with_quality(
            &mut buffer,
            CompressionType::Best,
            PngFilter::Adaptive,
        )),
        other => image.write_to(&mut buffer, other),
    };
    result.map_err(|e| PipelineError::Encode {
        format: format_label(target.format).to_string(),
        message: e.to_string(),
    })?;
    Ok(buffer.into_inner())
}

/// Generate an artifact name: 128 bits of randomness as hex plus the
/// validated extension.
///
/// Collision probability is negligible and deliberately not handled by
/// retry; names are never reused, even across deletions.
pub fn artifact_name(extension: &str) -> String {
    let id: u128 = rand::thread_rng().gen();
    format!("{id:032x}.{extension}")
}
