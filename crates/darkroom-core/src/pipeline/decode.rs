//! Bomb-guarded image decoding and orientation metadata extraction.

use std::io::Cursor;

use exif::{In, Tag, Value};
use image::{DynamicImage, ImageReader};

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// A decoded upload: the raster plus the orientation tag found alongside it.
#[derive(Debug)]
pub struct DecodedUpload {
    /// The decoded raster, in stored (not yet upright) pixel order
    pub image: DynamicImage,

    /// EXIF orientation tag (1-8) if the container carried one
    pub orientation: Option<u32>,
}

/// Decode an in-memory byte stream into a raster.
///
/// The container format is sniffed from the bytes, never trusted from the
/// filename. Before committing to a full decode, the header dimensions are
/// checked against `limits.max_pixels` so a small file claiming an enormous
/// resolution cannot exhaust memory.
pub fn decode(
    bytes: &[u8],
    name: &str,
    limits: &LimitsConfig,
) -> Result<DecodedUpload, PipelineError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_error(name, e.to_string()))?;
    if reader.format().is_none() {
        return Err(decode_error(name, "not a recognized image container"));
    }

    // Header-only probe; no pixel buffer is allocated yet.
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| decode_error(name, e.to_string()))?;
    let pixels = width as u64 * height as u64;
    if pixels == 0 {
        return Err(decode_error(name, "image header reports zero area"));
    }
    if pixels > limits.max_pixels {
        return Err(PipelineError::ImageTooLarge {
            width,
            height,
            pixels,
            max_pixels: limits.max_pixels,
        });
    }

    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_error(name, e.to_string()))?
        .decode()
        .map_err(|e| decode_error(name, e.to_string()))?;

    let orientation = orientation_tag(bytes);
    tracing::trace!(
        file = name,
        width,
        height,
        ?orientation,
        "decoded upload"
    );

    Ok(DecodedUpload { image, orientation })
}

/// Read the EXIF orientation tag from the upload bytes.
///
/// Intentionally lenient: absent metadata, unsupported containers, and
/// malformed EXIF blocks all yield `None`; a metadata problem must never
/// fail the pipeline.
pub fn orientation_tag(bytes: &[u8]) -> Option<u32> {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!(error = %e, "no usable orientation metadata");
            return None;
        }
    };
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    match &field.value {
        Value::Short(v) => v.first().map(|&x| x as u32),
        Value::Long(v) => v.first().copied(),
        _ => None,
    }
}

fn decode_error(name: &str, message: impl Into<String>) -> PipelineError {
    PipelineError::Decode {
        name: name.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn decodes_a_valid_png() {
        let decoded = png_and_decode(20, 10);
        assert_eq!(decoded.image.dimensions(), (20, 10));
        assert_eq!(decoded.orientation, None);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let result = decode(&[0x00, 0x01, 0x02, 0x03], "junk.png", &LimitsConfig::default());
        assert!(matches!(result, Err(PipelineError::Decode { .. })));
    }

    #[test]
    fn empty_upload_is_a_decode_error() {
        let result = decode(&[], "empty.png", &LimitsConfig::default());
        assert!(matches!(result, Err(PipelineError::Decode { .. })));
    }

    #[test]
    fn truncated_png_is_a_decode_error() {
        let bytes = png_bytes(32, 32);
        let result = decode(&bytes[..bytes.len() / 2], "cut.png", &LimitsConfig::default());
        assert!(matches!(result, Err(PipelineError::Decode { .. })));
    }

    #[test]
    fn pixel_ceiling_is_enforced_from_the_header() {
        let bytes = png_bytes(100, 100);
        let limits = LimitsConfig { max_pixels: 9_999 };
        match decode(&bytes, "big.png", &limits) {
            Err(PipelineError::ImageTooLarge {
                width,
                height,
                pixels,
                max_pixels,
            }) => {
                assert_eq!((width, height), (100, 100));
                assert_eq!(pixels, 10_000);
                assert_eq!(max_pixels, 9_999);
            }
            other => panic!("expected ImageTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn image_at_the_ceiling_still_decodes() {
        let bytes = png_bytes(100, 100);
        let limits = LimitsConfig { max_pixels: 10_000 };
        assert!(decode(&bytes, "fits.png", &limits).is_ok());
    }

    #[test]
    fn plain_png_has_no_orientation() {
        assert_eq!(orientation_tag(&png_bytes(4, 4)), None);
    }

    fn png_and_decode(width: u32, height: u32) -> DecodedUpload {
        decode(&png_bytes(width, height), "test.png", &LimitsConfig::default()).unwrap()
    }
}
