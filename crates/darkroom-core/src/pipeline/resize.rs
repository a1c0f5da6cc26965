//! Downsampling: width clamping for mains, box fitting for thumbnails.
//!
//! Both operations preserve aspect ratio, resample with Lanczos3, and never
//! upsample: an already-small raster passes through untouched.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::PipelineError;
use crate::types::BoundingBox;

/// Downsample so the width does not exceed `max_width`.
///
/// Height scales by the same ratio, rounded to the nearest pixel.
pub fn clamp_width(image: DynamicImage, max_width: u32) -> Result<DynamicImage, PipelineError> {
    if max_width == 0 {
        return Err(resize_error("configured maximum width is zero"));
    }
    let (width, height) = image.dimensions();
    if width <= max_width {
        return Ok(image);
    }

    let ratio = max_width as f64 / width as f64;
    let target_height = (height as f64 * ratio).round() as u32;
    if target_height == 0 {
        return Err(resize_error(format!(
            "target height rounds to zero for {width}x{height} at max width {max_width}"
        )));
    }

    tracing::debug!("downsampling {width}x{height} -> {max_width}x{target_height}");
    Ok(image.resize_exact(max_width, target_height, FilterType::Lanczos3))
}

/// Shrink to fit inside `bounds`, preserving aspect ratio.
///
/// A raster already inside the box is returned unchanged.
pub fn fit_within(image: DynamicImage, bounds: BoundingBox) -> Result<DynamicImage, PipelineError> {
    if bounds.max_width == 0 || bounds.max_height == 0 {
        return Err(resize_error("bounding box has a zero dimension"));
    }
    let (width, height) = image.dimensions();
    if width <= bounds.max_width && height <= bounds.max_height {
        return Ok(image);
    }
    Ok(image.resize(bounds.max_width, bounds.max_height, FilterType::Lanczos3))
}

fn resize_error(message: impl Into<String>) -> PipelineError {
    PipelineError::Resize {
        message: message.into(),
    }
}
