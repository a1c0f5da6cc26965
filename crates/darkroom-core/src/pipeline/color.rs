//! Color normalization: flatten alpha and exotic modes onto opaque white.
//!
//! Everything leaving this stage is 8-bit grayscale or RGB. Lossy encoders
//! downstream cannot carry transparency, and the storage invariant is that
//! no alpha or palette data ever reaches disk. Indexed sources arrive here
//! already expanded by the decoder; 16-bit and float modes are reduced to
//! 8 bits before flattening.

use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::PipelineError;

/// The fixed background transparent pixels are composited over.
const BACKGROUND: u8 = 0xFF;

/// Normalize a raster to opaque 8-bit grayscale or RGB.
///
/// Already-opaque `Rgb8`/`Luma8` rasters pass through untouched, which makes
/// the stage idempotent.
pub fn normalize(image: DynamicImage) -> Result<DynamicImage, PipelineError> {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => Ok(image),
        DynamicImage::ImageRgba8(buf) => flatten_rgba(buf),
        DynamicImage::ImageLumaA8(buf) => flatten_gray_alpha(buf),
        other => {
            if other.color().has_alpha() {
                flatten_rgba(other.to_rgba8())
            } else {
                Ok(DynamicImage::ImageRgb8(other.to_rgb8()))
            }
        }
    }
}

fn flatten_rgba(buf: image::RgbaImage) -> Result<DynamicImage, PipelineError> {
    let (width, height) = buf.dimensions();
    let mut out = Vec::with_capacity(width as usize * height as usize * 3);
    for px in buf.pixels() {
        let [r, g, b, a] = px.0;
        out.push(blend(r, a));
        out.push(blend(g, a));
        out.push(blend(b, a));
    }
    let flat = RgbImage::from_raw(width, height, out).ok_or_else(|| channel_mismatch(width, height))?;
    Ok(DynamicImage::ImageRgb8(flat))
}

fn flatten_gray_alpha(buf: image::GrayAlphaImage) -> Result<DynamicImage, PipelineError> {
    let (width, height) = buf.dimensions();
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for px in buf.pixels() {
        let [l, a] = px.0;
        out.push(blend(l, a));
    }
    let flat = GrayImage::from_raw(width, height, out).ok_or_else(|| channel_mismatch(width, height))?;
    Ok(DynamicImage::ImageLuma8(flat))
}

/// `out = src * alpha + background * (1 - alpha)`, rounded.
fn blend(channel: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((channel as u32 * a + BACKGROUND as u32 * (255 - a) + 127) / 255) as u8
}

fn channel_mismatch(width: u32, height: u32) -> PipelineError {
    PipelineError::ColorConversion {
        message: format!("channel data inconsistent with a {width}x{height} canvas"),
    }
}
