//! Orientation correction from EXIF tag values.
//!
//! Cameras record the sensor's physical rotation instead of rewriting pixel
//! order, so uploads arrive sideways or mirrored with a tag 1-8 describing
//! how. This stage rewrites pixel order to upright once, and the tag is never
//! persisted afterwards.

use image::DynamicImage;

/// Apply the upright transform for an EXIF orientation tag.
///
/// Rotation is clockwise and applied before the mirror, matching the tag
/// definitions. Any value outside 1-8 (and an absent tag) is the identity;
/// bad metadata never fails the run.
pub fn apply(image: DynamicImage, tag: Option<u32>) -> DynamicImage {
    match tag.unwrap_or(1) {
        1 => image,
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate270().fliph(),
        6 => image.rotate90(),
        7 => image.rotate90().fliph(),
        8 => image.rotate270(),
        other => {
            tracing::debug!(
                orientation = other,
                "orientation tag out of range, keeping stored pixel order"
            );
            image
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    const A: [u8; 3] = [255, 0, 0];
    const B: [u8; 3] = [0, 255, 0];
    const C: [u8; 3] = [0, 0, 255];
    const D: [u8; 3] = [255, 255, 0];

    /// 2x2 probe image:
    /// ```text
    /// A B
    /// C D
    /// ```
    fn probe() -> DynamicImage {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb(A));
        img.put_pixel(1, 0, Rgb(B));
        img.put_pixel(0, 1, Rgb(C));
        img.put_pixel(1, 1, Rgb(D));
        DynamicImage::ImageRgb8(img)
    }

    fn grid(image: &DynamicImage) -> [[u8; 3]; 4] {
        let rgb = image.to_rgb8();
        [
            rgb.get_pixel(0, 0).0,
            rgb.get_pixel(1, 0).0,
            rgb.get_pixel(0, 1).0,
            rgb.get_pixel(1, 1).0,
        ]
    }

    #[test]
    fn tag_1_is_identity() {
        assert_eq!(grid(&apply(probe(), Some(1))), [A, B, C, D]);
    }

    #[test]
    fn tag_2_mirrors_horizontally() {
        assert_eq!(grid(&apply(probe(), Some(2))), [B, A, D, C]);
    }

    #[test]
    fn tag_3_rotates_180() {
        assert_eq!(grid(&apply(probe(), Some(3))), [D, C, B, A]);
    }

    #[test]
    fn tag_4_mirrors_vertically() {
        assert_eq!(grid(&apply(probe(), Some(4))), [C, D, A, B]);
    }

    #[test]
    fn tag_5_rotates_ccw_then_mirrors() {
        assert_eq!(grid(&apply(probe(), Some(5))), [D, B, C, A]);
    }

    #[test]
    fn tag_6_rotates_cw() {
        assert_eq!(grid(&apply(probe(), Some(6))), [C, A, D, B]);
    }

    #[test]
    fn tag_7_rotates_cw_then_mirrors() {
        assert_eq!(grid(&apply(probe(), Some(7))), [A, C, B, D]);
    }

    #[test]
    fn tag_8_rotates_ccw() {
        assert_eq!(grid(&apply(probe(), Some(8))), [B, D, A, C]);
    }

    #[test]
    fn quarter_turns_swap_dimensions() {
        let wide = DynamicImage::new_rgb8(3, 2);
        for tag in [5, 6, 7, 8] {
            let turned = apply(wide.clone(), Some(tag));
            assert_eq!(turned.dimensions(), (2, 3), "tag {tag}");
        }
        for tag in [1, 2, 3, 4] {
            let kept = apply(wide.clone(), Some(tag));
            assert_eq!(kept.dimensions(), (3, 2), "tag {tag}");
        }
    }

    #[test]
    fn out_of_range_tags_are_identity() {
        assert_eq!(grid(&apply(probe(), Some(0))), [A, B, C, D]);
        assert_eq!(grid(&apply(probe(), Some(9))), [A, B, C, D]);
        assert_eq!(grid(&apply(probe(), Some(4242))), [A, B, C, D]);
    }

    #[test]
    fn absent_tag_is_identity() {
        assert_eq!(grid(&apply(probe(), None)), [A, B, C, D]);
    }
}
