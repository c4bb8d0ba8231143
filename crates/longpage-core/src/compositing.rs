use crate::error::{LongPageError, Result};
use crate::layout::LayoutPlan;
use crate::model::NormalizedImage;
use image::{Rgb, RgbImage};

/// Blit `src` into `canvas` with its top-left at (dx, dy), clipping anything outside the canvas.
pub fn blit_rgb(src: &RgbImage, canvas: &mut RgbImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..sw {
            if dx + xx >= cw {
                break;
            }
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }
}

/// Paints the whole sequence onto one long canvas at the plan's offsets, left-aligned at x = 0.
///
/// - background: opaque fill colour behind padding and gaps
/// - the plan must have been computed for exactly `images`, in the same order
pub fn compose_long(
    images: &[NormalizedImage],
    plan: &LayoutPlan,
    background: [u8; 3],
) -> Result<RgbImage> {
    if images.is_empty() || plan.is_empty() {
        return Err(LongPageError::Empty);
    }
    if images.len() != plan.len() {
        return Err(LongPageError::InvalidInput(format!(
            "plan has {} placements for {} images",
            plan.len(),
            images.len()
        )));
    }
    let mut canvas = RgbImage::from_pixel(plan.width, plan.total_height, Rgb(background));
    for (im, placement) in images.iter().zip(&plan.placements) {
        if im.width() != plan.width || im.height() != placement.height {
            return Err(LongPageError::InvalidInput(format!(
                "'{}' is {}x{}, plan expects {}x{}",
                im.key,
                im.width(),
                im.height(),
                plan.width,
                placement.height
            )));
        }
        blit_rgb(&im.rgb, &mut canvas, 0, placement.y);
    }
    Ok(canvas)
}
