use crate::config::{AlphaPolicy, BuildConfig};
use crate::error::{LongPageError, Result};
use crate::model::{ImageAsset, NormalizedImage};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use std::borrow::Borrow;
use std::io::Cursor;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Decodes a raw payload into a single still image.
///
/// The format is sniffed from the bytes first and from the declared file name second.
/// Animated GIF/WebP payloads yield their first frame.
pub fn decode_still(name: &str, bytes: &[u8]) -> Result<DynamicImage> {
    let decode_err = |reason: String| LongPageError::Decode {
        name: name.to_string(),
        reason,
    };
    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        let fmt = ImageFormat::from_path(name)
            .map_err(|_| decode_err("unrecognized image format".into()))?;
        reader.set_format(fmt);
    }
    reader.decode().map_err(|e| decode_err(e.to_string()))
}

/// Coerces any colour model to 8-bit RGB. Alpha never survives.
pub fn to_rgb(image: &DynamicImage, policy: AlphaPolicy, background: [u8; 3]) -> RgbImage {
    if !image.color().has_alpha() || policy == AlphaPolicy::Discard {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = px[3] as u32;
        let mut c = [0u8; 3];
        for i in 0..3 {
            let blended = px[i] as u32 * a + background[i] as u32 * (255 - a);
            c[i] = ((blended + 127) / 255) as u8;
        }
        out.put_pixel(x, y, Rgb(c));
    }
    out
}

/// Height after scaling a `src_w x src_h` image to `target_w`, rounded half to even, at least 1.
pub fn scaled_height(src_w: u32, src_h: u32, target_w: u32) -> u32 {
    if src_w == target_w {
        return src_h;
    }
    let scale = target_w as f64 / src_w.max(1) as f64;
    let h = (src_h as f64 * scale).round_ties_even();
    (h as u32).max(1)
}

/// Rescales to the canvas width preserving aspect ratio (Lanczos3). Never crops.
pub fn fit_to_width(image: &DynamicImage, cfg: &BuildConfig) -> RgbImage {
    let (w, h) = (image.width(), image.height());
    let rgb = to_rgb(image, cfg.alpha_policy, cfg.background);
    if w == cfg.canvas_width {
        return rgb;
    }
    let new_h = scaled_height(w, h, cfg.canvas_width);
    image::imageops::resize(&rgb, cfg.canvas_width, new_h, FilterType::Lanczos3)
}

pub fn normalize(asset: &ImageAsset, cfg: &BuildConfig) -> NormalizedImage {
    NormalizedImage {
        key: asset.name.clone(),
        rgb: fit_to_width(&asset.image, cfg),
    }
}

/// Normalizes a whole sequence, keeping input order.
pub fn normalize_all<A>(assets: &[A], cfg: &BuildConfig) -> Vec<NormalizedImage>
where
    A: Borrow<ImageAsset> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return assets
                .par_iter()
                .map(|a| normalize(a.borrow(), cfg))
                .collect();
        }
    }
    assets.iter().map(|a| normalize(a.borrow(), cfg)).collect()
}
