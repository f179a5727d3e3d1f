use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// Largest size with the source aspect ratio that fits inside `max_w` x `max_h`.
/// Never upscales; each side is at least one pixel.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max_w.max(1), max_h.max(1));
    }

    let scale_width = max_w as f32 / width as f32;
    let scale_height = max_h as f32 / height as f32;
    let scale = scale_width.min(scale_height).min(1.0);

    let scaled_width = ((width as f32 * scale).round() as u32).clamp(1, max_w.max(1));
    let scaled_height = ((height as f32 * scale).round() as u32).clamp(1, max_h.max(1));
    (scaled_width, scaled_height)
}

/// Pick the resampling filter from the downscale ratio
fn select_filter(orig: (u32, u32), target: (u32, u32)) -> FilterType {
    let width_ratio = orig.0 as f32 / target.0 as f32;
    let height_ratio = orig.1 as f32 / target.1 as f32;
    if width_ratio.max(height_ratio) > 2.0 {
        FilterType::Triangle
    } else {
        FilterType::Lanczos3
    }
}

/// Scale `img` to fit the frame and center it on a `width` x `height` canvas
/// filled with `background`.
pub fn letterbox(img: &RgbImage, width: u32, height: u32, background: Rgb<u8>) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width, height, background);
    if img.width() == 0 || img.height() == 0 {
        return canvas;
    }

    let scaled = downsample(img, width, height);
    let x_offset = width.saturating_sub(scaled.width()) / 2;
    let y_offset = height.saturating_sub(scaled.height()) / 2;
    imageops::replace(&mut canvas, &scaled, x_offset as i64, y_offset as i64);

    canvas
}

/// Shrink `img` so that it fits inside `max_w` x `max_h`, keeping aspect ratio
pub fn downsample(img: &RgbImage, max_w: u32, max_h: u32) -> RgbImage {
    let orig = img.dimensions();
    let target = fit_within(orig.0, orig.1, max_w, max_h);
    if target == orig {
        return img.clone();
    }
    imageops::resize(img, target.0, target.1, select_filter(orig, target))
}

/// Blank canvas used when a frame cannot be produced
pub fn placeholder(width: u32, height: u32, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width.max(1), height.max(1), background)
}
