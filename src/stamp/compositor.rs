//! Alpha compositing of overlay layers.
//!
//! All blending uses the Porter-Duff "over" operator on straight
//! (non-premultiplied) RGBA.

use crate::error::StampError;
use image::{Rgba, RgbaImage};

/// Composite a full-size overlay onto the source image.
///
/// The overlay must have exactly the source's dimensions.
pub fn composite_overlay(target: &mut RgbaImage, overlay: &RgbaImage) -> Result<(), StampError> {
    if target.dimensions() != overlay.dimensions() {
        return Err(StampError::Composite(format!(
            "overlay is {}x{} but image is {}x{}",
            overlay.width(),
            overlay.height(),
            target.width(),
            target.height()
        )));
    }

    for (dst, src) in target.pixels_mut().zip(overlay.pixels()) {
        if src[3] == 0 {
            continue;
        }
        *dst = blend_pixels(*dst, *src, 1.0);
    }

    Ok(())
}

/// Blend `source` onto `target` with its top-left corner at (`x`, `y`).
///
/// Parts of the source falling outside the target are clipped.
pub fn blend_region(target: &mut RgbaImage, source: &RgbaImage, x: i32, y: i32, opacity: f32) {
    let target_width = target.width() as i32;
    let target_height = target.height() as i32;

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + source.width() as i32).min(target_width);
    let y_end = (y + source.height() as i32).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let src = source.get_pixel((tx - x) as u32, (ty - y) as u32);
            if src[3] == 0 {
                continue;
            }
            let dst = target.get_pixel(tx as u32, ty as u32);
            let blended = blend_pixels(*dst, *src, opacity);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Blend two pixels using alpha compositing with additional opacity.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
