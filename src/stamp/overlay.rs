//! Overlay rendering.
//!
//! Builds a transparent RGBA layer with the same dimensions as the source
//! image containing, bottom to top: a blurred drop shadow, a rounded
//! semi-transparent background box, and the timestamp text.

use super::compositor::{blend_pixels, blend_region};
use super::layout::{ImageDimensions, OverlayLayout, Rect};
use super::text_renderer::{draw_text_right_aligned, parse_hex_color, Color, StampFont};
use crate::config::StyleConfig;
use crate::error::StampError;
use image::{GrayImage, Luma, Rgba, RgbaImage};

/// Parsed, ready-to-draw form of [`StyleConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub text_color: Color,
    pub box_color: Color,
    pub box_opacity: f32,
    pub corner_radius: f32,
    pub shadow_color: Color,
    pub shadow_offset: (f32, f32),
    pub shadow_blur: f32,
    pub shadow_opacity: f32,
}

impl OverlayStyle {
    pub fn from_config(config: &StyleConfig) -> Result<Self, StampError> {
        Ok(Self {
            text_color: parse_hex_color(&config.text_color)?,
            box_color: parse_hex_color(&config.box_color)?,
            box_opacity: config.box_opacity,
            corner_radius: config.corner_radius,
            shadow_color: parse_hex_color(&config.shadow_color)?,
            shadow_offset: (config.shadow_offset_x, config.shadow_offset_y),
            shadow_blur: config.shadow_blur,
            shadow_opacity: config.shadow_opacity,
        })
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            text_color: Color::black(),
            box_color: Color::white(),
            box_opacity: 0.95,
            corner_radius: 4.0,
            shadow_color: Color::black(),
            shadow_offset: (2.0, 2.0),
            shadow_blur: 2.0,
            shadow_opacity: 0.3,
        }
    }
}

/// Render the complete overlay for one image.
pub fn render_overlay(
    image: &ImageDimensions,
    layout: &OverlayLayout,
    text: &str,
    font: &StampFont,
    style: &OverlayStyle,
) -> RgbaImage {
    let mut layer = render_box_layer(image, layout, style);
    draw_text_right_aligned(
        &mut layer,
        font,
        text,
        layout.font_size,
        layout.text_anchor,
        style.text_color,
    );
    layer
}

/// Render only the shadow and background box.
pub fn render_box_layer(
    image: &ImageDimensions,
    layout: &OverlayLayout,
    style: &OverlayStyle,
) -> RgbaImage {
    let mut layer = RgbaImage::new(image.width, image.height);

    let shadow_alpha = style.box_opacity * style.shadow_opacity;
    if shadow_alpha > 0.0 {
        draw_drop_shadow(&mut layer, &layout.box_rect, style, shadow_alpha);
    }

    fill_rounded_rect(
        &mut layer,
        &layout.box_rect,
        style.corner_radius,
        style.box_color.with_opacity(style.box_opacity),
    );

    layer
}

/// Fraction of the pixel at (`px`, `py`) covered by the rounded rectangle.
///
/// Uses the signed distance from the pixel center, which gives a one pixel
/// wide anti-aliased edge.
pub fn rounded_rect_coverage(rect: &Rect, radius: f32, px: u32, py: u32) -> f32 {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return 0.0;
    }

    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    let r = radius.max(0.0).min(half_w).min(half_h);

    let cx = rect.x + half_w;
    let cy = rect.y + half_h;
    let qx = (px as f32 + 0.5 - cx).abs() - (half_w - r);
    let qy = (py as f32 + 0.5 - cy).abs() - (half_h - r);

    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    let distance = outside + inside - r;

    (0.5 - distance).clamp(0.0, 1.0)
}

/// Fill a rounded rectangle, blending over existing layer content.
pub fn fill_rounded_rect(layer: &mut RgbaImage, rect: &Rect, radius: f32, color: Rgba<u8>) {
    let dims = ImageDimensions {
        width: layer.width(),
        height: layer.height(),
    };
    let (x0, y0, x1, y1) = rect.pixel_bounds(1.0, &dims);

    for y in y0..y1 {
        for x in x0..x1 {
            let coverage = rounded_rect_coverage(rect, radius, x, y);
            if coverage <= 0.0 {
                continue;
            }
            let existing = *layer.get_pixel(x, y);
            layer.put_pixel(x, y, blend_pixels(existing, color, coverage));
        }
    }
}

/// Draw a gaussian-blurred, offset copy of the box shape.
fn draw_drop_shadow(layer: &mut RgbaImage, rect: &Rect, style: &OverlayStyle, alpha: f32) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }

    let (dx, dy) = style.shadow_offset;
    let sigma = style.shadow_blur.max(0.0);
    let margin = (sigma * 3.0).ceil() + 1.0;

    // The shadow is rendered into a small patch rather than the full layer
    let origin_x = (rect.x + dx - margin).floor();
    let origin_y = (rect.y + dy - margin).floor();
    let local = rect.translate(dx - origin_x, dy - origin_y);

    let patch_w = (rect.width + margin * 2.0).ceil() as u32 + 2;
    let patch_h = (rect.height + margin * 2.0).ceil() as u32 + 2;

    let mut mask = GrayImage::new(patch_w, patch_h);
    for (x, y, pixel) in mask.enumerate_pixels_mut() {
        let coverage = rounded_rect_coverage(&local, style.corner_radius, x, y);
        *pixel = Luma([(coverage * 255.0).round() as u8]);
    }

    let mask = if sigma > 0.0 {
        image::imageops::blur(&mask, sigma)
    } else {
        mask
    };

    let shadow = RgbaImage::from_fn(patch_w, patch_h, |x, y| {
        let coverage = mask.get_pixel(x, y)[0] as f32 / 255.0;
        style.shadow_color.with_opacity(coverage * alpha)
    });

    blend_region(layer, &shadow, origin_x as i32, origin_y as i32, 1.0);
}
