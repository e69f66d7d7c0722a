//! Overlay geometry.
//!
//! Computes where the background box and the timestamp text go, as pure
//! functions of the image dimensions and the text.
//!
//! # Example
//!
//! ```ignore
//! use photostamp::config::LayoutConfig;
//! use photostamp::stamp::layout::{EstimatedMeasure, ImageDimensions, OverlayLayout};
//!
//! let config = LayoutConfig::default();
//! let image = ImageDimensions { width: 900, height: 600 };
//! let measure = EstimatedMeasure::new(config.width_factor);
//! let layout = OverlayLayout::compute(&image, "03/15/2024, 14:30:05", &config, &measure);
//! assert_eq!(layout.font_size, 30.0);
//! ```

use crate::config::LayoutConfig;

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// A point in image coordinates (sub-pixel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// An axis-aligned rectangle in image coordinates (sub-pixel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Integer pixel span `[x0, x1) x [y0, y1)` covered by the rectangle
    /// grown by `outset`, clamped to the image.
    pub fn pixel_bounds(&self, outset: f32, image: &ImageDimensions) -> (u32, u32, u32, u32) {
        let clamp = |v: f32, max: u32| v.clamp(0.0, max as f32) as u32;
        (
            clamp((self.x - outset).floor(), image.width),
            clamp((self.y - outset).floor(), image.height),
            clamp((self.right() + outset).ceil(), image.width),
            clamp((self.bottom() + outset).ceil(), image.height),
        )
    }
}

/// Measures the advance width of a string at a given font size.
///
/// The box width is derived through this trait so the heuristic can be
/// swapped for exact glyph metrics without touching the layout math.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f32) -> f32;
}

/// Heuristic width: `chars * font_size * width_factor`.
///
/// Known limitation: this ignores real glyph shapes, so the box may be
/// slightly wider or narrower than the rendered text.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMeasure {
    width_factor: f32,
}

impl EstimatedMeasure {
    pub fn new(width_factor: f32) -> Self {
        Self { width_factor }
    }
}

impl TextMeasure for EstimatedMeasure {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.width_factor
    }
}

/// Font size for an image width: `clamp(width / divisor, min, max)`.
///
/// The value is not rounded.
pub fn compute_font_size(image_width: u32, config: &LayoutConfig) -> f32 {
    (image_width as f32 / config.width_divisor)
        .min(config.max_font_size)
        .max(config.min_font_size)
}

/// Derived geometry for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub font_size: f32,
    pub text_width: f32,
    pub text_height: f32,
    /// Background box
    pub box_rect: Rect,
    /// Right end of the text baseline
    pub text_anchor: Point,
}

impl OverlayLayout {
    /// Lay out the overlay anchored to the bottom-right corner.
    pub fn compute(
        image: &ImageDimensions,
        text: &str,
        config: &LayoutConfig,
        measure: &dyn TextMeasure,
    ) -> Self {
        let w = image.width as f32;
        let h = image.height as f32;
        let padding = config.padding;
        let inset = config.box_padding;

        let font_size = compute_font_size(image.width, config);
        let text_width = measure.measure(text, font_size);
        let text_height = font_size;

        let box_rect = Rect {
            x: w - padding - text_width - inset * 2.0,
            y: h - padding - text_height - inset,
            width: text_width + inset * 2.0,
            height: text_height + inset * 2.0,
        };

        let text_anchor = Point {
            x: w - padding - inset,
            y: h - padding - inset / 2.0,
        };

        Self {
            font_size,
            text_width,
            text_height,
            box_rect,
            text_anchor,
        }
    }
}
