//! Timestamp text rendering.
//!
//! Loads a bold sans-serif TrueType font from disk and draws text
//! right-aligned on a baseline, anti-aliased, onto an RGBA layer.
//!
//! # Example
//!
//! ```ignore
//! use photostamp::config::FontConfig;
//! use photostamp::stamp::text_renderer::{draw_text_right_aligned, parse_hex_color, StampFont};
//!
//! let font = StampFont::resolve(&FontConfig::default())?;
//! let black = parse_hex_color("#000")?;
//! draw_text_right_aligned(&mut layer, &font, "03/15/2024, 14:30:05", 26.0, anchor, black);
//! ```

use super::compositor::blend_pixels;
use super::layout::{Point, TextMeasure};
use crate::config::FontConfig;
use crate::error::StampError;
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Bold sans-serif fonts searched when no font path is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// RGB color parsed from a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// RGBA pixel with the given opacity (0.0 to 1.0).
    pub fn with_opacity(&self, opacity: f32) -> Rgba<u8> {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([self.r, self.g, self.b, alpha])
    }
}

/// Parse a hex color string (#RGB or #RRGGBB).
pub fn parse_hex_color(hex: &str) -> Result<Color, StampError> {
    let invalid = || StampError::Config(format!("Invalid hex color '{}'", hex));

    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let component = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    match digits.len() {
        // Each digit is doubled: 0xF -> 0xFF
        3 => Ok(Color::new(
            component(&digits[0..1])? * 17,
            component(&digits[1..2])? * 17,
            component(&digits[2..3])? * 17,
        )),
        6 => Ok(Color::new(
            component(&digits[0..2])?,
            component(&digits[2..4])?,
            component(&digits[4..6])?,
        )),
        _ => Err(invalid()),
    }
}

/// A loaded font, cheap to clone.
#[derive(Clone)]
pub struct StampFont {
    font: FontArc,
    source: PathBuf,
}

impl std::fmt::Debug for StampFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StampFont")
            .field("source", &self.source)
            .finish()
    }
}

impl StampFont {
    /// Load a TrueType/OpenType font file.
    pub fn load(path: &Path) -> Result<Self, StampError> {
        let data = std::fs::read(path).map_err(|e| StampError::io(path, e))?;
        let font = FontArc::try_from_vec(data).map_err(|e| {
            StampError::Font(format!("{} is not a usable font: {}", path.display(), e))
        })?;

        Ok(Self {
            font,
            source: path.to_path_buf(),
        })
    }

    /// Load the configured font, or the first available candidate.
    pub fn resolve(config: &FontConfig) -> Result<Self, StampError> {
        if let Some(path) = &config.path {
            return Self::load(path);
        }

        for candidate in FONT_CANDIDATES {
            let path = Path::new(candidate);
            if !path.is_file() {
                continue;
            }
            match Self::load(path) {
                Ok(font) => return Ok(font),
                Err(e) => tracing::debug!(font = %path.display(), error = %e, "Skipping font candidate"),
            }
        }

        Err(StampError::Font(
            "no bold sans-serif font found; set font.path in the configuration".to_string(),
        ))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Scale that makes one em equal `font_size` pixels.
    pub fn scale_for(&self, font_size: f32) -> PxScale {
        let height = self.font.height_unscaled();
        match self.font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 && height > 0.0 => {
                PxScale::from(font_size * height / units_per_em)
            }
            _ => PxScale::from(font_size),
        }
    }

    /// Exact advance width of `text` including kerning.
    pub fn advance_width(&self, text: &str, font_size: f32) -> f32 {
        let scaled = self.font.as_scaled(self.scale_for(font_size));

        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }
}

impl TextMeasure for StampFont {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        self.advance_width(text, font_size)
    }
}

/// Draw `text` so that its advance ends at `anchor.x` and its baseline sits
/// on `anchor.y`. Pixels outside the layer are dropped.
pub fn draw_text_right_aligned(
    layer: &mut RgbaImage,
    font: &StampFont,
    text: &str,
    font_size: f32,
    anchor: Point,
    color: Color,
) {
    let scale = font.scale_for(font_size);
    let scaled = font.font.as_scaled(scale);

    let mut cursor_x = anchor.x - font.advance_width(text, font_size);
    let mut prev: Option<GlyphId> = None;

    let (layer_w, layer_h) = (layer.width() as i32, layer.height() as i32);

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            cursor_x += scaled.kern(prev, id);
        }

        let glyph = id.with_scale_and_position(scale, ab_glyph::point(cursor_x, anchor.y));
        if let Some(outlined) = font.font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x < 0 || y < 0 || x >= layer_w || y >= layer_h {
                    return;
                }

                let pixel = color.with_opacity(coverage);
                let existing = *layer.get_pixel(x as u32, y as u32);
                layer.put_pixel(x as u32, y as u32, blend_pixels(existing, pixel, 1.0));
            });
        }

        cursor_x += scaled.h_advance(id);
        prev = Some(id);
    }
}
