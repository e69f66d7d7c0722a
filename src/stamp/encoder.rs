//! Output encoder abstraction
//!
//! Provides a trait-based encoder system that allows:
//! - Swapping the output encoding through configuration
//! - Consistent quality settings across formats

use crate::error::StampError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Encoding of written images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// Canonical filename extension, used when batch output renames files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// Trait for output encoders
///
/// Implementations turn a composited RGBA buffer into file bytes.
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode the composited image
    ///
    /// `quality` is 1-100; lossless encoders ignore it.
    fn encode(&self, image: &RgbaImage, quality: u8) -> Result<Vec<u8>, StampError>;
}

/// JPEG encoder using the image crate
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(&self, image: &RgbaImage, quality: u8) -> Result<Vec<u8>, StampError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        // JPEG has no alpha channel
        let rgb_data = flatten_over_black(image.as_raw());

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));

        encoder
            .write_image(
                &rgb_data,
                image.width(),
                image.height(),
                image::ColorType::Rgb8,
            )
            .map_err(|e| StampError::encode("jpeg", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(&self, image: &RgbaImage, _quality: u8) -> Result<Vec<u8>, StampError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )
            .map_err(|e| StampError::encode("png", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// WebP encoder using the image crate
///
/// Note: The `image` crate only supports lossless WebP encoding.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(&self, image: &RgbaImage, _quality: u8) -> Result<Vec<u8>, StampError> {
        use image::codecs::webp::WebPEncoder as ImageWebPEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageWebPEncoder::new_lossless(&mut output);

        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )
            .map_err(|e| StampError::encode("webp", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: OutputFormat) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder),
            OutputFormat::Png => Box::new(PngEncoder),
            OutputFormat::WebP => Box::new(WebPEncoder),
        }
    }
}

/// Convert RGBA to RGB, compositing each pixel over an opaque black
/// background: `c * a / 255`, rounded.
fn flatten_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for chunk in rgba.chunks_exact(4) {
        let alpha = chunk[3] as u32;
        rgb.extend(
            chunk[..3]
                .iter()
                .map(|&c| ((c as u32 * alpha + 127) / 255) as u8),
        );
    }
    rgb
}
