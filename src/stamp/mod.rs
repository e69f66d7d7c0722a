//! Single-image stamper.
//!
//! Reads an image's modification time and burns it into the bottom-right
//! corner of the image as bold text on a rounded, semi-transparent box with
//! a soft drop shadow.
//!
//! # Pipeline
//!
//! 1. Read the file's mtime (fresh on every call)
//! 2. Format it with a fixed chrono format string
//! 3. Decode the image
//! 4. Compute the [`OverlayLayout`] from the image width and the text
//! 5. Render the overlay at the image's exact dimensions
//! 6. Composite, encode and write atomically to the output path
//!
//! # Example
//!
//! ```ignore
//! use photostamp::config::StampConfig;
//! use photostamp::stamp::Stamper;
//!
//! let stamper = Stamper::new(StampConfig::default())?;
//! let outcome = stamper.stamp("photo.jpg".as_ref(), "timestamped_photo.jpg".as_ref()).await?;
//! println!("{}", outcome.timestamp);
//! ```

pub mod compositor;
pub mod encoder;
pub mod layout;
pub mod output;
pub mod overlay;
pub mod text_renderer;
pub mod timestamp;

pub use compositor::{blend_pixels, blend_region, composite_overlay};
pub use encoder::{EncoderFactory, ImageEncoder, OutputFormat};
pub use layout::{
    compute_font_size, EstimatedMeasure, ImageDimensions, OverlayLayout, Point, Rect, TextMeasure,
};
pub use output::{default_output_path, write_atomic};
pub use overlay::{render_box_layer, render_overlay, OverlayStyle};
pub use text_renderer::{parse_hex_color, Color, StampFont};
pub use timestamp::{format_timestamp, read_modified_time};

use crate::config::{MeasureStrategy, StampConfig};
use crate::error::StampError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of stamping one image.
#[derive(Debug, Clone)]
pub struct StampOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    /// The rendered timestamp text
    pub timestamp: String,
    pub dimensions: ImageDimensions,
    pub layout: OverlayLayout,
    pub format: OutputFormat,
    pub bytes_written: usize,
}

/// An encoded, stamped image that has not been written yet.
#[derive(Debug)]
pub struct RenderedImage {
    pub data: Vec<u8>,
    pub dimensions: ImageDimensions,
    pub layout: OverlayLayout,
}

/// Stamps modification times onto images. Holds the loaded font so batch
/// runs only read it once.
#[derive(Debug, Clone)]
pub struct Stamper {
    config: Arc<StampConfig>,
    font: StampFont,
    style: OverlayStyle,
}

impl Stamper {
    /// Load the font the configuration names and build a stamper around it.
    pub fn new(config: StampConfig) -> Result<Self, StampError> {
        let font = StampFont::resolve(&config.font)?;
        Self::with_font(config, font)
    }

    /// Build a stamper around an already loaded font. The configuration is
    /// validated here.
    pub fn with_font(config: StampConfig, font: StampFont) -> Result<Self, StampError> {
        config.validate()?;
        let style = OverlayStyle::from_config(&config.style)?;

        tracing::debug!(font = %font.source().display(), "Stamper initialized");

        Ok(Self {
            config: Arc::new(config),
            font,
            style,
        })
    }

    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    pub fn font(&self) -> &StampFont {
        &self.font
    }

    /// Stamp `input`'s modification time onto it and write the result to
    /// `output`, replacing any existing file. The parent directory of
    /// `output` must already exist.
    pub async fn stamp(&self, input: &Path, output: &Path) -> Result<StampOutcome, StampError> {
        let modified = read_modified_time(input).await?;
        let text = format_timestamp(modified, &self.config.timestamp)?;

        let data = tokio::fs::read(input)
            .await
            .map_err(|e| StampError::io(input, e))?;

        let config = Arc::clone(&self.config);
        let font = self.font.clone();
        let style = self.style;
        let input_path = input.to_path_buf();
        let render_text = text.clone();

        let rendered = tokio::task::spawn_blocking(move || {
            render_stamped(&data, &input_path, &render_text, &config, &font, &style)
        })
        .await
        .map_err(|e| StampError::Composite(format!("render task failed: {}", e)))??;

        write_atomic(output, &rendered.data).await?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            timestamp = %text,
            width = rendered.dimensions.width,
            height = rendered.dimensions.height,
            font_size = rendered.layout.font_size,
            "Added timestamp to image"
        );

        Ok(StampOutcome {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            timestamp: text,
            dimensions: rendered.dimensions,
            layout: rendered.layout,
            format: self.config.output.format,
            bytes_written: rendered.data.len(),
        })
    }
}

/// Decode `data`, overlay `text` and encode the result. CPU-bound.
pub fn render_stamped(
    data: &[u8],
    source: &Path,
    text: &str,
    config: &StampConfig,
    font: &StampFont,
    style: &OverlayStyle,
) -> Result<RenderedImage, StampError> {
    let decoded = image::load_from_memory(data).map_err(|e| match e {
        image::ImageError::IoError(io) => StampError::io(source, io),
        other => StampError::decode(source, other.to_string()),
    })?;

    let mut canvas = decoded.to_rgba8();
    let dimensions = ImageDimensions {
        width: canvas.width(),
        height: canvas.height(),
    };

    let estimated = EstimatedMeasure::new(config.layout.width_factor);
    let measure: &dyn TextMeasure = match config.layout.measure {
        MeasureStrategy::Estimate => &estimated,
        MeasureStrategy::Glyph => font,
    };
    let layout = OverlayLayout::compute(&dimensions, text, &config.layout, measure);

    tracing::debug!(
        width = dimensions.width,
        height = dimensions.height,
        font_size = layout.font_size,
        box_x = layout.box_rect.x,
        box_y = layout.box_rect.y,
        box_width = layout.box_rect.width,
        box_height = layout.box_rect.height,
        "Computed overlay layout"
    );

    let overlay = render_overlay(&dimensions, &layout, text, font, style);
    composite_overlay(&mut canvas, &overlay)?;

    let encoder = EncoderFactory::create(config.output.format);
    let data = encoder.encode(&canvas, config.output.quality)?;

    Ok(RenderedImage {
        data,
        dimensions,
        layout,
    })
}
