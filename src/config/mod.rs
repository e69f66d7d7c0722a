// Configuration module
//
// Every constant that shapes the overlay lives here as a named field with a
// documented default, so callers and tests can override any of them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::StampError;
use crate::stamp::encoder::OutputFormat;
use crate::stamp::timestamp::is_valid_format;

// Default values
fn default_padding() -> f32 {
    20.0
}

fn default_box_padding() -> f32 {
    7.0
}

fn default_min_font_size() -> f32 {
    16.0
}

fn default_max_font_size() -> f32 {
    48.0
}

fn default_width_divisor() -> f32 {
    30.0
}

fn default_width_factor() -> f32 {
    0.52
}

fn default_text_color() -> String {
    "#000000".to_string()
}

fn default_box_color() -> String {
    "#FFFFFF".to_string()
}

fn default_box_opacity() -> f32 {
    0.95
}

fn default_corner_radius() -> f32 {
    4.0
}

fn default_shadow_offset() -> f32 {
    2.0
}

fn default_shadow_blur() -> f32 {
    2.0
}

fn default_shadow_opacity() -> f32 {
    0.3
}

fn default_shadow_color() -> String {
    "#000000".to_string()
}

fn default_timestamp_format() -> String {
    "%m/%d/%Y, %H:%M:%S".to_string()
}

fn default_quality() -> u8 {
    90
}

fn default_prefix() -> String {
    "timestamped_".to_string()
}

fn default_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "webp", "tiff"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Top-level configuration for the stamper and batch driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    pub layout: LayoutConfig,
    pub style: StyleConfig,
    pub timestamp: TimestampConfig,
    pub font: FontConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
}

/// How the background box width is derived from the timestamp text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureStrategy {
    /// `chars * font_size * width_factor` (reference behavior)
    #[default]
    Estimate,
    /// Exact advance widths from the loaded font
    Glyph,
}

/// Geometry of the overlay relative to the image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Distance from the image's right and bottom edges (default: 20)
    #[serde(default = "default_padding")]
    pub padding: f32,

    /// Inset between the box edge and the text (default: 7)
    #[serde(default = "default_box_padding")]
    pub box_padding: f32,

    /// Lower font size bound in pixels (default: 16)
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f32,

    /// Upper font size bound in pixels (default: 48)
    #[serde(default = "default_max_font_size")]
    pub max_font_size: f32,

    /// Font size is `image width / width_divisor` before clamping (default: 30)
    #[serde(default = "default_width_divisor")]
    pub width_divisor: f32,

    /// Average glyph width as a fraction of font size (default: 0.52)
    #[serde(default = "default_width_factor")]
    pub width_factor: f32,

    /// Text width measurement strategy (default: estimate)
    #[serde(default)]
    pub measure: MeasureStrategy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            box_padding: default_box_padding(),
            min_font_size: default_min_font_size(),
            max_font_size: default_max_font_size(),
            width_divisor: default_width_divisor(),
            width_factor: default_width_factor(),
            measure: MeasureStrategy::default(),
        }
    }
}

/// Colors and effects of the overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Text color as hex string (default: "#000000")
    #[serde(default = "default_text_color")]
    pub text_color: String,

    /// Background box color as hex string (default: "#FFFFFF")
    #[serde(default = "default_box_color")]
    pub box_color: String,

    /// Background box opacity, 0.0 to 1.0 (default: 0.95)
    #[serde(default = "default_box_opacity")]
    pub box_opacity: f32,

    /// Corner radius of the background box (default: 4)
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f32,

    /// Horizontal drop shadow offset (default: 2)
    #[serde(default = "default_shadow_offset")]
    pub shadow_offset_x: f32,

    /// Vertical drop shadow offset (default: 2)
    #[serde(default = "default_shadow_offset")]
    pub shadow_offset_y: f32,

    /// Gaussian blur sigma of the shadow (default: 2)
    #[serde(default = "default_shadow_blur")]
    pub shadow_blur: f32,

    /// Shadow opacity, 0.0 to 1.0 (default: 0.3)
    #[serde(default = "default_shadow_opacity")]
    pub shadow_opacity: f32,

    /// Shadow color as hex string (default: "#000000")
    #[serde(default = "default_shadow_color")]
    pub shadow_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            text_color: default_text_color(),
            box_color: default_box_color(),
            box_opacity: default_box_opacity(),
            corner_radius: default_corner_radius(),
            shadow_offset_x: default_shadow_offset(),
            shadow_offset_y: default_shadow_offset(),
            shadow_blur: default_shadow_blur(),
            shadow_opacity: default_shadow_opacity(),
            shadow_color: default_shadow_color(),
        }
    }
}

/// Timezone used when rendering the modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    /// Host local time (reference behavior)
    #[default]
    Local,
    Utc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampConfig {
    /// chrono format string (default: "%m/%d/%Y, %H:%M:%S")
    #[serde(default = "default_timestamp_format")]
    pub format: String,

    #[serde(default)]
    pub timezone: TimestampZone,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            format: default_timestamp_format(),
            timezone: TimestampZone::default(),
        }
    }
}

/// Font selection. When `path` is unset, well-known bold sans-serif fonts
/// are searched in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Where single-file mode writes when no output path is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLocation {
    /// Beside the input file
    #[default]
    InputDir,
    /// In the process working directory
    CurrentDir,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Encoding of every written image (default: jpeg)
    #[serde(default)]
    pub format: OutputFormat,

    /// Lossy quality 1-100 (default: 90)
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Filename prefix for the default single-file output (default: "timestamped_")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub location: OutputLocation,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: default_quality(),
            prefix: default_prefix(),
            location: OutputLocation::default(),
        }
    }
}

/// What the batch driver does when one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Record the failure and move on
    #[default]
    Continue,
    /// Stop at the first failure
    Abort,
}

/// How batch output filenames relate to the output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionPolicy {
    /// Keep the input filename unchanged
    #[default]
    Preserve,
    /// Replace the extension with the output format's extension
    MatchFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Extensions (without dot) selected case-insensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub on_error: ErrorPolicy,

    #[serde(default)]
    pub output_extension: ExtensionPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            on_error: ErrorPolicy::default(),
            output_extension: ExtensionPolicy::default(),
        }
    }
}

static ENV_VAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn env_var_pattern() -> &'static Regex {
    ENV_VAR_PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("Invalid env var regex - this is a bug")
    })
}

fn validate_hex_color(field: &str, value: &str) -> Result<(), String> {
    match value.strip_prefix('#') {
        Some(hex) if (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            Ok(())
        }
        _ => Err(format!(
            "{} must be in #RGB or #RRGGBB format, got '{}'",
            field, value
        )),
    }
}

fn validate_unit_interval(field: &str, value: f32) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(format!(
            "{} must be a finite value between 0.0 and 1.0, got {}",
            field, value
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: f32) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be a finite non-negative value, got {}", field, value));
    }
    Ok(())
}

impl StampConfig {
    /// Parse YAML, substituting `${VAR_NAME}` references from the environment.
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, StampError> {
        let re = env_var_pattern();

        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                StampError::Config(format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                ))
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        // An empty document means "all defaults"
        if substituted.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| StampError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StampError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| StampError::io(path, e))?;
        let config = Self::from_yaml_with_env(&yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StampError> {
        self.validate_inner().map_err(StampError::Config)
    }

    fn validate_inner(&self) -> Result<(), String> {
        let layout = &self.layout;
        validate_non_negative("layout.padding", layout.padding)?;
        validate_non_negative("layout.box_padding", layout.box_padding)?;

        if !layout.min_font_size.is_finite() || layout.min_font_size <= 0.0 {
            return Err(format!(
                "layout.min_font_size must be positive, got {}",
                layout.min_font_size
            ));
        }
        if !layout.max_font_size.is_finite() || layout.max_font_size < layout.min_font_size {
            return Err(format!(
                "layout.max_font_size ({}) must be >= layout.min_font_size ({})",
                layout.max_font_size, layout.min_font_size
            ));
        }
        if !layout.width_divisor.is_finite() || layout.width_divisor <= 0.0 {
            return Err(format!(
                "layout.width_divisor must be positive, got {}",
                layout.width_divisor
            ));
        }
        if !layout.width_factor.is_finite() || layout.width_factor <= 0.0 {
            return Err(format!(
                "layout.width_factor must be positive, got {}",
                layout.width_factor
            ));
        }

        let style = &self.style;
        validate_hex_color("style.text_color", &style.text_color)?;
        validate_hex_color("style.box_color", &style.box_color)?;
        validate_hex_color("style.shadow_color", &style.shadow_color)?;
        validate_unit_interval("style.box_opacity", style.box_opacity)?;
        validate_unit_interval("style.shadow_opacity", style.shadow_opacity)?;
        validate_non_negative("style.corner_radius", style.corner_radius)?;
        validate_non_negative("style.shadow_blur", style.shadow_blur)?;
        if !style.shadow_offset_x.is_finite() || !style.shadow_offset_y.is_finite() {
            return Err("style.shadow_offset_x/y must be finite".to_string());
        }

        if self.timestamp.format.trim().is_empty() {
            return Err("timestamp.format cannot be empty".to_string());
        }
        if !is_valid_format(&self.timestamp.format) {
            return Err(format!(
                "timestamp.format '{}' contains an invalid specifier",
                self.timestamp.format
            ));
        }

        if !(1..=100).contains(&self.output.quality) {
            return Err(format!(
                "output.quality must be between 1 and 100, got {}",
                self.output.quality
            ));
        }
        if self.output.prefix.contains(['/', '\\']) {
            return Err(format!(
                "output.prefix cannot contain path separators, got '{}'",
                self.output.prefix
            ));
        }

        if self.batch.extensions.is_empty() {
            return Err("batch.extensions cannot be empty".to_string());
        }
        for ext in &self.batch.extensions {
            if ext.is_empty() || ext.starts_with('.') || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(format!(
                    "batch.extensions entries must be alphanumeric without a leading dot, got '{}'",
                    ext
                ));
            }
        }

        Ok(())
    }
}
