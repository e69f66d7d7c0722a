// Configuration unit tests exercising the public API

use photostamp::config::*;
use photostamp::stamp::OutputFormat;
use photostamp::StampError;

#[test]
fn test_full_yaml_config_round_trips_through_serde() {
    let yaml = r##"
layout:
  padding: 12
  box_padding: 5
  min_font_size: 10
  max_font_size: 64
  width_divisor: 25
  width_factor: 0.6
  measure: glyph
style:
  text_color: "#FFF"
  box_color: "#202020"
  box_opacity: 0.8
  corner_radius: 6
  shadow_offset_x: 3
  shadow_offset_y: 4
  shadow_blur: 1.5
  shadow_opacity: 0.5
  shadow_color: "#112233"
timestamp:
  format: "%d.%m.%Y %H:%M"
  timezone: local
output:
  format: webp
  quality: 80
  prefix: "stamped-"
  location: current-dir
batch:
  extensions: [jpg, heic]
  on_error: abort
  output_extension: match-format
"##;
    let config = StampConfig::from_yaml_with_env(yaml).expect("Failed to parse config");
    config.validate().expect("Config should be valid");

    assert_eq!(config.layout.padding, 12.0);
    assert_eq!(config.layout.measure, MeasureStrategy::Glyph);
    assert_eq!(config.style.text_color, "#FFF");
    assert_eq!(config.style.shadow_blur, 1.5);
    assert_eq!(config.timestamp.timezone, TimestampZone::Local);
    assert_eq!(config.output.format, OutputFormat::WebP);
    assert_eq!(config.output.prefix, "stamped-");
    assert_eq!(config.output.location, OutputLocation::CurrentDir);
    assert_eq!(config.batch.extensions, vec!["jpg", "heic"]);
    assert_eq!(config.batch.on_error, ErrorPolicy::Abort);
    assert_eq!(config.batch.output_extension, ExtensionPolicy::MatchFormat);

    let serialized = serde_yaml::to_string(&config).unwrap();
    let reparsed = StampConfig::from_yaml_with_env(&serialized).unwrap();
    assert_eq!(reparsed.output.format, OutputFormat::WebP);
    assert_eq!(reparsed.batch.output_extension, ExtensionPolicy::MatchFormat);
}

#[test]
fn test_unknown_enum_value_is_config_error() {
    let err = StampConfig::from_yaml_with_env("output:\n  format: bmp\n").unwrap_err();
    assert!(matches!(err, StampError::Config(_)));
}

#[test]
fn test_validation_reports_field_name() {
    let mut config = StampConfig::default();
    config.style.box_opacity = 1.5;

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("style.box_opacity"), "{}", err);
}

#[test]
fn test_max_font_below_min_is_rejected() {
    let mut config = StampConfig::default();
    config.layout.max_font_size = 8.0;
    assert!(config.validate().is_err());
}
