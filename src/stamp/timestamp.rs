//! Modification time lookup and formatting.
//!
//! The displayed string is produced from a fixed chrono format string
//! (`%m/%d/%Y, %H:%M:%S` by default) so output never depends on host locale
//! settings. The timezone is an explicit configuration choice.

use crate::config::{TimestampConfig, TimestampZone};
use crate::error::StampError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Write as _;
use std::path::Path;
use std::time::SystemTime;

/// Reads the file's last-modified time. Never cached.
pub async fn read_modified_time(path: &Path) -> Result<SystemTime, StampError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| StampError::io(path, e))?;
    metadata.modified().map_err(|e| StampError::io(path, e))
}

/// Returns true when `format` contains no invalid strftime specifiers.
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Formats an instant in the given timezone.
pub fn format_in_zone<Tz>(time: &DateTime<Tz>, format: &str) -> Result<String, StampError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if !is_valid_format(format) {
        return Err(StampError::Config(format!(
            "invalid timestamp format '{}'",
            format
        )));
    }

    let mut out = String::new();
    write!(out, "{}", time.format(format))
        .map_err(|_| StampError::Config(format!("invalid timestamp format '{}'", format)))?;
    Ok(out)
}

/// Formats a filesystem time according to the configuration.
pub fn format_timestamp(time: SystemTime, config: &TimestampConfig) -> Result<String, StampError> {
    match config.timezone {
        TimestampZone::Local => format_in_zone(&DateTime::<Local>::from(time), &config.format),
        TimestampZone::Utc => format_in_zone(&DateTime::<Utc>::from(time), &config.format),
    }
}
