// Error types module

use std::path::PathBuf;
use thiserror::Error;

/// Centralized error type for stamping operations
///
/// Every failure in the stamping pipeline maps onto one of these variants so
/// callers (the batch driver, the CLI) can report and classify them.
#[derive(Debug, Error)]
pub enum StampError {
    /// Filesystem failures: unreadable input, unwritable output, missing directory
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not a valid or supported image
    #[error("Failed to decode image {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Encoding the composited result failed
    #[error("Failed to encode to {format}: {message}")]
    Encode { format: String, message: String },

    /// Overlay could not be composited onto the source image
    #[error("Failed to composite overlay: {0}")]
    Composite(String),

    /// No usable font could be loaded
    #[error("Font error: {0}")]
    Font(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line usage
    #[error("Usage error: {0}")]
    Usage(String),
}

impl StampError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn encode(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Short machine-friendly category name, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Decode { .. } => "decode",
            Self::Encode { .. } => "encode",
            Self::Composite(_) => "composite",
            Self::Font(_) => "font",
            Self::Config(_) => "config",
            Self::Usage(_) => "usage",
        }
    }
}
