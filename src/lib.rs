// Photostamp Library
// Burns an image's modification time into the image as a text overlay

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod stamp;

pub use batch::{BatchDriver, BatchReport};
pub use config::StampConfig;
pub use error::StampError;
pub use stamp::{StampOutcome, Stamper};
