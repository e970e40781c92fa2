use std::path::PathBuf;

use beltline_core::serialize::SerializeError;

/// Errors from the runner's file handling and control surface.
///
/// None of these ever reach the simulation itself: a failed save leaves the
/// in-memory world untouched and a bad save file degrades to a fresh world.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to parse a config or layout file.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The world could not be encoded for saving.
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// A numeric setting that cannot be used.
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    /// Speed multipliers must be positive.
    #[error("invalid speed multiplier {speed}")]
    InvalidSpeed { speed: f64 },
}
