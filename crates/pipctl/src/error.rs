//! Error handling for the pipctl crate.

use std::{io, path::PathBuf, result};

use thiserror::Error;

/// Convenient result type for pipctl operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running pipctl.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The PiP configuration failed to load.
    #[error("Configuration error: {}", .0.pretty())]
    Config(#[from] pip_config::Error),
    /// The scenario file failed to parse.
    #[error("Scenario {path}: {message}")]
    Scenario {
        /// Scenario file, or `<inline>` for text.
        path: PathBuf,
        /// Parser message including the location.
        message: String,
    },
    /// A step could not be carried out.
    #[error("Step {index} ({step}): {message}")]
    Step {
        /// Zero-based step index.
        index: usize,
        /// Step name.
        step: String,
        /// What went wrong.
        message: String,
    },
    /// Snap fractions did not round-trip within tolerance.
    #[error("Snap round trip drifted by {error} at fraction {fraction}")]
    SnapDrift {
        /// Input fraction.
        fraction: f32,
        /// Absolute error.
        error: f32,
    },
}
