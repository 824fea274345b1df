//! # Error standards
//!
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the disparity label crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A sample did not have the structure the pipeline requires (channels, sizes).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The run configuration is unusable. Raised before any sample is processed.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed checkpoint {path}: {reason}")]
    Checkpoint {
        path: String,
        reason: String
    },

    /// The stereo model failed or returned fields of the wrong shape.
    #[error("Model invocation failed: {0}")]
    Model(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Could not write disparity array: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError)
}
