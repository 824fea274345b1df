//! # Disparity Labelling
//!
//! This crate drives stereo models over datasets of rectified image pairs to produce disparity
//! labels. It takes care of everything around the model: resolution scaling, normalisation,
//! stride alignment, disparity range configuration and mapping the prediction back onto the
//! original image.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod checkpoint;
pub mod config;
pub mod dataset;
mod disparity;
mod error;
pub mod mcmanamon;
pub mod normalize;
pub mod output;
pub mod padding;
pub mod pipeline;
pub mod postprocess;
pub mod range;
pub mod resize;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use crate::error::{Error, Result};

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::dataset::{ImagePair, PairSource, Pairing};
    pub use crate::disparity::{ModelOptions, OutputArtifact, PredictedField, StereoModel};
    pub use crate::pipeline::Pipeline;
    pub use crate::range::{configure, DisparityConfig};
}
