//! # Normalisation
//!
//! Conversion of scaled `H x W x 3` images into the `[1, 3, H, W]` tensor layout consumed by
//! stereo models.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::{Array4, ArrayView3};

use crate::error::*;
use crate::resize::CHANNELS;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Per-channel affine normalisation, `(value * scale - mean) / std`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub scale: f32,
    pub mean: [f32; 3],
    pub std: [f32; 3]
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Normalization {
    /// ImageNet channel statistics. Intensities are mapped from `[0, 255]` into `[0, 1]` first.
    pub const fn imagenet() -> Self {
        Self {
            scale: 1.0 / 255.0,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225]
        }
    }

    /// Normalise an image into a channel-first tensor with a leading batch dimension of 1.
    pub fn apply(&self, image: ArrayView3<f32>) -> Result<Array4<f32>> {
        let (height, width, channels) = image.dim();
        if channels < CHANNELS {
            return Err(Error::InvalidInput(format!(
                "cannot normalise image with {} channels",
                channels
            )));
        }

        Ok(Array4::from_shape_fn((1, CHANNELS, height, width), |(_, c, y, x)| {
            (image[[y, x, c]] * self.scale - self.mean[c]) / self.std[c]
        }))
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::imagenet()
    }
}
