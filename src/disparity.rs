//! # General disparity objects
//!
//! This module provides the stereo model trait and the disparity structures passed between the
//! pipeline stages.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;
use log::debug;
use ndarray::{Array2, Array4};

use crate::checkpoint::Checkpoint;
use crate::error::*;
use crate::range::DisparityConfig;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Raw model output at padded resolution.
///
/// Non-finite disparities mark pixels without an estimate.
#[derive(Debug, Clone)]
pub struct PredictedField {
    pub disparity: Array2<f32>,
    pub entropy: Array2<f32>
}

/// Options the stereo model is constructed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    /// Entropy above which the model discards its estimate. Non-positive disables cleanup.
    pub clean: f32,
    /// Output stage, 1 being the finest.
    pub level: u8
}

/// Disparity map of a single sample at the original image resolution.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub name: String,
    /// Disparity in original resolution pixels, `+inf` where invalid.
    pub disparity: Array2<f32>,
    /// Entropy at inference resolution, padding removed.
    pub entropy: Array2<f32>
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait StereoModel {
    /// Estimate disparity and entropy for a padded `[1, 3, H, W]` pair.
    ///
    /// Both returned fields must be `H x W`.
    fn infer(
        &mut self,
        left: &Array4<f32>,
        right: &Array4<f32>,
        config: &DisparityConfig
    ) -> Result<PredictedField>;

    /// Restore pretrained weights.
    fn load_checkpoint(&mut self, checkpoint: Checkpoint) -> Result<()> {
        debug!(
            "Model has no learnable parameters, ignoring {} checkpoint entries",
            checkpoint.state_dict.len()
        );
        Ok(())
    }

    /// Free per-sample buffers held by the model.
    fn release_buffers(&mut self) {}

    fn parameter_count(&self) -> usize {
        0
    }
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            clean: -1.0,
            level: 1
        }
    }
}

impl OutputArtifact {
    /// Largest finite disparity in the map.
    pub fn max_valid(&self) -> Option<f32> {
        self.disparity
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(None, |max, d| match max {
                Some(m) if m >= d => Some(m),
                _ => Some(d)
            })
    }

    /// Converts the map to a greyscale image normalised by the maximum valid disparity.
    ///
    /// Invalid pixels are black.
    pub fn to_luma_normalised(&self) -> GrayImage {
        let (height, width) = self.disparity.dim();
        let mut new = GrayImage::new(width as u32, height as u32);

        let mult = match self.max_valid() {
            Some(d) if d > 0.0 => 255.0 / d,
            _ => 1.0
        };

        for y in 0..new.height() {
            for x in 0..new.width() {
                let raw = self.disparity[[y as usize, x as usize]];

                let mut val = if raw.is_finite() { raw * mult } else { 0.0 };

                if val < 0.0 {
                    val = 0.0;
                }
                else if val > 255.0 {
                    val = 255.0;
                }

                *new.get_pixel_mut(x, y) = image::Luma([val as u8]);
            }
        }

        new
    }
}
