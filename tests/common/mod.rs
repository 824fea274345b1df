//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::Path;

use cv_disparity_label::{checkpoint::Checkpoint, prelude::*, Result};
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array4};

/// Everything a [`MockModel`] was handed.
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub shapes: Vec<Vec<usize>>,
    pub max_disps: Vec<u32>,
    pub left_means: Vec<f32>,
    pub right_means: Vec<f32>,
    pub checkpoint: Option<Checkpoint>,
    pub releases: usize
}

/// Stereo model returning a constant disparity, optionally with an invalid block.
pub struct MockModel {
    pub options: ModelOptions,
    pub disparity: f32,
    /// `(row, col, size)` block of NaN in padded coordinates.
    pub invalid_block: Option<(usize, usize, usize)>,
    pub calls: Calls
}

impl MockModel {
    pub fn new(options: ModelOptions, disparity: f32) -> Self {
        Self {
            options,
            disparity,
            invalid_block: None,
            calls: Calls::default()
        }
    }
}

impl StereoModel for MockModel {
    fn infer(
        &mut self,
        left: &Array4<f32>,
        right: &Array4<f32>,
        config: &DisparityConfig
    ) -> Result<PredictedField> {
        let (_, _, height, width) = left.dim();

        self.calls.shapes.push(left.shape().to_vec());
        self.calls.max_disps.push(config.max_disp());
        self.calls.left_means.push(left.mean().unwrap_or(0.0));
        self.calls.right_means.push(right.mean().unwrap_or(0.0));

        let mut disparity = Array2::from_elem((height, width), self.disparity);
        if let Some((row, col, size)) = self.invalid_block {
            for y in row..row + size {
                for x in col..col + size {
                    disparity[[y, x]] = f32::NAN;
                }
            }
        }

        Ok(PredictedField {
            disparity,
            entropy: Array2::zeros((height, width))
        })
    }

    fn load_checkpoint(&mut self, checkpoint: Checkpoint) -> Result<()> {
        self.calls.checkpoint = Some(checkpoint);
        Ok(())
    }

    fn release_buffers(&mut self) {
        self.calls.releases += 1;
    }
}

/// Textured RGB image whose content depends on `seed`.
pub fn textured(width: u32, height: u32, seed: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = (x * 7 + y * 13 + seed * 31) % 256;
        Rgb([v as u8, (255 - v) as u8, ((v * 3) % 256) as u8])
    })
}

/// Uniform RGB image.
pub fn flat(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

pub fn save(image: &RgbImage, dir: &Path, name: &str) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    image.save(dir.join(name))?;
    Ok(())
}
