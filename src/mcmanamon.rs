//! # McManamon disparity computation
//!
//! This module provides a [`StereoModel`] built on McManamon's disparity algorithm from
//! ("EXOMARS ROVER VEHICLE PERCEPTION SYSTEM ARCHITECTURE AND TEST RESULTS")[http://robotics.estec.esa.int/ASTRA/Astra2013/Papers/Mcmanamon_2811324.pdf]
//!
//! The algorithm is a sum of absolute differences block matcher which walks the image bottom-up
//! and narrows the disparity search range of each row around the disparities found in the row
//! below it. The range never exceeds the configured maximum disparity.
//!
//! Matching costs are turned into a distribution over disparities whose entropy, measured on the
//! candidates of the regression of the configured output level, serves as the confidence map.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::ops::RangeInclusive;

use log::debug;
use ndarray::{Array2, Array4, ArrayView2, Axis};

use crate::disparity::{ModelOptions, PredictedField, StereoModel};
use crate::error::*;
use crate::range::{DisparityConfig, DisparityRegression, Scale};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct McManamon {
    params: Params,
    corr_window_x_range: RangeInclusive<isize>,
    corr_window_y_range: RangeInclusive<isize>,
    /// Per-pixel scratch distribution over disparities.
    probabilities: Vec<f32>,
    crits: Vec<f32>
}

#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub dyn_disparity_threshold: usize,
    pub correlation_window_size: (usize, usize),
    /// Entropy above which estimates are discarded, disabled when non-positive.
    pub clean: f32,
    /// Output level selecting the regression the entropy is measured on.
    pub level: u8
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Params {
    /// Default matching parameters with the cleanup and level options of a run.
    pub fn from_options(options: ModelOptions) -> Self {
        Self {
            dyn_disparity_threshold: 10,
            correlation_window_size: (11, 11),
            clean: options.clean,
            level: options.level
        }
    }
}

impl McManamon {
    /// Create a new instance of the algorithm with the given parameters.
    pub fn new(params: Params) -> Self {
        let semi_width: isize = (params.correlation_window_size.0 as isize - 1) / 2;
        let corr_window_x_range = -semi_width..=semi_width;

        let semi_height: isize = (params.correlation_window_size.1 as isize - 1) / 2;
        let corr_window_y_range = -semi_height..=semi_height;

        Self {
            params,
            corr_window_x_range,
            corr_window_y_range,
            probabilities: Vec::new(),
            crits: Vec::new()
        }
    }

    /// Calculate the correlation criterion for the given position and disparity.
    fn get_criterion(
        &self,
        left: &ArrayView2<f32>,
        right: &ArrayView2<f32>,
        x: usize,
        y: usize,
        d: usize
    ) -> f32 {
        let mut acc = 0.0f32;

        for j in self.corr_window_y_range.clone() {
            for i in self.corr_window_x_range.clone() {
                let xi = (x as isize + i) as usize;
                let yj = (y as isize + j) as usize;
                acc += (left[[yj, xi]] - right[[yj, xi - d]]).abs();
            }
        }

        acc
    }

    /// Entropy of the softmax over negated criterions, which start at disparity `offset`.
    fn criterion_entropy(
        crits: &[f32],
        c_min: f32,
        offset: usize,
        probabilities: &mut [f32],
        regression: &DisparityRegression
    ) -> f32 {
        let mean = crits.iter().sum::<f32>() / crits.len() as f32;
        let temperature = if mean - c_min > 0.0 { mean - c_min } else { 1.0 };

        let mut total = 0.0f32;
        for (k, c) in crits.iter().enumerate() {
            let p = (-(c - c_min) / temperature).exp();
            probabilities[offset + k] = p;
            total += p;
        }
        for p in probabilities[offset..offset + crits.len()].iter_mut() {
            *p /= total;
        }

        let entropy = regression.entropy(probabilities);

        for p in probabilities[offset..offset + crits.len()].iter_mut() {
            *p = 0.0;
        }

        entropy
    }
}

/// Average the channels of a `[1, C, H, W]` tensor into a single plane.
fn to_gray(tensor: &Array4<f32>) -> Result<Array2<f32>> {
    let (batch, channels, _, _) = tensor.dim();
    if batch != 1 || channels == 0 {
        return Err(Error::Model(format!(
            "expected a [1, C, H, W] tensor, got {:?}",
            tensor.shape()
        )));
    }

    tensor
        .index_axis(Axis(0), 0)
        .mean_axis(Axis(0))
        .ok_or_else(|| Error::Model("empty tensor".into()))
}

impl StereoModel for McManamon {
    /// Compute the disparity map for the given pair.
    fn infer(
        &mut self,
        left: &Array4<f32>,
        right: &Array4<f32>,
        config: &DisparityConfig
    ) -> Result<PredictedField> {
        if left.shape() != right.shape() {
            return Err(Error::Model(format!(
                "left {:?} and right {:?} tensors differ",
                left.shape(),
                right.shape()
            )));
        }

        let scale = Scale::for_level(self.params.level).ok_or_else(|| {
            Error::Model(format!("unsupported output level {}", self.params.level))
        })?;
        let regression = *config.regression(scale);

        let left = to_gray(left)?;
        let right = to_gray(right)?;
        let (left, right) = (left.view(), right.view());
        let (height, width) = left.dim();

        let mut disparity = Array2::from_elem((height, width), f32::INFINITY);
        let mut entropy = Array2::from_elem((height, width), f32::NAN);

        let (window_width, window_height) = self.params.correlation_window_size;
        if height <= 2 * window_height || width <= 2 * window_width {
            debug!("{}x{} input is smaller than the correlation window", height, width);
            return Ok(PredictedField { disparity, entropy });
        }

        let max_disparity = config.max_disp() as usize;
        let threshold = self.params.dyn_disparity_threshold;
        let clean = self.params.clean;

        let mut probabilities = std::mem::take(&mut self.probabilities);
        probabilities.clear();
        probabilities.resize(max_disparity, 0.0);
        let mut crits = std::mem::take(&mut self.crits);

        // Dynamic disparity range tracking variables
        let mut min_dyn_disp = 0usize;
        let mut max_dyn_disp = max_disparity;
        let mut discarded = 0usize;

        // Iterate through rows backwards
        for y in (window_height..(height - window_height)).rev() {
            let mut min_disp_this_row = f32::INFINITY;
            let mut max_disp_this_row = f32::NEG_INFINITY;

            for x in (window_width + max_dyn_disp)..(width - window_width) {
                crits.clear();
                for d in min_dyn_disp..max_dyn_disp {
                    crits.push(self.get_criterion(&left, &right, x, y, d));
                }

                // Find index of minimum value
                let min_index = crits
                    .iter()
                    .enumerate()
                    .fold(0, |min_idx, (idx, &val)| {
                        if val < crits[min_idx] {
                            idx
                        }
                        else {
                            min_idx
                        }
                    });
                let c_min = crits[min_index];

                // Sub pixel interpolation
                let mut disp_val = (min_dyn_disp + min_index) as f32;

                if min_index != 0 && min_index != crits.len() - 1 {
                    let c_left = crits[min_index - 1];
                    let c_right = crits[min_index + 1];

                    let denom = match c_left > c_right {
                        true => 2.0 * (c_left - c_min),
                        false => 2.0 * (c_right - c_min)
                    };

                    if denom > 0.0 {
                        disp_val += (c_left - c_right) / denom;
                    }
                }

                let ent = Self::criterion_entropy(
                    &crits,
                    c_min,
                    min_dyn_disp,
                    &mut probabilities,
                    &regression
                );

                entropy[[y, x]] = ent;
                if clean > 0.0 && ent > clean {
                    discarded += 1;
                }
                else {
                    disparity[[y, x]] = disp_val;
                }

                if disp_val > max_disp_this_row {
                    max_disp_this_row = disp_val;
                }
                if disp_val < min_disp_this_row {
                    min_disp_this_row = disp_val;
                }
            }

            // Rows without any match keep the previous range
            if min_disp_this_row > max_disp_this_row {
                continue;
            }

            max_dyn_disp = (max_disp_this_row.ceil().max(0.0) as usize + threshold)
                .min(max_disparity)
                .max(1);

            let min = (min_disp_this_row.floor() - threshold as f32).max(0.0);
            min_dyn_disp = min as usize;

            if max_dyn_disp <= min_dyn_disp {
                min_dyn_disp = max_dyn_disp - 1;
            }
        }

        if discarded > 0 {
            debug!("Discarded {} estimates above entropy {}", discarded, clean);
        }

        self.probabilities = probabilities;
        self.crits = crits;

        Ok(PredictedField { disparity, entropy })
    }

    fn release_buffers(&mut self) {
        self.probabilities = Vec::new();
        self.crits = Vec::new();
    }
}
