//! # Resampling
//!
//! Separable resampling of float rasters. Cubic interpolation is used to bring input images to the
//! inference resolution, linear interpolation to bring disparity fields back to the original size.
//!
//! Both kernels use half-pixel centres, so that destination pixel `i` samples the source at
//! `(i + 0.5) * scale - 0.5`, and replicate the edge pixels outside of the source.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Free parameter of the Keys cubic convolution kernel.
const CUBIC_A: f64 = -0.75;

/// Number of channels an input image must provide.
pub const CHANNELS: usize = 3;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Source samples contributing to a single destination coordinate along one axis.
#[derive(Debug, Clone)]
struct Taps {
    indices: [usize; 4],
    weights: [f32; 4],
    len: usize
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Size of an axis of length `len` scaled by `factor`, rounded to the nearest integer.
pub fn scaled_len(len: usize, factor: f64) -> usize {
    (len as f64 * factor).round() as usize
}

/// Rescale an `H x W x C` image by the resolution factor using cubic interpolation.
///
/// The result has `round(H * factor) x round(W * factor)` pixels and keeps the first three
/// channels only. Values are not clamped.
pub fn scale_image(image: ArrayView3<f32>, factor: f64) -> Result<Array3<f32>> {
    let (height, width, channels) = image.dim();

    if channels < CHANNELS {
        return Err(Error::InvalidInput(format!(
            "expected at least {} channels, image has {}",
            CHANNELS, channels
        )));
    }
    if !(factor.is_finite() && factor > 0.0) {
        return Err(Error::InvalidInput(format!(
            "resolution factor must be positive, got {}",
            factor
        )));
    }

    let out_height = scaled_len(height, factor);
    let out_width = scaled_len(width, factor);
    if out_height == 0 || out_width == 0 {
        return Err(Error::InvalidInput(format!(
            "{}x{} image vanishes at resolution factor {}",
            height, width, factor
        )));
    }

    let scale = 1.0 / factor;
    let rows = cubic_taps(out_height, height, scale);
    let cols = cubic_taps(out_width, width, scale);

    let mut out = Array3::<f32>::zeros((out_height, out_width, CHANNELS));
    for c in 0..CHANNELS {
        let plane = resample(image.index_axis(Axis(2), c), &rows, &cols);
        out.index_axis_mut(Axis(2), c).assign(&plane);
    }

    Ok(out)
}

/// Resize a 2D field to exactly `height x width` using linear interpolation.
///
/// Non-finite values propagate into every destination sample they contribute to with a non-zero
/// weight.
pub fn resize_linear(field: ArrayView2<f32>, height: usize, width: usize) -> Result<Array2<f32>> {
    let (src_height, src_width) = field.dim();

    if src_height == 0 || src_width == 0 || height == 0 || width == 0 {
        return Err(Error::InvalidInput(format!(
            "cannot resize {}x{} field to {}x{}",
            src_height, src_width, height, width
        )));
    }

    let rows = linear_taps(height, src_height, src_height as f64 / height as f64);
    let cols = linear_taps(width, src_width, src_width as f64 / width as f64);

    Ok(resample(field, &rows, &cols))
}

/// Apply the horizontal then the vertical taps to a single plane.
fn resample(src: ArrayView2<f32>, rows: &[Taps], cols: &[Taps]) -> Array2<f32> {
    let src_height = src.nrows();

    let mut horizontal = Array2::<f32>::zeros((src_height, cols.len()));
    for y in 0..src_height {
        for (x, taps) in cols.iter().enumerate() {
            horizontal[[y, x]] = taps.apply(|i| src[[y, i]]);
        }
    }

    let mut out = Array2::<f32>::zeros((rows.len(), cols.len()));
    for (y, taps) in rows.iter().enumerate() {
        for x in 0..cols.len() {
            out[[y, x]] = taps.apply(|i| horizontal[[i, x]]);
        }
    }

    out
}

/// Cubic taps for every destination coordinate along an axis.
fn cubic_taps(dst_len: usize, src_len: usize, scale: f64) -> Vec<Taps> {
    (0..dst_len)
        .map(|d| {
            let f = (d as f64 + 0.5) * scale - 0.5;
            let s = f.floor();
            let t = f - s;
            let s = s as isize;

            let w0 = ((CUBIC_A * (t + 1.0) - 5.0 * CUBIC_A) * (t + 1.0) + 8.0 * CUBIC_A) * (t + 1.0)
                - 4.0 * CUBIC_A;
            let w1 = ((CUBIC_A + 2.0) * t - (CUBIC_A + 3.0)) * t * t + 1.0;
            let w2 = ((CUBIC_A + 2.0) * (1.0 - t) - (CUBIC_A + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
            let w3 = 1.0 - w0 - w1 - w2;

            let mut indices = [0usize; 4];
            for (k, index) in indices.iter_mut().enumerate() {
                *index = clamp_index(s + k as isize - 1, src_len);
            }

            Taps {
                indices,
                weights: [w0 as f32, w1 as f32, w2 as f32, w3 as f32],
                len: 4
            }
        })
        .collect()
}

/// Linear taps for every destination coordinate along an axis.
fn linear_taps(dst_len: usize, src_len: usize, scale: f64) -> Vec<Taps> {
    (0..dst_len)
        .map(|d| {
            let f = (d as f64 + 0.5) * scale - 0.5;
            let mut s = f.floor() as isize;
            let mut t = f - f.floor();

            if s < 0 {
                s = 0;
                t = 0.0;
            }
            if s as usize >= src_len - 1 {
                s = src_len as isize - 1;
                t = 0.0;
            }

            Taps {
                indices: [s as usize, clamp_index(s + 1, src_len), 0, 0],
                weights: [(1.0 - t) as f32, t as f32, 0.0, 0.0],
                len: 2
            }
        })
        .collect()
}

fn clamp_index(i: isize, len: usize) -> usize {
    i.max(0).min(len as isize - 1) as usize
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Taps {
    /// Weighted sum of the source samples returned by `get`.
    ///
    /// Zero-weight taps are skipped, otherwise an infinite neighbour would turn an exactly aligned
    /// sample into NaN.
    fn apply<F: Fn(usize) -> f32>(&self, get: F) -> f32 {
        let mut acc = 0.0f32;
        for k in 0..self.len {
            if self.weights[k] != 0.0 {
                acc += self.weights[k] * get(self.indices[k]);
            }
        }
        acc
    }
}
