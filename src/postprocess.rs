//! # Postprocessing
//!
//! Brings the raw model output back to the geometry and units of the original image.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::Array2;

use crate::disparity::PredictedField;
use crate::error::*;
use crate::padding::PaddingSpec;
use crate::resize::resize_linear;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Canonical marker for pixels without a disparity estimate.
pub const INVALID: f32 = f32::INFINITY;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Crop, rescale, resize and mask a predicted field.
///
/// Returns the disparity at `original` size in original resolution pixels and the cropped
/// entropy at inference resolution.
pub fn postprocess(
    field: PredictedField,
    padding: &PaddingSpec,
    resolution: f64,
    original: (usize, usize)
) -> Result<(Array2<f32>, Array2<f32>)> {
    let entropy = padding.crop(field.entropy.view())?;
    let mut disparity = padding.crop(field.disparity.view())?;

    let factor = resolution as f32;
    disparity.mapv_inplace(|d| d / factor);

    let mut disparity = resize_linear(disparity.view(), original.0, original.1)?;
    mask_invalid(&mut disparity);

    Ok((disparity, entropy))
}

/// Replace every `+inf` or NaN with [`INVALID`]. Other values, `-inf` included, are kept.
pub fn mask_invalid(field: &mut Array2<f32>) {
    field.mapv_inplace(|d| if d.is_nan() || d == f32::INFINITY { INVALID } else { d });
}
