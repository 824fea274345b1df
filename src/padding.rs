//! # Stride alignment
//!
//! Stereo networks downsample their input down to a coarsest stride of 64, so the spatial
//! dimensions of every input tensor have to be multiples of it. Inputs are padded with zeros above
//! the image and to the right of it, and outputs are cropped back the same way.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::{s, Array2, Array4, ArrayView2};

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Coarsest stride of the stereo network.
pub const STRIDE: usize = 64;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Padding applied to bring an `H x W` tensor up to stride aligned dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingSpec {
    pub max_h: usize,
    pub max_w: usize,
    /// Rows added above the image.
    pub top_pad: usize,
    /// Columns added to the right of the image.
    pub left_pad: usize
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Round `len` up to the next multiple of [`STRIDE`].
pub fn align(len: usize) -> usize {
    let aligned = len / STRIDE * STRIDE;
    if aligned < len {
        aligned + STRIDE
    }
    else {
        aligned
    }
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl PaddingSpec {
    /// Compute the padding for a tensor of `height x width` pixels.
    pub fn for_size(height: usize, width: usize) -> Self {
        let max_h = align(height);
        let max_w = align(width);

        Self {
            max_h,
            max_w,
            top_pad: max_h - height,
            left_pad: max_w - width
        }
    }

    /// Height of the content before padding.
    pub fn height(&self) -> usize {
        self.max_h - self.top_pad
    }

    /// Width of the content before padding.
    pub fn width(&self) -> usize {
        self.max_w - self.left_pad
    }

    /// Pad a `[1, C, H, W]` tensor with zeros to `[1, C, max_h, max_w]`.
    ///
    /// The content ends up in the bottom `H` rows and the left `W` columns.
    pub fn pad(&self, tensor: &Array4<f32>) -> Result<Array4<f32>> {
        let (batch, channels, height, width) = tensor.dim();
        if height != self.height() || width != self.width() {
            return Err(Error::InvalidInput(format!(
                "padding computed for {}x{} applied to {}x{} tensor",
                self.height(), self.width(), height, width
            )));
        }

        let mut padded = Array4::<f32>::zeros((batch, channels, self.max_h, self.max_w));
        padded
            .slice_mut(s![.., .., self.top_pad.., ..width])
            .assign(tensor);

        Ok(padded)
    }

    /// Crop a `max_h x max_w` field back to the content region.
    pub fn crop(&self, field: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (height, width) = field.dim();
        if height != self.max_h || width != self.max_w {
            return Err(Error::Model(format!(
                "expected {}x{} field, model returned {}x{}",
                self.max_h, self.max_w, height, width
            )));
        }

        Ok(field.slice(s![self.top_pad.., ..width - self.left_pad]).to_owned())
    }
}
