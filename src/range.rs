//! # Disparity range configuration
//!
//! The stereo network regresses disparity at four internal scales (strides 8, 16, 32 and 64). Each
//! scale owns a regression over `max_disp / divisor` candidate disparities, so the search bound has
//! to be a multiple of the coarsest stride at the inference resolution. This module turns a user
//! request and a resolution factor into such a bound.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::error::*;
use crate::padding::STRIDE;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Search bound used when none is requested. Suits KITTI-like driving datasets at full resolution.
pub const DEFAULT_MAX_DISP: u32 = 384;

/// Smallest bound the network accepts. A bound of exactly one stride is not representable.
pub const RESERVED_MIN_DISP: u32 = 128;

/// Requested bounds are quantised down to multiples of this.
const REQUEST_QUANTUM: f64 = 16.0;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Internal processing scale of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Stride8,
    Stride16,
    Stride32,
    Stride64
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Disparity regression over `max_disp / divisor` candidates spaced `divisor` pixels apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisparityRegression {
    max_disp: u32,
    divisor: u32
}

/// Disparity search configuration for a single sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisparityConfig {
    max_disp: u32,
    regressions: [DisparityRegression; 4]
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Compute the disparity configuration for a requested bound and resolution factor.
///
/// A request of `None`, zero, a negative value or NaN selects [`DEFAULT_MAX_DISP`].
pub fn configure(requested: Option<f32>, resolution: f64) -> Result<DisparityConfig> {
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(Error::Config(format!(
            "resolution factor must be positive, got {}",
            resolution
        )));
    }

    let base = match requested {
        Some(d) if d > 0.0 => (REQUEST_QUANTUM * (d as f64 / REQUEST_QUANTUM).floor()) as u32,
        _ => DEFAULT_MAX_DISP
    };

    let stride = STRIDE as f64;
    let scaled = base as f64 * resolution;
    let tmp = (scaled / stride).floor() * stride;

    let max_disp = if scaled > tmp { tmp + stride } else { tmp };
    if max_disp > u32::MAX as f64 {
        return Err(Error::Config(format!(
            "disparity bound {} at resolution factor {} is out of range",
            base, resolution
        )));
    }

    Ok(DisparityConfig::new((max_disp as u32).max(RESERVED_MIN_DISP)))
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Scale {
    pub const ALL: [Scale; 4] = [Scale::Stride8, Scale::Stride16, Scale::Stride32, Scale::Stride64];

    /// Spacing of the regression candidates at this scale. The stride 8 scale shares the spacing
    /// of the stride 16 one.
    pub fn divisor(&self) -> u32 {
        match self {
            Scale::Stride8 | Scale::Stride16 => 16,
            Scale::Stride32 => 32,
            Scale::Stride64 => 64
        }
    }

    /// Scale producing the given output level (1 is the finest stage).
    pub fn for_level(level: u8) -> Option<Scale> {
        match level {
            1 => Some(Scale::Stride8),
            2 => Some(Scale::Stride16),
            3 => Some(Scale::Stride32),
            _ => None
        }
    }

    fn index(&self) -> usize {
        match self {
            Scale::Stride8 => 0,
            Scale::Stride16 => 1,
            Scale::Stride32 => 2,
            Scale::Stride64 => 3
        }
    }
}

impl DisparityRegression {
    pub fn new(max_disp: u32, divisor: u32) -> Self {
        Self { max_disp, divisor }
    }

    pub fn max_disp(&self) -> u32 {
        self.max_disp
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Number of candidate disparities.
    pub fn levels(&self) -> usize {
        (self.max_disp / self.divisor) as usize
    }

    /// Candidate disparities in pixels.
    pub fn candidates(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.levels() as u32).map(move |i| i * self.divisor)
    }

    /// Shannon entropy (nats) of a distribution over integer disparities, binned onto the
    /// candidates of this regression.
    ///
    /// `probabilities[d]` is the probability of disparity `d`; entries beyond `max_disp` are
    /// ignored. The distribution is renormalised over the retained mass.
    pub fn entropy(&self, probabilities: &[f32]) -> f32 {
        let mut bins = vec![0.0f32; self.levels()];
        for (d, p) in probabilities.iter().enumerate() {
            if let Some(bin) = bins.get_mut(d / self.divisor as usize) {
                *bin += *p;
            }
        }

        let total: f32 = bins.iter().sum();
        if !(total > 0.0) {
            return f32::NAN;
        }

        bins.iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| {
                let p = p / total;
                -p * p.ln()
            })
            .sum()
    }
}

impl DisparityConfig {
    /// Build the configuration and the regressions of every scale for the given bound.
    fn new(max_disp: u32) -> Self {
        let regression = |scale: Scale| DisparityRegression::new(max_disp, scale.divisor());

        Self {
            max_disp,
            regressions: [
                regression(Scale::Stride8),
                regression(Scale::Stride16),
                regression(Scale::Stride32),
                regression(Scale::Stride64)
            ]
        }
    }

    pub fn max_disp(&self) -> u32 {
        self.max_disp
    }

    pub fn regression(&self, scale: Scale) -> &DisparityRegression {
        &self.regressions[scale.index()]
    }
}
