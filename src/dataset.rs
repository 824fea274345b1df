//! # Datasets
//!
//! Discovery of stereo pairs in a pair of directories and loading of the images as float rasters.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, Pixel};
use log::debug;
use ndarray::Array3;
use serde::Deserialize;

use crate::error::*;
use crate::resize::CHANNELS;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// How left and right images are matched up.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    /// Both directories hold the same file names.
    ByName,
    /// The n-th file of each sorted listing form a pair.
    BySortedOrder
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Locations of the two images of a stereo pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSource {
    pub name: String,
    pub left: PathBuf,
    pub right: PathBuf
}

/// A loaded stereo pair of `H x W x 3` float rasters.
#[derive(Debug, Clone)]
pub struct ImagePair {
    pub name: String,
    pub left: Array3<f32>,
    pub right: Array3<f32>
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// List the regular files of a directory, sorted by path.
pub fn list_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "data directory {} does not exist",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Match the left and right listings into pairs.
pub fn pair_sources(
    left: Vec<PathBuf>,
    right: Vec<PathBuf>,
    pairing: Pairing
) -> Result<Vec<PairSource>> {
    if left.len() != right.len() {
        return Err(Error::Config(format!(
            "{} left images but {} right images",
            left.len(), right.len()
        )));
    }

    left.into_iter()
        .zip(right)
        .map(|(left, right)| {
            let name = sample_name(&left)?;

            if pairing == Pairing::ByName {
                let right_name = sample_name(&right)?;
                if right_name != name {
                    return Err(Error::Config(format!(
                        "left image {} has no right counterpart (found {})",
                        left.display(), right.display()
                    )));
                }
            }

            Ok(PairSource { name, left, right })
        })
        .collect()
}

/// Name of a sample: the file name up to its first `.`.
pub fn sample_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::Config(format!("cannot name sample {}", path.display())))
}

/// Convert a decoded image to an `H x W x 3` float raster.
pub fn to_rgb_array(image: &DynamicImage) -> Result<Array3<f32>> {
    let channels = image.color().channel_count() as usize;
    if channels < CHANNELS {
        return Err(Error::InvalidInput(format!(
            "expected an RGB image, found {} channel(s)",
            channels
        )));
    }

    // 16-bit rasters keep their full range
    match image {
        DynamicImage::ImageRgb16(buffer) => rgb_raster(buffer),
        DynamicImage::ImageRgba16(buffer) => rgb_raster(buffer),
        _ => rgb_raster(&image.to_rgb8())
    }
}

/// Float raster of the first three channels of every pixel.
fn rgb_raster<P>(buffer: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<Array3<f32>>
where
    P: Pixel + 'static,
    P::Subpixel: Into<f32> + 'static
{
    let (width, height) = buffer.dimensions();
    let data = buffer
        .pixels()
        .flat_map(|p| p.channels()[..CHANNELS].iter().map(|&v| -> f32 { v.into() }))
        .collect::<Vec<f32>>();

    Array3::from_shape_vec((height as usize, width as usize, CHANNELS), data)
        .map_err(|e| Error::InvalidInput(e.to_string()))
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Default for Pairing {
    fn default() -> Self {
        Pairing::ByName
    }
}

impl ImagePair {
    /// Build a pair from two rasters, keeping their first three channels.
    pub fn new(name: String, left: Array3<f32>, right: Array3<f32>) -> Result<Self> {
        let (lh, lw, lc) = left.dim();
        let (rh, rw, rc) = right.dim();

        if lc < CHANNELS || rc < CHANNELS {
            return Err(Error::InvalidInput(format!(
                "sample {} is not RGB ({} and {} channels)",
                name, lc, rc
            )));
        }
        if (lh, lw) != (rh, rw) {
            return Err(Error::InvalidInput(format!(
                "sample {} has a {}x{} left and a {}x{} right image",
                name, lh, lw, rh, rw
            )));
        }

        let keep = |a: Array3<f32>| {
            if a.dim().2 == CHANNELS {
                a
            }
            else {
                a.slice(ndarray::s![.., .., ..CHANNELS]).to_owned()
            }
        };

        Ok(Self {
            name,
            left: keep(left),
            right: keep(right)
        })
    }

    /// Decode both images of a pair.
    pub fn load(source: &PairSource) -> Result<Self> {
        debug!("Loading {} and {}", source.left.display(), source.right.display());

        let left = to_rgb_array(&image::open(&source.left)?)?;
        let right = to_rgb_array(&image::open(&source.right)?)?;

        Self::new(source.name.clone(), left, right)
    }

    /// Original `(height, width)` of the pair.
    pub fn size(&self) -> (usize, usize) {
        let (h, w, _) = self.left.dim();
        (h, w)
    }
}
