//! # Output
//!
//! Persists disparity maps as `.npy` arrays, one per sample.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::Array2;
use ndarray_npy::WriteNpyExt;

use crate::disparity::OutputArtifact;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OutputAssembler {
    outdir: PathBuf,
    /// Also write an 8-bit `<name>.png` preview.
    pub preview: bool,
    /// Also write `<name>_entropy.npy`.
    pub entropy: bool
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl OutputAssembler {
    pub fn new<P: Into<PathBuf>>(outdir: P) -> Self {
        Self {
            outdir: outdir.into(),
            preview: false,
            entropy: false
        }
    }

    /// Path the disparity of the named sample is written to.
    pub fn disparity_path(&self, name: &str) -> PathBuf {
        self.outdir.join(format!("{}.npy", name))
    }

    /// Write the artifact, replacing any previous one of the same name.
    ///
    /// Returns the path of the disparity array.
    pub fn write(&self, artifact: &OutputArtifact) -> Result<PathBuf> {
        if !self.outdir.exists() {
            debug!("Creating output directory {}", self.outdir.display());
            fs::create_dir_all(&self.outdir)?;
        }

        let path = self.disparity_path(&artifact.name);
        info!("Saving disparity map {}.npy at {}", artifact.name, self.outdir.display());
        write_array(&artifact.disparity, &path)?;

        if self.entropy {
            write_array(
                &artifact.entropy,
                &self.outdir.join(format!("{}_entropy.npy", artifact.name))
            )?;
        }

        if self.preview {
            artifact
                .to_luma_normalised()
                .save(self.outdir.join(format!("{}.png", artifact.name)))?;
        }

        Ok(path)
    }
}

fn write_array(array: &Array2<f32>, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    array.write_npy(&mut writer)?;
    writer.flush()?;
    Ok(())
}
