//! # Run configuration
//!
//! Every value a labelling run needs, loadable from a TOML file.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dataset::Pairing;
use crate::disparity::ModelOptions;
use crate::error::*;
use crate::range::Scale;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory of left images.
    pub left_dir: PathBuf,
    /// Directory of right images.
    pub right_dir: PathBuf,
    /// Optional pretrained weights.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,
    /// Entropy cleanup threshold forwarded to the model.
    #[serde(default = "default_clean")]
    pub clean: f32,
    /// Output level of the model.
    #[serde(default = "default_level")]
    pub level: u8,
    /// Resolution factor applied before inference.
    #[serde(default = "default_testres")]
    pub testres: f64,
    /// Requested maximum disparity in original resolution pixels, non-positive means unset.
    #[serde(default)]
    pub max_disp: Option<f32>,
    #[serde(default)]
    pub pairing: Pairing,
    #[serde(default)]
    pub save_preview: bool,
    #[serde(default)]
    pub save_entropy: bool
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn default_outdir() -> PathBuf {
    PathBuf::from("output")
}

fn default_clean() -> f32 {
    -1.0
}

fn default_level() -> u8 {
    1
}

fn default_testres() -> f64 {
    0.5
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Config {
    /// Configuration with defaults for everything but the data directories.
    pub fn new<L: Into<PathBuf>, R: Into<PathBuf>>(left_dir: L, right_dir: R) -> Self {
        Self {
            left_dir: left_dir.into(),
            right_dir: right_dir.into(),
            model_path: None,
            outdir: default_outdir(),
            clean: default_clean(),
            level: default_level(),
            testres: default_testres(),
            max_disp: None,
            pairing: Pairing::default(),
            save_preview: false,
            save_entropy: false
        }
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        Ok(config)
    }

    /// Check the values that can be checked without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        if !(self.testres.is_finite() && self.testres > 0.0) {
            return Err(Error::Config(format!(
                "testres must be positive, got {}",
                self.testres
            )));
        }
        if Scale::for_level(self.level).is_none() {
            return Err(Error::Config(format!(
                "level must be 1, 2 or 3, got {}",
                self.level
            )));
        }
        Ok(())
    }

    /// Requested maximum disparity, `None` when unset.
    pub fn max_disp_request(&self) -> Option<f32> {
        self.max_disp.filter(|d| *d > 0.0)
    }

    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            clean: self.clean,
            level: self.level
        }
    }
}
