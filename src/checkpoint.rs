//! # Checkpoints
//!
//! Pretrained weights are stored as a JSON document holding a `state_dict` mapping from parameter
//! names to flattened values. Disparity regression entries are rebuilt for every sample from the
//! [`DisparityConfig`](crate::range::DisparityConfig), so they are never restored.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Parameters whose name contains this belong to the disparity regressions.
const REGRESSION_KEY: &str = "disp";

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Checkpoint {
    pub state_dict: BTreeMap<String, Vec<f32>>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Checkpoint {
    /// Read a checkpoint and drop its disparity regression entries.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let malformed = |reason: String| Error::Checkpoint {
            path: path.display().to_string(),
            reason
        };

        let file = File::open(path).map_err(|e| malformed(e.to_string()))?;
        let checkpoint: Checkpoint = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| malformed(e.to_string()))?;

        Ok(checkpoint.without_regressions())
    }

    /// Remove every entry whose key mentions the disparity regressions.
    pub fn without_regressions(mut self) -> Self {
        self.state_dict.retain(|k, _| !k.contains(REGRESSION_KEY));
        self
    }

    /// Total number of values over all entries.
    pub fn num_values(&self) -> usize {
        self.state_dict.values().map(Vec::len).sum()
    }
}
