//! # Labelling pipeline
//!
//! Drives a [`StereoModel`] over a dataset of stereo pairs. Each pair goes through the whole chain
//! before the next one is loaded:
//!
//! 1. rescale both images by the resolution factor,
//! 2. normalise into `[1, 3, H, W]` tensors,
//! 3. pad to stride aligned dimensions,
//! 4. configure the disparity range and run the model,
//! 5. crop, rescale and resize the disparity back to the original image,
//! 6. write the result.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::time::Instant;

use log::{debug, info};

use crate::checkpoint::Checkpoint;
use crate::config::Config;
use crate::dataset::{list_images, pair_sources, ImagePair, PairSource};
use crate::disparity::{ModelOptions, OutputArtifact, StereoModel};
use crate::error::*;
use crate::normalize::Normalization;
use crate::output::OutputAssembler;
use crate::padding::PaddingSpec;
use crate::postprocess::postprocess;
use crate::range::configure;
use crate::resize::scale_image;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct Pipeline<M: StereoModel> {
    model: M,
    resolution: f64,
    max_disp: Option<f32>,
    normalization: Normalization,
    assembler: OutputAssembler
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl<M: StereoModel> Pipeline<M> {
    /// Create a pipeline around an already constructed model.
    pub fn new(model: M, config: &Config) -> Result<Self> {
        config.validate()?;

        let mut assembler = OutputAssembler::new(config.outdir.clone());
        assembler.preview = config.save_preview;
        assembler.entropy = config.save_entropy;

        Ok(Self {
            model,
            resolution: config.testres,
            max_disp: config.max_disp_request(),
            normalization: Normalization::imagenet(),
            assembler
        })
    }

    /// Discover the dataset, build the model and restore its weights.
    ///
    /// All configuration errors surface here, before any sample is processed.
    pub fn from_config<F>(config: &Config, build_model: F) -> Result<(Vec<PairSource>, Self)>
    where
        F: FnOnce(ModelOptions) -> M
    {
        config.validate()?;

        info!("Processing left image data path {}", config.left_dir.display());
        let left = list_images(&config.left_dir)?;
        info!("Processing right image data path {}", config.right_dir.display());
        let right = list_images(&config.right_dir)?;
        let sources = pair_sources(left, right, config.pairing)?;

        info!("Loading model");
        let mut model = build_model(config.model_options());

        match &config.model_path {
            Some(path) => {
                let checkpoint = Checkpoint::load(path)?;
                debug!(
                    "Restoring {} entries ({} values) from {}",
                    checkpoint.state_dict.len(),
                    checkpoint.num_values(),
                    path.display()
                );
                model.load_checkpoint(checkpoint)?;
            }
            None => debug!("run with random init")
        }
        debug!("Number of model parameters: {}", model.parameter_count());

        Ok((sources, Self::new(model, config)?))
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Label every pair in order, writing each result before moving to the next pair.
    pub fn run(&mut self, sources: &[PairSource]) -> Result<Vec<OutputArtifact>> {
        let mut artifacts = Vec::with_capacity(sources.len());

        for (i, source) in sources.iter().enumerate() {
            info!("Processing {}/{}", i, sources.len());

            let pair = ImagePair::load(source)?;
            let artifact = self.process(pair)?;
            self.assembler.write(&artifact)?;

            artifacts.push(artifact);
        }

        Ok(artifacts)
    }

    /// Run a single pair through the model without writing it.
    pub fn process(&mut self, pair: ImagePair) -> Result<OutputArtifact> {
        let config = configure(self.max_disp, self.resolution)?;
        debug!("Maximum disparity of model is set to {}", config.max_disp());

        let original = pair.size();
        let left = self.prepare(&pair.left)?;
        let right = self.prepare(&pair.right)?;

        let (_, _, height, width) = left.dim();
        let padding = PaddingSpec::for_size(height, width);
        debug!("Padding {}x{} input to {}x{}", height, width, padding.max_h, padding.max_w);

        let left = padding.pad(&left)?;
        let right = padding.pad(&right)?;

        let start = Instant::now();
        let field = self.model.infer(&left, &right, &config);
        debug!("time = {:.2}", start.elapsed().as_secs_f64() * 1000.0);

        drop(left);
        drop(right);
        self.model.release_buffers();

        let (disparity, entropy) = postprocess(field?, &padding, self.resolution, original)?;

        Ok(OutputArtifact {
            name: pair.name,
            disparity,
            entropy
        })
    }

    fn prepare(&self, image: &ndarray::Array3<f32>) -> Result<ndarray::Array4<f32>> {
        let scaled = scale_image(image.view(), self.resolution)?;
        self.normalization.apply(scaled.view())
    }
}
