//! # disparity-label
//!
//! Labels a dataset of stereo pairs with the McManamon matcher and writes one `.npy` disparity map
//! per pair.

use std::path::PathBuf;

use clap::Parser;
use cv_disparity_label::{
    mcmanamon::{McManamon, Params},
    prelude::*,
    Error, Result
};

#[derive(Parser, Debug)]
#[command(name = "disparity-label", about = "Generate disparity labels for stereo pairs")]
struct Args {
    /// TOML run configuration. Other flags are ignored when given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Left image directory
    #[arg(long, required_unless_present = "config")]
    left: Option<PathBuf>,

    /// Right image directory
    #[arg(long, required_unless_present = "config")]
    right: Option<PathBuf>,

    /// Model checkpoint
    #[arg(long)]
    loadmodel: Option<PathBuf>,

    #[arg(long, default_value = "output")]
    outdir: PathBuf,

    /// Clean up output using entropy estimation
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    clean: f32,

    /// Test time resolution ratio
    #[arg(long, default_value_t = 0.5)]
    testres: f64,

    /// Maximum disparity to search for
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    max_disp: f32,

    /// Output level, 1 (stage 3), 2 (stage 2) or 3 (stage 1)
    #[arg(long, default_value_t = 1)]
    level: u8,

    /// Pair images by sorted position instead of by name
    #[arg(long)]
    by_order: bool,

    /// Also write PNG previews
    #[arg(long)]
    preview: bool,

    /// Also write the entropy field of each pair
    #[arg(long)]
    entropy: bool
}

impl Args {
    fn into_config(self) -> Result<Config> {
        if let Some(path) = self.config {
            return Config::from_file(path);
        }

        let (left, right) = match (self.left, self.right) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(Error::Config("both --left and --right are required".into()))
        };

        let mut config = Config::new(left, right);
        config.model_path = self.loadmodel;
        config.outdir = self.outdir;
        config.clean = self.clean;
        config.testres = self.testres;
        config.max_disp = Some(self.max_disp);
        config.level = self.level;
        config.save_preview = self.preview;
        config.save_entropy = self.entropy;
        if self.by_order {
            config.pairing = Pairing::BySortedOrder;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;

    let (sources, mut pipeline) =
        Pipeline::from_config(&config, |options| McManamon::new(Params::from_options(options)))?;

    let artifacts = pipeline.run(&sources)?;
    log::info!("Labelled {} pairs into {}", artifacts.len(), config.outdir.display());

    Ok(())
}
