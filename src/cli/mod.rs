//! CLI Module
//!
//! Command-line interface for the fartgen render engine.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::params::RenderRequest;

/// Fartgen - deterministic procedural fart sound renderer
#[derive(Parser, Debug)]
#[command(name = "fartgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one sound and write it to the output directory
    #[command(name = "render")]
    Render(RenderArgs),

    /// Validate a render request file and print the normalized parameters
    #[command(name = "validate")]
    Validate {
        /// Render request JSON file
        request: PathBuf,
    },

    /// Load the sample library and list what it holds
    #[command(name = "library")]
    Library {
        /// Sample library root (overrides the config file)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Render request JSON file; individual flags are ignored when given
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Duration in seconds (0.5 to 10)
    #[arg(short, long, default_value_t = 2.0)]
    pub duration: f64,

    /// Wetness 0 to 10
    #[arg(short, long, default_value_t = 5)]
    pub wetness: i64,

    /// Pitch 0 to 10 (0 = lowest)
    #[arg(short, long, default_value_t = 5)]
    pub pitch: i64,

    /// Preset: squeaker, rumbler, stutterer, classic or wet
    #[arg(short = 't', long = "type", default_value = "classic")]
    pub preset: String,

    /// Reverb amount 0.0 to 1.0
    #[arg(long, default_value_t = 0.0)]
    pub reverb: f64,

    /// Distortion 0.0 to 1.0
    #[arg(long, default_value_t = 0.0)]
    pub distortion: f64,

    /// Random seed
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    pub sample_rate: i64,

    /// Sample library root (overrides the config file)
    #[arg(short, long)]
    pub library: Option<PathBuf>,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output bit depth: 16, 24 or 32
    #[arg(long)]
    pub bit_depth: Option<u16>,

    /// Output channels: 1 or 2
    #[arg(long)]
    pub channels: Option<u16>,

    /// Render budget in seconds
    #[arg(long)]
    pub timeout: Option<f64>,
}

impl RenderArgs {
    /// Request assembled from the individual flags
    pub fn to_request(&self) -> RenderRequest {
        RenderRequest {
            duration: self.duration,
            wetness: self.wetness,
            pitch: self.pitch,
            preset: self.preset.clone(),
            reverb_amount: self.reverb,
            distortion: self.distortion,
            seed: self.seed,
            sample_rate: self.sample_rate,
        }
    }

    /// Apply command-line overrides on top of the file configuration
    pub fn apply_overrides(&self, config: &mut EngineConfig) {
        if let Some(library) = &self.library {
            config.library_path = library.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(bit_depth) = self.bit_depth {
            config.export.bit_depth = bit_depth;
        }
        if let Some(channels) = self.channels {
            config.export.channels = channels;
        }
        if let Some(timeout) = self.timeout {
            config.render_timeout_secs = timeout;
        }
    }
}
