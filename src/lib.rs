//! Fartgen - Deterministic Procedural Fart Sound Renderer
//!
//! Turns a small validated parameter set into a finished waveform through a
//! fixed multi-stage pipeline.
//!
//! # Architecture
//!
//! - `assets`: immutable base recordings grouped by preset
//! - `synth`: procedural noise, rumble and bubbling layers
//! - `transform`: stretch, pitch-shift and low-pass of the base sample
//! - `dsp`: weighted mixing and the mastering chain
//! - `pipeline`: orchestration, progress events and the export boundary
//!
//! The same seed and parameters always produce the same samples.
//!
//! ```no_run
//! use fartgen::assets::SampleStore;
//! use fartgen::config::EngineConfig;
//! use fartgen::params::RenderRequest;
//! use fartgen::pipeline::{CancellationToken, NullSink, RenderPipeline};
//!
//! let config = EngineConfig::default();
//! let store = SampleStore::load_with_config(&config)?;
//! let pipeline = RenderPipeline::new(&store, &config)?;
//! let request = RenderRequest { duration: 3.0, seed: 7, ..Default::default() };
//! let output = pipeline.render_request(&request, &mut NullSink, &CancellationToken::new())?;
//! println!("{} samples, digest {}", output.waveform.len(), output.digest);
//! # Ok::<(), fartgen::FartgenError>(())
//! ```

pub mod assets;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod synth;
pub mod transform;

pub use error::{FartgenError, Result};
