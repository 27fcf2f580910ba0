//! Transform Stage
//!
//! Turns the selected base sample(s) into one waveform of the requested
//! duration, pitch and tone:
//! overlap → time-stretch → pitch-shift → wetness low-pass.
//! Any step that leaves NaN/Inf behind fails the stage.

pub mod filter;
pub mod pitch;
pub mod stretch;

use tracing::debug;

use crate::assets::SampleAsset;
use crate::engine::{conform_rate, Waveform};
use crate::error::{FartgenError, Result};
use crate::params::AudioParameters;

pub use filter::lowpass_4th_order;
pub use pitch::{pitch_shift, semitone_ratio};
pub use stretch::time_stretch;

/// Base-sample transform used by the render pipeline
///
/// The pipeline owns one of these and hands it freshly copied base
/// waveforms; implementations must not keep them.
pub trait BaseTransform: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Reshape the base waveform(s) to the parameters
    fn apply(&self, bases: Vec<Waveform>, params: &AudioParameters) -> Result<Waveform>;
}

/// The standard four-step transform
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTransform;

impl BaseTransform for StandardTransform {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn apply(&self, bases: Vec<Waveform>, params: &AudioParameters) -> Result<Waveform> {
        let sample_rate = params.sample_rate();
        let target_len = params.length_in_samples();

        let merged = overlap(bases, sample_rate);
        debug!(
            source_len = merged.len(),
            target_len,
            stretch = target_len as f64 / merged.len().max(1) as f64,
            "time-stretching base"
        );

        let stretched = Waveform::from_samples(time_stretch(merged.samples(), target_len), sample_rate);
        ensure_finite(&stretched, "time_stretch")?;

        let semitones = params.semitone_shift();
        let mut shifted =
            Waveform::from_samples(pitch_shift(stretched.samples(), semitones), sample_rate);
        ensure_finite(&shifted, "pitch_shift")?;

        if let Some(cutoff) = params.lowpass_cutoff() {
            debug!(cutoff_hz = cutoff, "applying wetness low-pass");
            lowpass_4th_order(shifted.samples_mut(), sample_rate, cutoff)?;
            ensure_finite(&shifted, "lowpass")?;
        }

        Ok(shifted)
    }
}

/// Copy the selected assets and bring them to the render sample rate
///
/// The store's originals stay untouched.
pub fn prepare_bases(assets: &[&SampleAsset], sample_rate: u32) -> Vec<Waveform> {
    assets
        .iter()
        .map(|asset| conform_rate(asset.waveform().clone(), sample_rate))
        .collect()
}

/// Align waveforms at t=0 and sum them scaled by `1/count`
///
/// Shorter inputs are zero-padded to the longest.
pub fn overlap(bases: Vec<Waveform>, sample_rate: u32) -> Waveform {
    let count = bases.len();
    if count == 1 {
        if let Some(only) = bases.into_iter().next() {
            return only;
        }
        return Waveform::new(0, sample_rate);
    }

    let longest = bases.iter().map(Waveform::len).max().unwrap_or(0);
    let mut merged = Waveform::new(longest, sample_rate);
    let gain = 1.0 / count.max(1) as f32;
    for base in &bases {
        for (out, &s) in merged.samples_mut().iter_mut().zip(base.samples()) {
            *out += s * gain;
        }
    }
    merged
}

/// Untransformed stand-in when the transform keeps failing: the first
/// selected base, padded or truncated to the target length
pub fn fallback(mut bases: Vec<Waveform>, params: &AudioParameters) -> Waveform {
    let target_len = params.length_in_samples();
    if bases.is_empty() {
        return Waveform::new(target_len, params.sample_rate());
    }
    bases.swap_remove(0).fitted(target_len)
}

fn ensure_finite(wave: &Waveform, step: &str) -> Result<()> {
    if wave.is_finite() {
        Ok(())
    } else {
        Err(FartgenError::TransformInstability {
            step: step.to_string(),
        })
    }
}
