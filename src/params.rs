//! Render parameters
//!
//! `RenderRequest` is the loose wire shape handed over by the interpretation
//! layer. `AudioParameters` is the validated, immutable form the pipeline
//! consumes; the only way to get one is through validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FartgenError, Result};

/// Shortest renderable duration in seconds
pub const MIN_DURATION_SECS: f64 = 0.5;
/// Longest renderable duration in seconds
pub const MAX_DURATION_SECS: f64 = 10.0;
/// Upper bound for wetness and pitch
pub const MAX_LEVEL: i64 = 10;
/// Default render sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
/// Lowest accepted sample rate (keeps the low-pass cutoff below Nyquist)
pub const MIN_SAMPLE_RATE: u32 = 8000;
/// Highest accepted sample rate
pub const MAX_SAMPLE_RATE: u32 = 192_000;

/// Wetness above which the bubbling layer and low-pass filter kick in
pub const WET_THRESHOLD: u8 = 5;
/// Bubbles generated per wetness step
pub const BUBBLES_PER_WETNESS: usize = 5;

// ============================================================================
// Preset Type
// ============================================================================

/// Sound preset, selects the sample category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetType {
    Squeaker,
    Rumbler,
    Stutterer,
    Classic,
    Wet,
}

impl PresetType {
    /// All presets, in category scan order
    pub const ALL: [PresetType; 5] = [
        PresetType::Squeaker,
        PresetType::Rumbler,
        PresetType::Stutterer,
        PresetType::Classic,
        PresetType::Wet,
    ];

    /// Category name, also the library sub-directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetType::Squeaker => "squeaker",
            PresetType::Rumbler => "rumbler",
            PresetType::Stutterer => "stutterer",
            PresetType::Classic => "classic",
            PresetType::Wet => "wet",
        }
    }
}

impl fmt::Display for PresetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetType {
    type Err = FartgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "squeaker" => Ok(PresetType::Squeaker),
            "rumbler" => Ok(PresetType::Rumbler),
            "stutterer" => Ok(PresetType::Stutterer),
            "classic" => Ok(PresetType::Classic),
            "wet" => Ok(PresetType::Wet),
            other => Err(FartgenError::validation(
                "type",
                format!("'{}'", other),
                "one of squeaker, rumbler, stutterer, classic, wet",
            )),
        }
    }
}

// ============================================================================
// Render Request
// ============================================================================

/// Unvalidated render request as received from the interpretation layer
///
/// The level and sample-rate fields are signed so that negative inputs reach
/// validation and come back as a structured error. `seed` spans the full
/// `u64` range; a negative seed is a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub duration: f64,
    pub wetness: i64,
    pub pitch: i64,
    #[serde(rename = "type")]
    pub preset: String,
    #[serde(default)]
    pub reverb_amount: f64,
    #[serde(default)]
    pub distortion: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: i64,
}

fn default_sample_rate() -> i64 {
    DEFAULT_SAMPLE_RATE as i64
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            duration: 2.0,
            wetness: 5,
            pitch: 5,
            preset: PresetType::Classic.as_str().to_string(),
            reverb_amount: 0.0,
            distortion: 0.0,
            seed: 0,
            sample_rate: default_sample_rate(),
        }
    }
}

impl RenderRequest {
    /// Validate every field and produce immutable parameters
    ///
    /// The first failing field is reported; nothing is clamped.
    pub fn validate(&self) -> Result<AudioParameters> {
        if !self.duration.is_finite()
            || !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&self.duration)
        {
            return Err(FartgenError::validation(
                "duration",
                self.duration,
                "0.5 to 10.0 seconds",
            ));
        }

        let wetness = check_level("wetness", self.wetness)?;
        let pitch = check_level("pitch", self.pitch)?;
        let preset: PresetType = self.preset.parse()?;
        let reverb_amount = check_unit("reverbAmount", self.reverb_amount)?;
        let distortion = check_unit("distortion", self.distortion)?;

        if !(MIN_SAMPLE_RATE as i64..=MAX_SAMPLE_RATE as i64).contains(&self.sample_rate) {
            return Err(FartgenError::validation(
                "sampleRate",
                self.sample_rate,
                "8000 to 192000 Hz",
            ));
        }

        Ok(AudioParameters {
            duration: self.duration,
            wetness,
            pitch,
            preset,
            reverb_amount,
            distortion,
            seed: self.seed,
            sample_rate: self.sample_rate as u32,
        })
    }
}

fn check_level(field: &str, value: i64) -> Result<u8> {
    if (0..=MAX_LEVEL).contains(&value) {
        Ok(value as u8)
    } else {
        Err(FartgenError::validation(field, value, "integer 0 to 10"))
    }
}

fn check_unit(field: &str, value: f64) -> Result<f32> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value as f32)
    } else {
        Err(FartgenError::validation(field, value, "0.0 to 1.0"))
    }
}

// ============================================================================
// Audio Parameters
// ============================================================================

/// Validated render parameters
///
/// Fields are private so a value can only come out of
/// [`RenderRequest::validate`]; deserializing goes through the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RenderRequest")]
pub struct AudioParameters {
    duration: f64,
    wetness: u8,
    pitch: u8,
    #[serde(rename = "type")]
    preset: PresetType,
    reverb_amount: f32,
    distortion: f32,
    seed: u64,
    sample_rate: u32,
}

impl TryFrom<RenderRequest> for AudioParameters {
    type Error = FartgenError;

    fn try_from(request: RenderRequest) -> Result<Self> {
        request.validate()
    }
}

impl AudioParameters {
    /// Target duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Liquid character, 0-10
    pub fn wetness(&self) -> u8 {
        self.wetness
    }

    /// Register, 0-10 (0 = lowest)
    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    /// Preset type
    pub fn preset(&self) -> PresetType {
        self.preset
    }

    /// Reverb dry/wet amount, 0.0-1.0
    pub fn reverb_amount(&self) -> f32 {
        self.reverb_amount
    }

    /// Distortion drive amount, 0.0-1.0
    pub fn distortion(&self) -> f32 {
        self.distortion
    }

    /// Seed for every random draw of the render
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Render sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples the finished render must contain
    pub fn length_in_samples(&self) -> usize {
        (self.duration * self.sample_rate as f64).round() as usize
    }

    /// Whether the bubbling layer is generated
    pub fn has_bubbling(&self) -> bool {
        self.wetness > WET_THRESHOLD
    }

    /// Number of bubble bursts (zero when bubbling is off)
    pub fn bubble_count(&self) -> usize {
        if self.has_bubbling() {
            BUBBLES_PER_WETNESS * self.wetness as usize
        } else {
            0
        }
    }

    /// Pitch shift applied to the base sample, in semitones (-10..=10)
    pub fn semitone_shift(&self) -> i32 {
        (self.pitch as i32 - 5) * 2
    }

    /// Low-pass cutoff in Hz, `None` when wetness does not call for one
    pub fn lowpass_cutoff(&self) -> Option<f32> {
        if self.has_bubbling() {
            Some(800.0 + (10 - self.wetness) as f32 * 200.0)
        } else {
            None
        }
    }

    /// Same parameters under a different seed, used for transform retries
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }
}
