//! Waveform Buffer
//!
//! The single audio container passed between pipeline stages. Rendering is
//! mono throughout; channel layouts only matter at the file boundaries.

use sha2::{Digest, Sha256};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration of files read or written at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    #[default]
    Mono,
    /// Two channels (stereo: left, right)
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Waveform
// ============================================================================

/// Mono sample buffer with its sample rate
///
/// A stage owns the waveform it is working on and hands it forward by value.
/// Store originals are only ever cloned, never mutated.
///
/// # Example
/// ```
/// use fartgen::engine::Waveform;
///
/// let silence = Waveform::new(44100, 44100);
/// assert_eq!(silence.len(), 44100);
/// assert!((silence.duration_secs() - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Create a silent waveform of `num_samples`
    pub fn new(num_samples: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![0.0; num_samples],
            sample_rate,
        }
    }

    /// Wrap existing mono samples
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count; rendering is always mono
    #[inline]
    pub fn channels(&self) -> usize {
        1
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// Immutable access to the samples
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable access to the samples
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Take the samples out of the waveform
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Absolute peak (linear)
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }

    /// RMS level in dB, -inf for silence or an empty buffer
    pub fn rms_db(&self) -> f32 {
        if self.samples.is_empty() {
            return f32::NEG_INFINITY;
        }
        let sum_sq: f64 = self.samples.iter().map(|&s| (s as f64).powi(2)).sum();
        linear_to_db((sum_sq / self.samples.len() as f64).sqrt() as f32)
    }

    /// Check if all samples are finite (not NaN or Infinity)
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Multiply every sample by `gain`
    pub fn scale(&mut self, gain: f32) {
        for sample in &mut self.samples {
            *sample *= gain;
        }
    }

    /// Scale so the absolute peak equals `target`; silence is left untouched
    pub fn normalize_peak(&mut self, target: f32) {
        let peak = self.peak();
        if peak > 0.0 {
            self.scale(target / peak);
        }
    }

    /// Zero-pad the tail or truncate so the waveform holds exactly `len` samples
    pub fn fit_to_len(&mut self, len: usize) {
        self.samples.resize(len, 0.0);
    }

    /// Consuming variant of [`Waveform::fit_to_len`]
    pub fn fitted(mut self, len: usize) -> Self {
        self.fit_to_len(len);
        self
    }

    /// SHA-256 hex digest over the little-endian sample bytes
    ///
    /// Two renders are byte-identical exactly when their digests match.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.sample_rate.to_le_bytes());
        for sample in &self.samples {
            hasher.update(sample.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Self::new(0, crate::params::DEFAULT_SAMPLE_RATE)
    }
}

// ============================================================================
// Tests
// ============================================================================
