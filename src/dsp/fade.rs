//! Linear fade in/out

use crate::dsp::effect::Effect;
use crate::engine::Waveform;

/// Default fade length at each end
pub const FADE_MS: f32 = 50.0;

/// Linear fade applied to both ends of the waveform
///
/// The ramp is clamped to half the buffer so the two fades never overlap.
/// First and last samples end up at exactly zero.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    duration_ms: f32,
}

impl Fade {
    pub fn new(duration_ms: f32) -> Self {
        Self { duration_ms }
    }

    /// Ramp length in samples for a buffer of `len` samples
    pub fn ramp_len(&self, len: usize, sample_rate: u32) -> usize {
        let wanted = (self.duration_ms / 1000.0 * sample_rate as f32).round() as usize;
        wanted.min(len / 2)
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new(FADE_MS)
    }
}

impl Effect for Fade {
    fn process(&mut self, wave: &mut Waveform) {
        let len = wave.len();
        let ramp = self.ramp_len(len, wave.sample_rate());
        if ramp == 0 {
            return;
        }

        let samples = wave.samples_mut();
        for i in 0..ramp {
            let gain = i as f32 / ramp as f32;
            samples[i] *= gain;
            samples[len - 1 - i] *= gain;
        }
    }

    fn effect_type(&self) -> &'static str {
        "fade"
    }
}
