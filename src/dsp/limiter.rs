//! Soft limiter
//!
//! Static tanh curve: `tanh(x * drive) * ceiling`. The output can never
//! exceed `ceiling`, so the final peak stays under the normalize target.

use crate::dsp::effect::Effect;
use crate::engine::Waveform;

// ============================================================================
// Constants
// ============================================================================

/// Input drive into the tanh curve
pub const LIMITER_DRIVE: f32 = 1.2;

/// Asymptotic output level
pub const LIMITER_CEILING: f32 = 0.9;

// ============================================================================
// Limiter Effect
// ============================================================================

/// Memoryless tanh soft limiter
#[derive(Debug, Clone, Copy)]
pub struct SoftLimiter {
    drive: f32,
    ceiling: f32,
}

impl SoftLimiter {
    pub fn new(drive: f32, ceiling: f32) -> Self {
        Self { drive, ceiling }
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    #[inline]
    fn shape(&self, x: f32) -> f32 {
        (x * self.drive).tanh() * self.ceiling
    }
}

impl Default for SoftLimiter {
    fn default() -> Self {
        Self::new(LIMITER_DRIVE, LIMITER_CEILING)
    }
}

impl Effect for SoftLimiter {
    fn process(&mut self, wave: &mut Waveform) {
        for sample in wave.samples_mut() {
            *sample = self.shape(*sample);
        }
    }

    fn effect_type(&self) -> &'static str {
        "limiter"
    }
}
