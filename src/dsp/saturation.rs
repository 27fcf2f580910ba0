//! Saturation Effect
//!
//! Distortion drive: a normalized tanh waveshaper applied to the mix before
//! peak normalization.

use crate::dsp::effect::Effect;
use crate::engine::Waveform;

// ============================================================================
// Constants
// ============================================================================

/// Extra drive at full distortion (drive runs from 1 to 1 + this)
const MAX_EXTRA_DRIVE: f32 = 9.0;

// ============================================================================
// Waveshaping
// ============================================================================

/// `tanh(x * drive) / tanh(drive)`: unity at ±1, compresses everything
/// in between harder as drive rises
#[inline]
fn waveshape(x: f32, drive: f32, norm: f32) -> f32 {
    (x * drive).tanh() / norm
}

// ============================================================================
// Saturation Effect
// ============================================================================

/// Distortion stage
///
/// `amount` is the request's distortion in [0, 1]; zero is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saturation {
    amount: f32,
}

impl Saturation {
    pub fn new(amount: f32) -> Self {
        Self { amount }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// Drive into the tanh curve
    pub fn drive(&self) -> f32 {
        1.0 + MAX_EXTRA_DRIVE * self.amount
    }

    pub fn is_active(&self) -> bool {
        self.amount > 0.0
    }
}

impl Effect for Saturation {
    fn process(&mut self, wave: &mut Waveform) {
        if !self.is_active() {
            return;
        }
        let drive = self.drive();
        let norm = drive.tanh();
        for sample in wave.samples_mut() {
            *sample = waveshape(*sample, drive, norm);
        }
    }

    fn effect_type(&self) -> &'static str {
        "saturation"
    }
}
