//! Peak normalization
//!
//! Scales the whole waveform so its largest absolute sample hits a target.

use crate::dsp::effect::Effect;
use crate::engine::Waveform;

// ============================================================================
// Constants
// ============================================================================

/// Peak the post-processor normalizes to before limiting
pub const NORMALIZE_TARGET: f32 = 0.95;

// ============================================================================
// Normalize Effect
// ============================================================================

/// Peak normalizer
///
/// Silent input is left untouched.
#[derive(Debug, Clone, Copy)]
pub struct Normalize {
    target: f32,
}

impl Normalize {
    /// Create a normalizer for the given linear peak target
    pub fn new(target: f32) -> Self {
        Self { target }
    }
}

impl Default for Normalize {
    fn default() -> Self {
        Self::new(NORMALIZE_TARGET)
    }
}

impl Effect for Normalize {
    fn process(&mut self, wave: &mut Waveform) {
        wave.normalize_peak(self.target);
    }

    fn effect_type(&self) -> &'static str {
        "normalize"
    }
}
