//! Effect trait definition
//!
//! Base trait for the post-processing steps.

use crate::engine::Waveform;

/// A post-processing step
///
/// Effects mutate the working waveform in place and never change its
/// length or sample rate.
pub trait Effect: Send {
    /// Process the waveform in place
    fn process(&mut self, wave: &mut Waveform);

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;
}
