//! Rumble layer
//!
//! Three detuned sines around the pitch frequency with a slow amplitude
//! throb.

use std::f32::consts::TAU;

use rand::Rng;

use crate::engine::Waveform;
use crate::params::AudioParameters;

/// Peak level of the rumble layer
pub const RUMBLE_CEILING: f32 = 0.3;

/// Frequency multipliers of the three oscillators (±5% detune)
pub const DETUNE: [f32; 3] = [0.95, 1.0, 1.05];

/// Range of the amplitude modulation rate in Hz
pub const MODULATION_RANGE_HZ: (f32, f32) = (5.0, 15.0);

/// Frequency for a pitch level: 40 Hz at 0, doubling every 5 steps
pub fn pitch_to_frequency(pitch: u8) -> f32 {
    40.0 * 2.0_f32.powf(pitch as f32 / 5.0)
}

/// Generate the rumble layer
///
/// Draws three oscillator phases, then the modulation rate.
pub fn generate<R: Rng + ?Sized>(
    len: usize,
    sample_rate: u32,
    params: &AudioParameters,
    rng: &mut R,
) -> Waveform {
    let base = pitch_to_frequency(params.pitch());
    let phases: [f32; 3] = [
        rng.gen_range(0.0..TAU),
        rng.gen_range(0.0..TAU),
        rng.gen_range(0.0..TAU),
    ];
    let rate = rng.gen_range(MODULATION_RANGE_HZ.0..=MODULATION_RANGE_HZ.1);

    let sr = sample_rate as f32;
    let samples = (0..len)
        .map(|i| {
            let t = i as f32 / sr;
            let tone: f32 = DETUNE
                .iter()
                .zip(phases.iter())
                .map(|(detune, phase)| (TAU * base * detune * t + phase).sin())
                .sum::<f32>()
                / DETUNE.len() as f32;
            let throb = 0.5 + 0.5 * (TAU * rate * t).sin();
            tone * throb
        })
        .collect();

    let mut wave = Waveform::from_samples(samples, sample_rate);
    wave.normalize_peak(RUMBLE_CEILING);
    wave
}
