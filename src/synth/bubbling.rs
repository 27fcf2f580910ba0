//! Bubbling layer
//!
//! Short decaying sine bursts scattered over the buffer. Bursts may overlap;
//! they simply add up.

use std::f32::consts::TAU;

use rand::Rng;

use crate::engine::Waveform;
use crate::params::AudioParameters;

/// Peak level of the bubbling layer
pub const BUBBLING_CEILING: f32 = 0.1;

/// Carrier frequency range of one bubble, in Hz
pub const CARRIER_RANGE_HZ: (f32, f32) = (300.0, 1000.0);

/// Length range of one bubble, in samples
pub const BURST_LEN_RANGE: (usize, usize) = (100, 500);

/// Envelope decay constant, applied as `exp(-t * DECAY)` with t in seconds
const DECAY: f32 = 50.0;

/// One decaying sine burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub offset: usize,
    pub carrier_hz: f32,
    pub len: usize,
}

/// Draw `count` bursts for a buffer of `len` samples
///
/// Each burst draws its offset, carrier and length in that order.
pub fn plan_bursts<R: Rng + ?Sized>(len: usize, count: usize, rng: &mut R) -> Vec<Burst> {
    if len == 0 {
        return Vec::new();
    }
    (0..count)
        .map(|_| Burst {
            offset: rng.gen_range(0..len),
            carrier_hz: rng.gen_range(CARRIER_RANGE_HZ.0..=CARRIER_RANGE_HZ.1),
            len: rng.gen_range(BURST_LEN_RANGE.0..=BURST_LEN_RANGE.1),
        })
        .collect()
}

/// Add one burst into `buffer`, cut off at the end of the buffer
fn add_burst(buffer: &mut [f32], burst: &Burst, sample_rate: f32) {
    for (j, sample) in buffer[burst.offset..].iter_mut().take(burst.len).enumerate() {
        let t = j as f32 / sample_rate;
        *sample += (TAU * burst.carrier_hz * t).sin() * (-t * DECAY).exp();
    }
}

/// Generate the bubbling layer with `params.bubble_count()` bursts
pub fn generate<R: Rng + ?Sized>(
    len: usize,
    sample_rate: u32,
    params: &AudioParameters,
    rng: &mut R,
) -> Waveform {
    let mut wave = Waveform::new(len, sample_rate);
    let bursts = plan_bursts(len, params.bubble_count(), rng);

    let sr = sample_rate as f32;
    for burst in &bursts {
        add_burst(wave.samples_mut(), burst, sr);
    }

    wave.normalize_peak(BUBBLING_CEILING);
    wave
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RenderRequest;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(wetness: i64) -> AudioParameters {
        RenderRequest {
            wetness,
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    /// Count bursts by their onsets: a zero run followed by sound
    fn count_onsets(samples: &[f32]) -> usize {
        let mut onsets = 0;
        let mut silent = true;
        for &s in samples {
            if s != 0.0 && silent {
                onsets += 1;
            }
            silent = s == 0.0;
        }
        onsets
    }

    #[test]
    fn test_length_and_ceiling() {
        let mut rng = StdRng::seed_from_u64(1);
        let wave = generate(132_300, 44100, &params(9), &mut rng);
        assert_eq!(wave.len(), 132_300);
        assert!(wave.is_finite());
        assert_relative_eq!(wave.peak(), BUBBLING_CEILING, epsilon = 1e-6);
    }

    #[test]
    fn test_dry_params_give_silence() {
        let mut rng = StdRng::seed_from_u64(1);
        let wave = generate(1000, 44100, &params(3), &mut rng);
        assert_eq!(wave.peak(), 0.0);
    }

    #[test]
    fn test_bursts_are_sparse_and_bounded() {
        // Long buffer so 30 bursts of at most 500 samples rarely touch
        let mut rng = StdRng::seed_from_u64(11);
        let wave = generate(10 * 44100, 44100, &params(6), &mut rng);
        let onsets = count_onsets(wave.samples());
        assert!(onsets >= 1 && onsets <= 30, "onsets = {}", onsets);

        let voiced = wave.samples().iter().filter(|&&s| s != 0.0).count();
        assert!(voiced <= 30 * BURST_LEN_RANGE.1);
    }

    #[test]
    fn test_wetness_nine_draws_exactly_45_bursts() {
        let bursts = plan_bursts(132_300, params(9).bubble_count(), &mut StdRng::seed_from_u64(4));
        assert_eq!(bursts.len(), 45);
        for b in &bursts {
            assert!(b.offset < 132_300);
            assert!((CARRIER_RANGE_HZ.0..=CARRIER_RANGE_HZ.1).contains(&b.carrier_hz));
            assert!((BURST_LEN_RANGE.0..=BURST_LEN_RANGE.1).contains(&b.len));
        }
    }

    #[test]
    fn test_generate_renders_every_planned_burst() {
        let len = 132_300;
        let p = params(9);

        let mut rng = StdRng::seed_from_u64(4);
        let wave = generate(len, 44100, &p, &mut rng);

        let mut replay = StdRng::seed_from_u64(4);
        let bursts = plan_bursts(len, 45, &mut replay);
        let mut expected = Waveform::new(len, 44100);
        for burst in &bursts {
            add_burst(expected.samples_mut(), burst, 44100.0);
        }
        expected.normalize_peak(BUBBLING_CEILING);

        assert_eq!(wave, expected);
        // generate consumed exactly 45 bursts worth of draws
        assert_eq!(rng.gen::<u64>(), replay.gen::<u64>());
    }

    #[test]
    fn test_burst_near_end_is_truncated() {
        let mut rng = StdRng::seed_from_u64(3);
        let wave = generate(50, 44100, &params(10), &mut rng);
        assert_eq!(wave.len(), 50);
        assert!(wave.is_finite());
    }
}
