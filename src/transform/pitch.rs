//! Length-preserving pitch shift
//!
//! Stretch by the pitch ratio, then read the result back at the original
//! length: the stretch keeps the timbre's time scale, the resample moves the
//! pitch.

use crate::engine::resample_to_len;
use crate::transform::stretch::time_stretch;

/// Frequency ratio for a shift in semitones
pub fn semitone_ratio(semitones: i32) -> f64 {
    2.0_f64.powf(semitones as f64 / 12.0)
}

/// Shift `input` by `semitones` keeping its length
pub fn pitch_shift(input: &[f32], semitones: i32) -> Vec<f32> {
    if semitones == 0 || input.is_empty() {
        return input.to_vec();
    }

    let ratio = semitone_ratio(semitones);
    let stretched_len = ((input.len() as f64 * ratio).round() as usize).max(1);
    let stretched = time_stretch(input, stretched_len);
    resample_to_len(&stretched, input.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::TAU;

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count()
    }

    #[test]
    fn test_semitone_ratio() {
        assert_relative_eq!(semitone_ratio(12), 2.0, epsilon = 1e-12);
        assert_relative_eq!(semitone_ratio(-12), 0.5, epsilon = 1e-12);
        assert_relative_eq!(semitone_ratio(0), 1.0);
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let input: Vec<f32> = (0..500).map(|i| (i as f32 * 0.1).sin()).collect();
        assert_eq!(pitch_shift(&input, 0), input);
    }

    #[test]
    fn test_shift_keeps_length_and_moves_pitch() {
        let input: Vec<f32> = (0..44100)
            .map(|i| 0.5 * (TAU * 300.0 * i as f32 / 44100.0).sin())
            .collect();

        for semitones in [-10, -4, 4, 10] {
            let shifted = pitch_shift(&input, semitones);
            assert_eq!(shifted.len(), input.len());
            assert!(shifted.iter().all(|s| s.is_finite()));

            let expected = 600.0 * semitone_ratio(semitones) as f32;
            let measured = zero_crossings(&shifted) as f32;
            assert!(
                (measured - expected).abs() < expected * 0.06,
                "{} semitones: {} crossings, expected ~{}",
                semitones,
                measured,
                expected
            );
        }
    }
}
