//! Pitch-preserving time stretch
//!
//! Waveform-similarity overlap-add (WSOLA). Frames are read from the input
//! at the analysis hop, nudged within a small tolerance to the position that
//! best continues the previous frame, windowed and overlap-added at the
//! synthesis hop. The output length is exact.

use std::f32::consts::TAU;

use crate::engine::resample_to_len;

/// Largest analysis frame in samples
const MAX_FRAME: usize = 1024;

/// Inputs shorter than two of these frames are resampled instead
const MIN_FRAME: usize = 64;

/// Stride used when scoring candidate frame positions
const CORRELATION_STRIDE: usize = 2;

/// Stretch `input` to exactly `target_len` samples without changing pitch
pub fn time_stretch(input: &[f32], target_len: usize) -> Vec<f32> {
    let n = input.len();
    if target_len == 0 {
        return Vec::new();
    }
    if n == 0 {
        return vec![0.0; target_len];
    }
    if n == target_len {
        return input.to_vec();
    }
    if n < 2 * MIN_FRAME {
        // Too short for overlap-add; a few ms of pitch drift is inaudible
        return resample_to_len(input, target_len);
    }

    let frame = (n / 2).min(MAX_FRAME) & !1;
    let synthesis_hop = frame / 2;
    let tolerance = frame / 8;
    let analysis_hop = synthesis_hop as f64 * n as f64 / target_len as f64;
    let window = hann(frame);
    let last_start = n - frame;

    let mut acc = vec![0.0_f32; target_len + frame];
    let mut norm = vec![0.0_f32; target_len + frame];
    let mut previous = 0usize;
    let mut k = 0usize;

    loop {
        let out_pos = k * synthesis_hop;
        if out_pos >= target_len {
            break;
        }

        let nominal = ((k as f64 * analysis_hop).round() as usize).min(last_start);
        let start = if k == 0 {
            0
        } else {
            let natural = (previous + synthesis_hop).min(last_start);
            best_match(input, natural, nominal, tolerance, frame, last_start)
        };

        for (i, &w) in window.iter().enumerate() {
            acc[out_pos + i] += input[start + i] * w;
            norm[out_pos + i] += w;
        }

        previous = start;
        k += 1;
    }

    acc.truncate(target_len);
    acc.iter()
        .zip(norm.iter())
        .map(|(&a, &w)| if w > 1e-6 { a / w } else { 0.0 })
        .collect()
}

/// Position within `nominal ± tolerance` whose overlap region best
/// correlates with the natural continuation of the previous frame
fn best_match(
    input: &[f32],
    natural: usize,
    nominal: usize,
    tolerance: usize,
    frame: usize,
    last_start: usize,
) -> usize {
    let lo = nominal.saturating_sub(tolerance);
    let hi = (nominal + tolerance).min(last_start);
    let overlap = frame / 2;
    let reference = &input[natural..natural + overlap];

    let mut best = nominal;
    let mut best_score = f32::NEG_INFINITY;
    for candidate in lo..=hi {
        let segment = &input[candidate..candidate + overlap];
        let score: f32 = reference
            .iter()
            .zip(segment)
            .step_by(CORRELATION_STRIDE)
            .map(|(a, b)| a * b)
            .sum();
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }
    best
}

/// Periodic Hann window; copies at half-window spacing sum to one
fn hann(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (TAU * i as f32 / len as f32).cos())
        .collect()
}
