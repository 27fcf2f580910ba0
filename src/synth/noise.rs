//! Noise layer
//!
//! White noise for dry presets, spectrally shaped pink noise once wetness
//! passes the threshold.

use rand::Rng;
use rand_distr::StandardNormal;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::engine::Waveform;
use crate::params::{AudioParameters, WET_THRESHOLD};

/// Peak level of the noise layer
pub const NOISE_CEILING: f32 = 0.1;

/// Draws beyond this many standard deviations are clipped
const NORMAL_BOUND: f32 = 3.0;

/// Generate the noise layer
pub fn generate<R: Rng + ?Sized>(
    len: usize,
    sample_rate: u32,
    params: &AudioParameters,
    rng: &mut R,
) -> Waveform {
    let white = white(len, rng);
    let samples = if params.wetness() <= WET_THRESHOLD {
        white
    } else {
        pink_from_white(&white, sample_rate)
    };

    let mut wave = Waveform::from_samples(samples, sample_rate);
    wave.normalize_peak(NOISE_CEILING);
    wave
}

/// Independent standard-normal draws clipped to ±3σ
fn white<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len)
        .map(|_| {
            let draw: f32 = rng.sample(StandardNormal);
            draw.clamp(-NORMAL_BOUND, NORMAL_BOUND)
        })
        .collect()
}

/// Shape a white-noise spectrum by `1/sqrt(|f| + 1)` and transform back
///
/// The envelope only depends on |f|, so conjugate symmetry survives and the
/// inverse transform is real up to rounding.
fn pink_from_white(white: &[f32], sample_rate: u32) -> Vec<f32> {
    let n = white.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut spectrum: Vec<Complex<f32>> = white.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut spectrum);

    let bin_hz = sample_rate as f32 / n as f32;
    for (k, bin) in spectrum.iter_mut().enumerate() {
        let folded = if k <= n / 2 { k } else { n - k };
        let freq = folded as f32 * bin_hz;
        *bin *= 1.0 / (freq + 1.0).sqrt();
    }

    ifft.process(&mut spectrum);
    spectrum.iter().map(|c| c.re / n as f32).collect()
}
