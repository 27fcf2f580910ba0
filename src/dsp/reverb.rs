//! Convolution reverb
//!
//! Convolves the dry signal (via FFT) with a synthetic impulse response:
//! 500 ms of noise under an exponential decay. The wet tail is cut back to
//! the dry length and peak-matched to the dry signal before the cross-fade,
//! so adding reverb never raises the peak.

use rand::Rng;
use rand_distr::StandardNormal;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::dsp::effect::Effect;
use crate::engine::Waveform;

// ============================================================================
// Constants
// ============================================================================

/// Impulse response length in seconds
pub const IMPULSE_SECS: f32 = 0.5;

/// Decay time constant as a fraction of the sample rate
const DECAY_SECS: f32 = 0.2;

// ============================================================================
// Impulse Response
// ============================================================================

/// Noise × `exp(-t / (sample_rate * 0.2))`, t in samples
pub fn impulse_response<R: Rng + ?Sized>(sample_rate: u32, rng: &mut R) -> Vec<f32> {
    let len = (IMPULSE_SECS * sample_rate as f32).round() as usize;
    let tau = sample_rate as f32 * DECAY_SECS;
    (0..len)
        .map(|i| {
            let noise: f32 = rng.sample(StandardNormal);
            noise * (-(i as f32) / tau).exp()
        })
        .collect()
}

/// Full linear convolution of `signal` with `impulse` via FFT
///
/// Output length is `signal.len() + impulse.len() - 1`.
pub fn convolve(signal: &[f32], impulse: &[f32]) -> Vec<f32> {
    if signal.is_empty() || impulse.is_empty() {
        return Vec::new();
    }
    let n = signal.len() + impulse.len() - 1;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut sig_padded: Vec<Complex<f32>> = signal.iter().map(|&s| Complex::new(s, 0.0)).collect();
    sig_padded.resize(n, Complex::new(0.0, 0.0));
    let mut ir_padded: Vec<Complex<f32>> = impulse.iter().map(|&s| Complex::new(s, 0.0)).collect();
    ir_padded.resize(n, Complex::new(0.0, 0.0));

    fft.process(&mut sig_padded);
    fft.process(&mut ir_padded);
    for (s, h) in sig_padded.iter_mut().zip(&ir_padded) {
        *s = *s * *h;
    }
    ifft.process(&mut sig_padded);

    let scale = 1.0 / n as f32;
    sig_padded.iter().map(|c| c.re * scale).collect()
}

// ============================================================================
// Reverb Effect
// ============================================================================

/// Convolution reverb with a fixed impulse response
#[derive(Debug, Clone)]
pub struct ConvolutionReverb {
    impulse: Vec<f32>,
    amount: f32,
}

impl ConvolutionReverb {
    /// Draw a fresh impulse response from the render RNG
    pub fn new<R: Rng + ?Sized>(sample_rate: u32, amount: f32, rng: &mut R) -> Self {
        Self::with_impulse(impulse_response(sample_rate, rng), amount)
    }

    pub fn with_impulse(impulse: Vec<f32>, amount: f32) -> Self {
        Self { impulse, amount }
    }
}

impl Effect for ConvolutionReverb {
    fn process(&mut self, wave: &mut Waveform) {
        if self.amount <= 0.0 || wave.is_empty() {
            return;
        }

        let dry_peak = wave.peak();
        let mut wet = convolve(wave.samples(), &self.impulse);
        wet.truncate(wave.len());

        let wet_peak = wet.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        let match_gain = if wet_peak > 0.0 { dry_peak / wet_peak } else { 0.0 };

        let a = self.amount;
        for (dry, w) in wave.samples_mut().iter_mut().zip(&wet) {
            *dry = (1.0 - a) * *dry + a * w * match_gain;
        }
    }

    fn effect_type(&self) -> &'static str {
        "reverb"
    }
}
