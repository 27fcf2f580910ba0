//! Wetness low-pass
//!
//! 4th-order Butterworth low-pass built from two cascaded biquad sections.

use biquad::{Biquad, Coefficients, DirectForm1, Type as FilterType};

use crate::error::{FartgenError, Result};

/// Q of each second-order section of a 4th-order Butterworth response
const BUTTERWORTH_Q4: [f32; 2] = [0.541_196_1, 1.306_563];

/// Apply the 4th-order low-pass at `cutoff_hz` in place
///
/// The cutoff must lie strictly between 0 Hz and Nyquist.
pub fn lowpass_4th_order(samples: &mut [f32], sample_rate: u32, cutoff_hz: f32) -> Result<()> {
    let nyquist = sample_rate as f32 / 2.0;
    if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
        return Err(FartgenError::TransformInstability {
            step: format!(
                "low-pass design at {} Hz: outside (0, {}) Hz",
                cutoff_hz, nyquist
            ),
        });
    }

    // biquad's normalized frequency is relative to Nyquist
    let normalized = cutoff_hz / nyquist;
    for q in BUTTERWORTH_Q4 {
        let coeffs = Coefficients::<f32>::from_normalized_params(FilterType::LowPass, normalized, q)
            .map_err(|e| FartgenError::TransformInstability {
                step: format!("low-pass design at {} Hz: {:?}", cutoff_hz, e),
            })?;
        let mut section = DirectForm1::<f32>::new(coeffs);
        for sample in samples.iter_mut() {
            *sample = section.run(*sample);
        }
    }
    Ok(())
}
