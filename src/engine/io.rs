//! Audio file I/O for fartgen
//!
//! Decodes sample WAV files into mono waveforms and writes finished renders.
//! Sample rate conversion uses linear interpolation; it only runs when a
//! sample's native rate differs from the requested render rate.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};

use crate::engine::buffer::{ChannelLayout, Waveform};
use crate::error::{FartgenError, Result};

/// Export format configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportFormat {
    /// Container/codec identifier handed to the encoder (default: "wav")
    pub format: String,
    /// Bit depth: 16, 24, or 32 (default: 16)
    pub bit_depth: u16,
    /// Output channels: 1 or 2; stereo duplicates the mono render (default: 1)
    pub channels: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat {
            format: "wav".to_string(),
            bit_depth: 16,
            channels: 1,
        }
    }
}

impl ExportFormat {
    /// Create a WAV export format with the given bit depth and channel count
    pub fn wav(bit_depth: u16, channels: u16) -> Self {
        ExportFormat {
            format: "wav".to_string(),
            bit_depth,
            channels,
        }
    }

    /// Check the format can actually be written
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.bit_depth, 16 | 24 | 32) {
            return Err(FartgenError::UnsupportedFormat {
                format: format!("{}-bit audio (only 16, 24, 32 supported)", self.bit_depth),
            });
        }
        if ChannelLayout::from_count(self.channels as usize).is_none() {
            return Err(FartgenError::UnsupportedFormat {
                format: format!("{}-channel output (only mono/stereo supported)", self.channels),
            });
        }
        Ok(())
    }
}

/// A decoded sample file, already folded down to mono
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples at the file's native sample rate
    pub waveform: Waveform,
    /// Channel count of the file on disk
    pub source_channels: u16,
}

/// Import a WAV file as a mono waveform
///
/// Stereo files are averaged down to mono. The native sample rate is kept.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not valid WAV, is empty, or holds NaN/Inf
/// * `UnsupportedFormat` - If the audio has more than 2 channels
pub fn import_audio(path: &Path) -> Result<DecodedAudio> {
    if !path.exists() {
        return Err(FartgenError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| FartgenError::InvalidAudio {
        reason: format!("Failed to open WAV file {}: {}", path.display(), e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let layout = ChannelLayout::from_count(spec.channels as usize).ok_or_else(|| {
        FartgenError::UnsupportedFormat {
            format: format!(
                "{}-channel audio (only mono/stereo supported)",
                spec.channels
            ),
        }
    })?;

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    let mono = downmix(&interleaved, layout);

    if mono.is_empty() {
        return Err(FartgenError::InvalidAudio {
            reason: format!("{} contains no samples", path.display()),
            source: None,
        });
    }
    if mono.iter().any(|s| !s.is_finite()) {
        return Err(FartgenError::InvalidAudio {
            reason: format!("{} contains NaN or infinite samples", path.display()),
            source: None,
        });
    }

    Ok(DecodedAudio {
        waveform: Waveform::from_samples(mono, spec.sample_rate),
        source_channels: spec.channels,
    })
}

/// Write a waveform to a WAV file
///
/// A stereo format writes the mono render to both channels.
pub fn export_audio(waveform: &Waveform, path: &Path, format: &ExportFormat) -> Result<()> {
    format.validate()?;

    let spec = WavSpec {
        channels: format.channels,
        sample_rate: waveform.sample_rate(),
        bits_per_sample: format.bit_depth,
        sample_format: if format.bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let mut writer = WavWriter::create(path, spec).map_err(encode_error)?;
    let repeats = format.channels as usize;

    for &sample in waveform.samples() {
        for _ in 0..repeats {
            match format.bit_depth {
                16 => {
                    let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                    writer.write_sample(scaled).map_err(encode_error)?;
                }
                24 => {
                    // 24-bit stored as i32 in hound
                    let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                    writer.write_sample(scaled).map_err(encode_error)?;
                }
                _ => writer.write_sample(sample).map_err(encode_error)?,
            }
        }
    }

    writer.finalize().map_err(encode_error)?;
    Ok(())
}

fn encode_error(e: hound::Error) -> FartgenError {
    FartgenError::Encode {
        reason: e.to_string(),
    }
}

/// Convert a waveform to `target_rate`, returning it unchanged if it already matches
pub fn conform_rate(waveform: Waveform, target_rate: u32) -> Waveform {
    if waveform.sample_rate() == target_rate || waveform.sample_rate() == 0 {
        return Waveform::from_samples(waveform.into_samples(), target_rate);
    }
    let ratio = target_rate as f64 / waveform.sample_rate() as f64;
    let resampled = resample_linear(waveform.samples(), ratio);
    Waveform::from_samples(resampled, target_rate)
}

/// Stretch or squeeze `samples` to exactly `target_len` by linear interpolation
///
/// Reading faster than the source raises pitch; this is what turns a
/// time-stretched buffer into a pitch shift.
pub fn resample_to_len(samples: &[f32], target_len: usize) -> Vec<f32> {
    if samples.is_empty() || target_len == 0 {
        return vec![0.0; target_len];
    }
    if samples.len() == target_len {
        return samples.to_vec();
    }

    let step = samples.len() as f64 / target_len as f64;
    (0..target_len)
        .map(|i| interpolate(samples, i as f64 * step))
        .collect()
}

/// Linear interpolation resampling by `ratio` (target rate / source rate)
pub fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let target_len = ((samples.len() as f64) * ratio).ceil() as usize;
    (0..target_len)
        .map(|i| interpolate(samples, i as f64 / ratio))
        .collect()
}

#[inline]
fn interpolate(samples: &[f32], src_pos: f64) -> f32 {
    let src_idx = src_pos.floor() as usize;
    let frac = (src_pos - src_idx as f64) as f32;

    if src_idx + 1 < samples.len() {
        samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
    } else if src_idx < samples.len() {
        samples[src_idx]
    } else {
        0.0
    }
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let invalid = |bits: &str, e: hound::Error| FartgenError::InvalidAudio {
        reason: format!("Failed to read {} samples: {}", bits, e),
        source: Some(Box::new(e)),
    };

    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("float", e)),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("8-bit", e)),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("16-bit", e)),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("24-bit", e)),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("32-bit int", e)),
            _ => Err(FartgenError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

/// Fold interleaved frames down to one channel by averaging
fn downmix(interleaved: &[f32], layout: ChannelLayout) -> Vec<f32> {
    let channels = layout.num_channels();
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
