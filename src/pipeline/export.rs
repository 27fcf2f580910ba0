//! Export boundary
//!
//! The pipeline hands the finished waveform to an `Encoder` and gets back a
//! reference to the stored artifact. Mono to stereo duplication happens
//! here, never inside the engine.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::engine::{export_audio, ExportFormat, Waveform};
use crate::error::{FartgenError, Result};

/// Where an encoded render ended up
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRef {
    /// Location of the artifact (a file path for the WAV encoder)
    pub uri: String,
    /// Container/codec identifier
    pub format: String,
    pub channels: u16,
    pub bit_depth: u16,
    /// Size of the stored artifact in bytes
    pub bytes: u64,
}

/// Turns a finished waveform into a stored artifact
pub trait Encoder: Send + Sync {
    /// Encode `wave` under `name` (without extension)
    ///
    /// # Errors
    /// * `Encode` - the artifact could not be produced; safe to retry
    fn encode(&self, wave: &Waveform, format: &ExportFormat, name: &str) -> Result<ArtifactRef>;
}

/// Writes `<output_dir>/<name>.wav` with `hound`
#[derive(Debug, Clone)]
pub struct WavEncoder {
    output_dir: PathBuf,
}

impl WavEncoder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }
}

impl Encoder for WavEncoder {
    fn encode(&self, wave: &Waveform, format: &ExportFormat, name: &str) -> Result<ArtifactRef> {
        if !format.format.eq_ignore_ascii_case("wav") {
            return Err(FartgenError::Encode {
                reason: format!("WAV encoder cannot produce '{}'", format.format),
            });
        }
        format.validate().map_err(|e| FartgenError::Encode {
            reason: e.to_string(),
        })?;

        fs::create_dir_all(&self.output_dir).map_err(|e| FartgenError::Encode {
            reason: format!("cannot create {}: {}", self.output_dir.display(), e),
        })?;

        let path = self.output_dir.join(format!("{}.wav", name));
        export_audio(wave, &path, format)?;

        let bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        debug!(path = %path.display(), bytes, "artifact written");

        Ok(ArtifactRef {
            uri: path.display().to_string(),
            format: "wav".to_string(),
            channels: format.channels,
            bit_depth: format.bit_depth,
            bytes,
        })
    }
}
