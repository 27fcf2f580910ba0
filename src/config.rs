//! Engine configuration
//!
//! Process-level settings read once at startup. Everything has a default so
//! an empty JSON object is a valid configuration file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::ExportFormat;
use crate::error::{FartgenError, Result};
use crate::params::PresetType;

/// Default wall-clock budget for one render
pub const DEFAULT_RENDER_TIMEOUT_SECS: f64 = 30.0;

/// Default number of perturbed-seed retries after a transform instability
pub const DEFAULT_TRANSFORM_RETRIES: u32 = 1;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of the sample library (`<library>/<preset>/*.wav`)
    pub library_path: PathBuf,
    /// Explicit preset → files mapping; relative paths resolve against `library_path`.
    /// Presets missing here fall back to scanning their directory.
    pub categories: BTreeMap<PresetType, Vec<PathBuf>>,
    /// Where the WAV encoder writes artifacts
    pub output_dir: PathBuf,
    /// Wall-clock budget for a whole render, in seconds
    pub render_timeout_secs: f64,
    /// Perturbed-seed retries before the transform degrades to the raw sample
    pub transform_retries: u32,
    /// Artifact format handed to the encoder
    pub export: ExportFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from("samples"),
            categories: BTreeMap::new(),
            output_dir: PathBuf::from("renders"),
            render_timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
            transform_retries: DEFAULT_TRANSFORM_RETRIES,
            export: ExportFormat::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FartgenError::FileNotFound {
            path: path.display().to_string(),
            source: Some(e),
        })?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        self.render_timeout()?;
        self.export.validate().map_err(|e| FartgenError::Config {
            reason: e.to_string(),
        })
    }

    /// Render budget as a `Duration`
    ///
    /// # Errors
    /// * `Config` - If the budget is not positive or does not fit a `Duration`
    pub fn render_timeout(&self) -> Result<Duration> {
        let invalid = || FartgenError::Config {
            reason: format!(
                "render_timeout_secs must be a positive number of seconds, got {}",
                self.render_timeout_secs
            ),
        };
        let timeout = Duration::try_from_secs_f64(self.render_timeout_secs).map_err(|_| invalid())?;
        if timeout.is_zero() {
            return Err(invalid());
        }
        Ok(timeout)
    }
}
