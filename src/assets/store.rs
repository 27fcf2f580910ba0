//! Sample Asset Store
//!
//! Holds the base recordings for every preset. The store is filled once at
//! startup and is read-only afterwards, so any number of renders can share
//! it by reference without locking.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::seq::index;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::engine::{import_audio, Waveform};
use crate::error::{FartgenError, Result};
use crate::params::PresetType;

/// Most samples layered into one render
pub const MAX_SELECTED: usize = 3;

/// Where an asset came from and what it looked like on disk
#[derive(Debug, Clone, PartialEq)]
pub struct AssetMetadata {
    /// Source file, or a label for in-memory assets
    pub origin: PathBuf,
    /// Duration in seconds at the native rate
    pub duration_secs: f64,
    /// Channel count of the source file (audio is held as mono)
    pub source_channels: u16,
    /// SHA-256 of the source file bytes
    pub checksum: String,
    /// When the asset entered the store
    pub loaded_at: DateTime<Utc>,
}

/// One immutable base recording
#[derive(Debug, Clone)]
pub struct SampleAsset {
    preset: PresetType,
    waveform: Waveform,
    metadata: AssetMetadata,
}

impl SampleAsset {
    /// Decode a WAV file into an asset
    pub fn from_file(preset: PresetType, path: &Path) -> Result<Self> {
        let decoded = import_audio(path)?;
        let checksum = file_checksum(path)?;
        Ok(Self {
            preset,
            metadata: AssetMetadata {
                origin: path.to_path_buf(),
                duration_secs: decoded.waveform.duration_secs(),
                source_channels: decoded.source_channels,
                checksum,
                loaded_at: Utc::now(),
            },
            waveform: decoded.waveform,
        })
    }

    /// Build an asset from audio already in memory
    ///
    /// The checksum covers the sample data instead of file bytes.
    pub fn from_waveform(preset: PresetType, waveform: Waveform, label: &str) -> Result<Self> {
        if waveform.is_empty() || !waveform.is_finite() {
            return Err(FartgenError::InvalidAudio {
                reason: format!("in-memory asset '{}' is empty or not finite", label),
                source: None,
            });
        }
        Ok(Self {
            preset,
            metadata: AssetMetadata {
                origin: PathBuf::from(label),
                duration_secs: waveform.duration_secs(),
                source_channels: 1,
                checksum: waveform.digest(),
                loaded_at: Utc::now(),
            },
            waveform,
        })
    }

    /// Preset category this asset belongs to
    pub fn preset(&self) -> PresetType {
        self.preset
    }

    /// Read-only view of the recording; stages must clone before mutating
    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    /// Asset metadata
    pub fn metadata(&self) -> &AssetMetadata {
        &self.metadata
    }
}

/// Immutable collection of sample assets grouped by preset
#[derive(Debug, Clone)]
pub struct SampleStore {
    assets: BTreeMap<PresetType, Vec<SampleAsset>>,
}

impl SampleStore {
    /// Load every preset directory under `library_path`
    ///
    /// # Errors
    /// * `MissingAsset` - If a preset directory holds no WAV files
    /// * `FileNotFound` / `InvalidAudio` - If a sample cannot be decoded
    pub fn load(library_path: &Path) -> Result<Self> {
        Self::load_with_config(&EngineConfig {
            library_path: library_path.to_path_buf(),
            ..Default::default()
        })
    }

    /// Load the library described by an engine configuration
    ///
    /// Presets listed under `categories` use exactly those files; the rest
    /// are discovered by scanning `<library_path>/<preset>/`.
    pub fn load_with_config(config: &EngineConfig) -> Result<Self> {
        let mut loaded = Vec::new();

        for preset in PresetType::ALL {
            let files = match config.categories.get(&preset) {
                Some(files) => files
                    .iter()
                    .map(|f| config.library_path.join(f))
                    .collect(),
                None => scan_category(&config.library_path.join(preset.as_str())),
            };

            for file in files {
                debug!(preset = %preset, file = %file.display(), "loading sample");
                loaded.push(SampleAsset::from_file(preset, &file)?);
            }
        }

        let store = Self::from_assets(loaded)?;
        info!(
            library = %config.library_path.display(),
            assets = store.total_assets(),
            "sample store loaded"
        );
        Ok(store)
    }

    /// Build a store from assets already in memory
    ///
    /// Fails with `MissingAsset` unless every preset has at least one asset.
    pub fn from_assets(assets: impl IntoIterator<Item = SampleAsset>) -> Result<Self> {
        let mut grouped: BTreeMap<PresetType, Vec<SampleAsset>> = BTreeMap::new();
        for asset in assets {
            grouped.entry(asset.preset()).or_default().push(asset);
        }

        for preset in PresetType::ALL {
            if grouped.get(&preset).map_or(true, |list| list.is_empty()) {
                return Err(FartgenError::MissingAsset {
                    category: preset.as_str().to_string(),
                });
            }
        }

        Ok(Self { assets: grouped })
    }

    /// Assets registered under a preset
    pub fn assets_for(&self, preset: PresetType) -> &[SampleAsset] {
        self.assets.get(&preset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of assets across all presets
    pub fn total_assets(&self) -> usize {
        self.assets.values().map(Vec::len).sum()
    }

    /// Pick 1..=3 distinct assets for a preset, uniformly at random
    ///
    /// The count is drawn first, then the assets without replacement, both
    /// from the render's RNG so the choice is reproducible from the seed.
    pub fn select_for<R: Rng + ?Sized>(
        &self,
        preset: PresetType,
        rng: &mut R,
    ) -> Result<Vec<&SampleAsset>> {
        let available = self.assets_for(preset);
        if available.is_empty() {
            return Err(FartgenError::MissingAsset {
                category: preset.as_str().to_string(),
            });
        }

        let max = available.len().min(MAX_SELECTED);
        let count = rng.gen_range(1..=max);
        let picked = index::sample(rng, available.len(), count)
            .into_iter()
            .map(|i| &available[i])
            .collect();
        Ok(picked)
    }
}

/// WAV files directly inside a category directory, sorted by name
fn scan_category(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect()
}

fn file_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(|e| FartgenError::FileNotFound {
        path: path.display().to_string(),
        source: Some(e),
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
