//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use crate::assets::SampleStore;
use crate::config::EngineConfig;
use crate::error::FartgenError;
use crate::params::{PresetType, RenderRequest};
use crate::pipeline::{CancellationToken, ProgressEvent, RenderPipeline, WavEncoder};

/// Load the engine configuration, or defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Read a render request JSON file
pub fn read_request(path: &Path) -> Result<RenderRequest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading request {}", path.display()))?;
    let request = serde_json::from_str(&text)
        .with_context(|| format!("parsing request {}", path.display()))?;
    Ok(request)
}

/// Structured form of an error, as printed by the CLI
pub fn error_json(err: &FartgenError) -> serde_json::Value {
    let mut value = json!({
        "code": err.error_code(),
        "kind": err.kind(),
        "message": err.to_string(),
        "recoverable": err.is_recoverable(),
        "suggestions": err.recovery_suggestions(),
    });
    if let FartgenError::Validation {
        field,
        value: got,
        expected,
    } = err
    {
        value["field"] = json!(field);
        value["value"] = json!(got);
        value["expected"] = json!(expected);
    }
    value
}

/// Render one request, printing progress events as JSON lines
pub fn render(config: &EngineConfig, request: &RenderRequest) -> Result<()> {
    config.validate().context("invalid engine configuration")?;

    info!("Loading sample library: {}", config.library_path.display());
    let store = SampleStore::load_with_config(config).context("loading sample library")?;

    let pipeline = RenderPipeline::new(&store, config)
        .context("invalid engine configuration")?
        .with_encoder(WavEncoder::new(config.output_dir.clone()));

    let mut print_event = |event: ProgressEvent| {
        if let Ok(line) = serde_json::to_string(&event) {
            println!("{}", line);
        }
    };

    let output = pipeline
        .render_request(request, &mut print_event, &CancellationToken::new())
        .context("render failed")?;

    if let Some(artifact) = &output.artifact {
        println!("{}", artifact.uri);
    }
    info!(
        "Rendered {:.3}s (digest {}) in {}ms",
        output.duration_actual, output.digest, output.elapsed_ms
    );
    Ok(())
}

/// Validate a request file
///
/// Prints the normalized parameters, or the structured validation error.
/// Returns whether the request was valid.
pub fn validate(path: &Path) -> Result<bool> {
    let request = read_request(path)?;
    match request.validate() {
        Ok(params) => {
            println!("{}", serde_json::to_string_pretty(&params)?);
            Ok(true)
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&error_json(&e))?);
            Ok(false)
        }
    }
}

/// Load the library and list categories, assets, durations and checksums
///
/// A successful run doubles as a health check of the library.
pub fn library(config: &EngineConfig) -> Result<()> {
    let store = SampleStore::load_with_config(config).with_context(|| {
        format!("loading sample library {}", config.library_path.display())
    })?;

    println!("Sample library: {}", config.library_path.display());
    for preset in PresetType::ALL {
        let assets = store.assets_for(preset);
        println!("{} ({} assets)", preset, assets.len());
        for asset in assets {
            let meta = asset.metadata();
            println!(
                "  {}  {:.3}s  {}ch@{}Hz  {}",
                meta.origin.display(),
                meta.duration_secs,
                meta.source_channels,
                asset.waveform().sample_rate(),
                meta.checksum
            );
        }
    }
    println!("Total: {} assets", store.total_assets());
    Ok(())
}
