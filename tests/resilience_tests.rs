//! Resilience Tests
//!
//! Transform retries and fallback, timeouts, cancellation and startup
//! failures.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fartgen::assets::{SampleAsset, SampleStore};
use fartgen::config::EngineConfig;
use fartgen::engine::Waveform;
use fartgen::params::{AudioParameters, PresetType, RenderRequest};
use fartgen::pipeline::{CancellationToken, NullSink, ProgressEvent, RenderPipeline};
use fartgen::transform::{BaseTransform, StandardTransform};
use fartgen::{FartgenError, Result};
use pretty_assertions::assert_eq;

fn tone(frequency: f32, len: usize) -> Waveform {
    let samples = (0..len)
        .map(|i| 0.5 * (TAU * frequency * i as f32 / 44100.0).sin())
        .collect();
    Waveform::from_samples(samples, 44100)
}

fn library() -> SampleStore {
    SampleStore::from_assets(PresetType::ALL.iter().flat_map(|&preset| {
        vec![
            SampleAsset::from_waveform(preset, tone(110.0, 20_000), "short").unwrap(),
            SampleAsset::from_waveform(preset, tone(150.0, 60_000), "long").unwrap(),
        ]
    }))
    .unwrap()
}

fn params() -> AudioParameters {
    RenderRequest {
        duration: 1.0,
        wetness: 7,
        pitch: 6,
        seed: 21,
        ..Default::default()
    }
    .validate()
    .unwrap()
}

/// Transform that always blows up
struct AlwaysUnstable;

impl BaseTransform for AlwaysUnstable {
    fn name(&self) -> &'static str {
        "always-unstable"
    }

    fn apply(&self, _bases: Vec<Waveform>, _params: &AudioParameters) -> Result<Waveform> {
        Err(FartgenError::TransformInstability {
            step: "time_stretch".to_string(),
        })
    }
}

/// Fails a fixed number of times, then behaves like the standard transform
struct FlakyTransform {
    failures_left: AtomicUsize,
    calls: Arc<AtomicUsize>,
    seeds: Arc<std::sync::Mutex<Vec<u64>>>,
}

impl FlakyTransform {
    fn new(failures: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            calls: Arc::new(AtomicUsize::new(0)),
            seeds: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }
}

impl BaseTransform for FlakyTransform {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn apply(&self, bases: Vec<Waveform>, params: &AudioParameters) -> Result<Waveform> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seeds.lock().unwrap().push(params.seed());
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(FartgenError::TransformInstability {
                step: "pitch_shift".to_string(),
            });
        }
        StandardTransform.apply(bases, params)
    }
}

// === Retry and fallback ===

#[test]
fn test_unstable_transform_falls_back_to_first_sample() {
    let store = library();
    let pipeline = RenderPipeline::new(&store, &EngineConfig::default())
        .unwrap()
        .with_transform(AlwaysUnstable);
    let out = pipeline
        .render(&params(), &mut NullSink, &CancellationToken::new())
        .unwrap();

    assert!(out.degraded);
    assert_eq!(out.transform_attempts, 2);
    assert_eq!(out.selected_assets.len(), 1);
    assert_eq!(out.waveform.len(), 44100);
    assert!(out.waveform.is_finite());
    assert!(out.waveform.peak() <= 0.95);
}

#[test]
fn test_retry_count_is_configurable() {
    let store = library();
    for retries in [0, 3] {
        let out = RenderPipeline::new(&store, &EngineConfig::default()).unwrap()
            .with_transform(AlwaysUnstable)
            .with_retries(retries)
            .render(&params(), &mut NullSink, &CancellationToken::new())
            .unwrap();
        assert!(out.degraded);
        assert_eq!(out.transform_attempts, retries + 1);
    }
}

#[test]
fn test_retry_recovers_with_perturbed_seed() {
    let store = library();
    let flaky = FlakyTransform::new(1);
    let calls = Arc::clone(&flaky.calls);
    let seeds = Arc::clone(&flaky.seeds);

    let out = RenderPipeline::new(&store, &EngineConfig::default()).unwrap()
        .with_transform(flaky)
        .render(&params(), &mut NullSink, &CancellationToken::new())
        .unwrap();

    assert!(!out.degraded);
    assert_eq!(out.transform_attempts, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let seeds = seeds.lock().unwrap();
    assert_eq!(seeds[0], 21);
    assert_ne!(seeds[1], 21);
}

#[test]
fn test_retry_is_deterministic() {
    let store = library();
    let render = || {
        RenderPipeline::new(&store, &EngineConfig::default()).unwrap()
            .with_transform(FlakyTransform::new(1))
            .render(&params(), &mut NullSink, &CancellationToken::new())
            .unwrap()
            .digest
    };
    assert_eq!(render(), render());
}

// === Timeout ===

#[test]
fn test_zero_budget_times_out() {
    let store = library();
    let mut events: Vec<ProgressEvent> = Vec::new();
    let err = RenderPipeline::new(&store, &EngineConfig::default()).unwrap()
        .with_timeout(Duration::ZERO)
        .render(&params(), &mut events, &CancellationToken::new())
        .unwrap_err();

    assert!(matches!(err, FartgenError::Timeout { ref stage, .. } if stage == "selecting"));
    assert_eq!(err.kind(), "timeout");
    assert!(!err.is_recoverable());
    match events.last() {
        Some(ProgressEvent::Error { kind, .. }) => assert_eq!(kind, "timeout"),
        other => panic!("expected error event, got {:?}", other),
    }
}

#[test]
fn test_unrepresentable_budget_is_config_error() {
    let store = library();
    for secs in [1e20, -5.0] {
        let config = EngineConfig {
            render_timeout_secs: secs,
            ..Default::default()
        };
        let err = RenderPipeline::new(&store, &config).err().unwrap();
        assert_eq!(err.kind(), "config");
    }
}

// === Cancellation ===

#[test]
fn test_cancelled_before_start_stops_at_first_boundary() {
    let store = library();
    let token = CancellationToken::new();
    token.cancel();
    let err = RenderPipeline::new(&store, &EngineConfig::default()).unwrap()
        .render(&params(), &mut NullSink, &token)
        .unwrap_err();
    assert!(matches!(err, FartgenError::Cancelled { ref stage } if stage == "selecting"));
}

#[test]
fn test_cancel_mid_render_stops_at_next_boundary() {
    let store = library();
    let token = CancellationToken::new();
    let handle = token.clone();
    let mut stages = Vec::new();
    let mut sink = |event: ProgressEvent| {
        if event == ProgressEvent::Mixing {
            handle.cancel();
        }
        stages.push(event.stage());
    };

    let err = RenderPipeline::new(&store, &EngineConfig::default()).unwrap()
        .render(&params(), &mut sink, &token)
        .unwrap_err();

    assert!(matches!(err, FartgenError::Cancelled { ref stage } if stage == "mixing"));
    assert_eq!(
        stages,
        vec!["selecting", "synthesizing", "transforming", "mixing", "error"]
    );
}

// === Startup failures ===

#[test]
fn test_empty_category_is_missing_asset() {
    let assets = [PresetType::Squeaker, PresetType::Rumbler, PresetType::Classic]
        .into_iter()
        .map(|p| SampleAsset::from_waveform(p, tone(100.0, 1000), "x").unwrap());
    let err = SampleStore::from_assets(assets).unwrap_err();
    assert!(matches!(err, FartgenError::MissingAsset { ref category } if category == "stutterer"));
    assert_eq!(err.error_code(), "MISSING_ASSET");
    assert!(!err.is_recoverable());
}

#[test]
fn test_non_finite_asset_is_rejected() {
    let bad = Waveform::from_samples(vec![0.1, f32::NAN, 0.2], 44100);
    let err = SampleAsset::from_waveform(PresetType::Wet, bad, "nan").unwrap_err();
    assert_eq!(err.kind(), "load");
}
