//! Pipeline Tests
//!
//! End-to-end properties of the render pipeline over an in-memory library.

use std::f32::consts::TAU;

use fartgen::assets::{SampleAsset, SampleStore};
use fartgen::config::EngineConfig;
use fartgen::engine::Waveform;
use fartgen::params::{AudioParameters, PresetType, RenderRequest};
use fartgen::pipeline::{CancellationToken, NullSink, ProgressEvent, RenderOutput, RenderPipeline};
use fartgen::synth::LayerKind;
use fartgen::FartgenError;
use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use test_case::test_case;

/// Decaying buzz with a wobbling pitch, roughly what a recorded sample looks like
fn buzz(frequency: f32, len: usize, sample_rate: u32) -> Waveform {
    let sr = sample_rate as f32;
    let mut phase = 0.0_f32;
    let samples = (0..len)
        .map(|i| {
            let t = i as f32 / sr;
            let f = frequency * (1.0 + 0.1 * (TAU * 6.0 * t).sin());
            phase += TAU * f / sr;
            let envelope = (1.0 - i as f32 / len as f32).max(0.0);
            0.7 * envelope * (phase.sin() + 0.3 * (2.0 * phase).sin())
        })
        .collect();
    Waveform::from_samples(samples, sample_rate)
}

fn library() -> SampleStore {
    let mut assets = Vec::new();
    for (k, preset) in PresetType::ALL.iter().enumerate() {
        let base = 80.0 + 40.0 * k as f32;
        assets.push(SampleAsset::from_waveform(*preset, buzz(base, 26_000, 44100), "a").unwrap());
        assets.push(SampleAsset::from_waveform(*preset, buzz(base * 1.3, 41_000, 44100), "b").unwrap());
        // one asset recorded at a different rate to exercise rate conforming
        assets.push(SampleAsset::from_waveform(*preset, buzz(base * 0.8, 16_000, 22050), "c").unwrap());
    }
    SampleStore::from_assets(assets).unwrap()
}

fn params(duration: f64, wetness: i64, pitch: i64, preset: &str, seed: u64) -> AudioParameters {
    RenderRequest {
        duration,
        wetness,
        pitch,
        preset: preset.to_string(),
        seed,
        ..Default::default()
    }
    .validate()
    .unwrap()
}

fn render(store: &SampleStore, params: &AudioParameters) -> RenderOutput {
    RenderPipeline::new(store, &EngineConfig::default()).unwrap()
        .render(params, &mut NullSink, &CancellationToken::new())
        .unwrap()
}

// === Determinism ===

#[test]
fn test_same_seed_is_byte_identical() {
    let store = library();
    let p = RenderRequest {
        duration: 2.0,
        wetness: 8,
        pitch: 3,
        preset: "classic".to_string(),
        reverb_amount: 0.4,
        distortion: 0.3,
        seed: 1234,
        ..Default::default()
    }
    .validate()
    .unwrap();

    let first = render(&store, &p);
    let second = render(&store, &p);
    assert_eq!(first.digest, second.digest);
    assert_eq!(first.waveform, second.waveform);
    assert_ne!(first.render_id, second.render_id);
}

#[test]
fn test_different_seed_changes_output() {
    let store = library();
    let a = render(&store, &params(1.0, 7, 5, "stutterer", 1));
    let b = render(&store, &params(1.0, 7, 5, "stutterer", 2));
    assert_ne!(a.digest, b.digest);
}

// === Duration fidelity, finiteness, peak bound ===

#[test_case(0.5, 0, 0, "squeaker" ; "shortest")]
#[test_case(1.7, 5, 10, "rumbler" ; "highest pitch")]
#[test_case(3.3, 10, 0, "wet" ; "wettest lowest")]
#[test_case(10.0, 6, 5, "classic" ; "longest")]
fn test_output_properties(duration: f64, wetness: i64, pitch: i64, preset: &str) {
    let store = library();
    let out = render(&store, &params(duration, wetness, pitch, preset, 99));

    let expected = duration * 44100.0;
    let actual = out.waveform.len() as f64;
    assert!((actual - expected).abs() <= (expected * 0.02).max(1.0));
    assert_relative_eq!(out.duration_actual, duration, epsilon = 0.02 * duration);

    assert!(out.waveform.is_finite());
    assert!(out.waveform.peak() <= 0.95 + 1e-6, "peak {}", out.waveform.peak());
    assert!(out.waveform.peak() > 0.0);
}

#[test]
fn test_distortion_and_reverb_keep_bounds() {
    let store = library();
    let p = RenderRequest {
        duration: 1.5,
        wetness: 10,
        pitch: 10,
        preset: "squeaker".to_string(),
        reverb_amount: 1.0,
        distortion: 1.0,
        seed: 5,
        ..Default::default()
    }
    .validate()
    .unwrap();
    let out = render(&store, &p);
    assert!(out.waveform.is_finite());
    assert!(out.waveform.peak() <= 0.95 + 1e-6);
    assert_eq!(out.waveform.len(), 66150);
}

// === Layers ===

#[test]
fn test_wetness_zero_has_no_bubbling() {
    let store = library();
    for seed in 0..3 {
        let out = render(&store, &params(1.0, 0, 5, "classic", seed));
        assert_eq!(out.layers, vec![LayerKind::Noise, LayerKind::Rumble]);
        assert_eq!(out.bubble_count, 0);
    }
}

#[test]
fn test_wetness_ten_always_has_bubbling() {
    let store = library();
    for seed in 0..3 {
        let out = render(&store, &params(1.0, 10, 5, "wet", seed));
        assert!(out.layers.contains(&LayerKind::Bubbling));
        assert_eq!(out.bubble_count, 50);
        assert_eq!(out.lowpass_cutoff_hz, Some(800.0));
    }
}

// === Scenarios ===

#[test]
fn test_scenario_rumbler() {
    let store = library();
    let out = render(&store, &params(4.5, 3, 2, "rumbler", 42));
    assert_eq!(out.waveform.len(), 198_450);
    assert!(!out.layers.contains(&LayerKind::Bubbling));
    assert_relative_eq!(out.rumble_frequency_hz, 40.0 * 2.0_f32.powf(0.4), epsilon = 1e-3);
    assert_eq!(out.lowpass_cutoff_hz, None);
}

#[test]
fn test_scenario_squeaker() {
    let store = library();
    let out = render(&store, &params(0.8, 1, 7, "squeaker", 7));
    assert_eq!(out.waveform.len(), 35_280);
    assert_eq!(out.lowpass_cutoff_hz, None);
    assert_eq!(out.parameters.semitone_shift(), 4);
}

#[test]
fn test_scenario_wet() {
    let store = library();
    let out = render(&store, &params(3.0, 9, 4, "wet", 1));
    assert_eq!(out.waveform.len(), 132_300);
    assert!(out.layers.contains(&LayerKind::Bubbling));
    assert_eq!(out.bubble_count, 45);
    assert_eq!(out.lowpass_cutoff_hz, Some(1000.0));
}

// === Boundaries ===

#[test_case(0.5, true ; "minimum duration")]
#[test_case(10.0, true ; "maximum duration")]
#[test_case(10.01, false ; "just over maximum")]
#[test_case(0.49, false ; "just under minimum")]
fn test_duration_boundary(duration: f64, accepted: bool) {
    let store = library();
    let pipeline = RenderPipeline::new(&store, &EngineConfig::default()).unwrap();
    let request = RenderRequest {
        duration,
        ..Default::default()
    };
    let mut events: Vec<ProgressEvent> = Vec::new();
    let result = pipeline.render_request(&request, &mut events, &CancellationToken::new());

    if accepted {
        assert!(result.is_ok());
        assert_eq!(events.last().map(|e| e.stage()), Some("complete"));
    } else {
        let err = result.unwrap_err();
        assert!(matches!(err, FartgenError::Validation { ref field, .. } if field == "duration"));
        assert!(!err.is_recoverable());
        assert_eq!(events.len(), 1);
    }
}

#[test]
fn test_other_sample_rate() {
    let store = library();
    let p = RenderRequest {
        duration: 1.0,
        wetness: 7,
        sample_rate: 48000,
        seed: 3,
        ..Default::default()
    }
    .validate()
    .unwrap();
    let out = render(&store, &p);
    assert_eq!(out.waveform.sample_rate(), 48000);
    assert_eq!(out.waveform.len(), 48000);
    assert!(out.waveform.is_finite());
}

// === Events ===

#[test]
fn test_complete_event_echoes_parameters() {
    let store = library();
    let p = params(1.2, 4, 6, "stutterer", 11);
    let mut events: Vec<ProgressEvent> = Vec::new();
    RenderPipeline::new(&store, &EngineConfig::default()).unwrap()
        .render(&p, &mut events, &CancellationToken::new())
        .unwrap();

    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::PostProcessing { progress } => Some(*progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![0, 25, 50, 75, 100]);

    match events.last() {
        Some(ProgressEvent::Complete {
            parameters_echo,
            duration_actual,
            artifact_ref,
        }) => {
            assert_eq!(parameters_echo, &p);
            assert_relative_eq!(*duration_actual, 1.2, epsilon = 1e-4);
            assert!(artifact_ref.is_none());
        }
        other => panic!("expected complete event, got {:?}", other),
    }
}

// === Concurrency ===

#[test]
fn test_concurrent_renders_share_store() {
    let store = library();
    let pipeline = RenderPipeline::new(&store, &EngineConfig::default()).unwrap();
    let p = params(1.0, 6, 3, "classic", 77);

    let digests: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    pipeline
                        .render(&p, &mut NullSink, &CancellationToken::new())
                        .unwrap()
                        .digest
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(digests.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(digests[0], render(&store, &p).digest);
}
