//! Render orchestrator
//!
//! Sequences one render: select → synthesize → transform → mix →
//! post-process → export. A single `StdRng` seeded from the parameters is
//! threaded through the stages in that order, which makes the waveform a
//! pure function of seed and parameters.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::assets::{SampleAsset, SampleStore};
use crate::config::EngineConfig;
use crate::dsp::{mix, PostProcessor};
use crate::engine::{ExportFormat, Waveform};
use crate::error::{FartgenError, Result};
use crate::params::{AudioParameters, RenderRequest};
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::events::{ProgressEvent, ProgressSink};
use crate::pipeline::export::{ArtifactRef, Encoder};
use crate::synth::{pitch_to_frequency, synthesize, LayerKind};
use crate::transform::{fallback, prepare_bases, BaseTransform, StandardTransform};

/// Odd 64-bit constant mixed into the seed for each transform retry
const RETRY_SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// Everything a render produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    /// Identifier for logs and artifact names; never affects the audio
    pub render_id: Uuid,
    /// Final waveform, ready for encoding
    #[serde(skip)]
    pub waveform: Waveform,
    pub parameters: AudioParameters,
    /// Origins of the base samples the audio was built from
    pub selected_assets: Vec<PathBuf>,
    /// Procedural layers that went into the mix
    pub layers: Vec<LayerKind>,
    pub bubble_count: usize,
    pub rumble_frequency_hz: f32,
    /// Low-pass cutoff, when wetness called for one
    pub lowpass_cutoff_hz: Option<f32>,
    /// Transform attempts made (1 when the first one succeeded)
    pub transform_attempts: u32,
    /// Whether the transform gave up and the raw sample was used
    pub degraded: bool,
    pub duration_actual: f64,
    /// SHA-256 of the final samples
    pub digest: String,
    pub artifact: Option<ArtifactRef>,
    pub elapsed_ms: u64,
}

/// Result of the transform stage after retries
struct TransformOutcome {
    base: Waveform,
    selected: Vec<PathBuf>,
    attempts: u32,
    degraded: bool,
}

/// Render pipeline over a shared, read-only sample store
///
/// A pipeline holds no per-render state, so one value can serve renders on
/// many threads at once.
pub struct RenderPipeline<'a> {
    store: &'a SampleStore,
    transform: Box<dyn BaseTransform>,
    encoder: Option<Box<dyn Encoder>>,
    export: ExportFormat,
    transform_retries: u32,
    timeout: Duration,
}

impl<'a> RenderPipeline<'a> {
    /// Pipeline with the standard transform and no encoder
    ///
    /// # Errors
    /// * `Config` - If the configured render budget is unusable
    pub fn new(store: &'a SampleStore, config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            store,
            transform: Box::new(StandardTransform),
            encoder: None,
            export: config.export.clone(),
            transform_retries: config.transform_retries,
            timeout: config.render_timeout()?,
        })
    }

    pub fn with_transform(mut self, transform: impl BaseTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    pub fn with_encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.transform_retries = retries;
        self
    }

    /// Validate a raw request, then render it
    ///
    /// Validation failures are reported on the sink like any other error
    /// and no stage runs.
    pub fn render_request(
        &self,
        request: &RenderRequest,
        sink: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<RenderOutput> {
        match request.validate() {
            Ok(params) => self.render(&params, sink, cancel),
            Err(e) => {
                sink.emit(ProgressEvent::error(&e));
                Err(e)
            }
        }
    }

    /// Render validated parameters
    ///
    /// On failure an `error` event is emitted before the error is returned.
    pub fn render(
        &self,
        params: &AudioParameters,
        sink: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<RenderOutput> {
        let render_id = Uuid::new_v4();
        let span = info_span!("render", %render_id, seed = params.seed());
        let _enter = span.enter();

        info!(
            preset = %params.preset(),
            duration = params.duration(),
            wetness = params.wetness(),
            pitch = params.pitch(),
            sample_rate = params.sample_rate(),
            "render started"
        );

        match self.run(render_id, params, sink, cancel) {
            Ok(output) => {
                info!(
                    elapsed_ms = output.elapsed_ms,
                    rms_db = output.waveform.rms_db(),
                    degraded = output.degraded,
                    "render complete"
                );
                Ok(output)
            }
            Err(e) => {
                warn!(code = e.error_code(), error = %e, "render failed");
                sink.emit(ProgressEvent::error(&e));
                Err(e)
            }
        }
    }

    fn run(
        &self,
        render_id: Uuid,
        params: &AudioParameters,
        sink: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<RenderOutput> {
        let started = Instant::now();
        let boundary = |stage: &str| self.check_boundary(stage, started, cancel);
        let mut rng = StdRng::seed_from_u64(params.seed());

        sink.emit(ProgressEvent::Selecting);
        let selected = self.store.select_for(params.preset(), &mut rng)?;
        debug!(count = selected.len(), "base samples selected");
        boundary("selecting")?;

        sink.emit(ProgressEvent::Synthesizing);
        let layers = synthesize(params.length_in_samples(), params, &mut rng);
        boundary("synthesizing")?;

        sink.emit(ProgressEvent::Transforming);
        let outcome = self.transform_with_retry(params, &selected)?;
        boundary("transforming")?;

        sink.emit(ProgressEvent::Mixing);
        let layer_kinds = layers.kinds();
        let mut wave = mix(outcome.base, layers);
        boundary("mixing")?;

        let mut post = PostProcessor::for_params(params, &mut rng);
        post.process(&mut wave, |progress| {
            sink.emit(ProgressEvent::PostProcessing { progress })
        });
        if !wave.is_finite() {
            return Err(FartgenError::TransformInstability {
                step: "post_processing".to_string(),
            });
        }
        boundary("post_processing")?;

        let artifact = match &self.encoder {
            Some(encoder) => Some(encoder.encode(&wave, &self.export, &render_id.to_string())?),
            None => None,
        };

        let duration_actual = wave.duration_secs();
        sink.emit(ProgressEvent::Complete {
            artifact_ref: artifact.clone(),
            duration_actual,
            parameters_echo: params.clone(),
        });

        Ok(RenderOutput {
            render_id,
            digest: wave.digest(),
            waveform: wave,
            parameters: params.clone(),
            selected_assets: outcome.selected,
            layers: layer_kinds,
            bubble_count: params.bubble_count(),
            rumble_frequency_hz: pitch_to_frequency(params.pitch()),
            lowpass_cutoff_hz: params.lowpass_cutoff(),
            transform_attempts: outcome.attempts,
            degraded: outcome.degraded,
            duration_actual,
            artifact,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Run the transform, retrying instabilities with a perturbed seed
    ///
    /// Retries reselect their samples from their own RNG so the main render
    /// stream is untouched. When every attempt fails the first originally
    /// selected sample is used as-is.
    fn transform_with_retry(
        &self,
        params: &AudioParameters,
        selected: &[&SampleAsset],
    ) -> Result<TransformOutcome> {
        let sample_rate = params.sample_rate();
        let mut attempt_assets: Vec<&SampleAsset> = selected.to_vec();
        let mut attempt_params = params.clone();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let bases = prepare_bases(&attempt_assets, sample_rate);
            match self.transform.apply(bases, &attempt_params) {
                Ok(base) => {
                    return Ok(TransformOutcome {
                        base,
                        selected: origins(&attempt_assets),
                        attempts,
                        degraded: false,
                    });
                }
                Err(FartgenError::TransformInstability { step }) => {
                    warn!(
                        transform = self.transform.name(),
                        attempt = attempts,
                        step = %step,
                        "transform unstable"
                    );
                }
                Err(other) => return Err(other),
            }

            if attempts > self.transform_retries {
                break;
            }

            let retry_seed = params
                .seed()
                .wrapping_add(RETRY_SEED_STEP.wrapping_mul(attempts as u64));
            let mut retry_rng = StdRng::seed_from_u64(retry_seed);
            attempt_assets = self.store.select_for(params.preset(), &mut retry_rng)?;
            attempt_params = params.with_seed(retry_seed);
            debug!(retry_seed, "retrying transform with perturbed seed");
        }

        warn!(attempts, "transform degraded to untransformed sample");
        let first = &selected[..selected.len().min(1)];
        Ok(TransformOutcome {
            base: fallback(prepare_bases(first, sample_rate), params),
            selected: origins(first),
            attempts,
            degraded: true,
        })
    }

    fn check_boundary(&self, stage: &str, started: Instant, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(FartgenError::Cancelled {
                stage: stage.to_string(),
            });
        }
        let elapsed = started.elapsed();
        if elapsed > self.timeout {
            return Err(FartgenError::Timeout {
                stage: stage.to_string(),
                elapsed_ms: elapsed.as_millis() as u64,
                budget_ms: self.timeout.as_millis() as u64,
            });
        }
        debug!(stage, elapsed_ms = elapsed.as_millis() as u64, "stage done");
        Ok(())
    }
}

fn origins(assets: &[&SampleAsset]) -> Vec<PathBuf> {
    assets.iter().map(|a| a.metadata().origin.clone()).collect()
}
