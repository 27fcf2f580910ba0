//! Progress events
//!
//! One event per stage boundary, serialized with a `stage` tag so they can be
//! forwarded as-is to whatever transport carries render status.

use std::sync::mpsc::Sender;

use serde::Serialize;

use crate::error::FartgenError;
use crate::params::AudioParameters;
use crate::pipeline::export::ArtifactRef;

/// Render status message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressEvent {
    Selecting,
    Synthesizing,
    Transforming,
    Mixing,
    PostProcessing {
        progress: u8,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        artifact_ref: Option<ArtifactRef>,
        duration_actual: f64,
        parameters_echo: AudioParameters,
    },
    Error {
        kind: String,
        message: String,
    },
}

impl ProgressEvent {
    /// Error event for a failed render
    pub fn error(err: &FartgenError) -> Self {
        ProgressEvent::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    /// Wire name of the stage
    pub fn stage(&self) -> &'static str {
        match self {
            ProgressEvent::Selecting => "selecting",
            ProgressEvent::Synthesizing => "synthesizing",
            ProgressEvent::Transforming => "transforming",
            ProgressEvent::Mixing => "mixing",
            ProgressEvent::PostProcessing { .. } => "post_processing",
            ProgressEvent::Complete { .. } => "complete",
            ProgressEvent::Error { .. } => "error",
        }
    }
}

/// Receiver of progress events
///
/// Sinks must not fail the render; delivery problems are the sink's to
/// swallow.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn emit(&mut self, event: ProgressEvent) {
        self(event)
    }
}

impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

impl ProgressSink for Sender<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        // receiver gone means nobody is listening any more
        let _ = self.send(event);
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: ProgressEvent) {}
}
