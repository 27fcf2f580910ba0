//! Render Pipeline
//!
//! Orchestration, progress reporting, cancellation and the export boundary.

pub mod cancel;
pub mod events;
pub mod export;
pub mod render;

pub use cancel::CancellationToken;
pub use events::{NullSink, ProgressEvent, ProgressSink};
pub use export::{ArtifactRef, Encoder, WavEncoder};
pub use render::{RenderOutput, RenderPipeline};
