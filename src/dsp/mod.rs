//! Mixing and post-processing
//!
//! The mixer combines base and procedural layers; the post-processor masters
//! the mix. Every post step implements `Effect`.

pub mod effect;
pub mod fade;
pub mod gain;
pub mod limiter;
pub mod mixer;
pub mod post;
pub mod reverb;
pub mod saturation;

pub use effect::Effect;
pub use fade::Fade;
pub use gain::Normalize;
pub use limiter::SoftLimiter;
pub use mixer::{layer_weight, mix};
pub use post::PostProcessor;
pub use reverb::{convolve, impulse_response, ConvolutionReverb};
pub use saturation::Saturation;
