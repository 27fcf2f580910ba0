//! Audio Engine Module
//!
//! Core audio plumbing shared by every stage:
//! - Waveform buffer
//! - WAV decode/encode and sample rate conversion

pub mod buffer;
pub mod io;

pub use buffer::{ChannelLayout, Waveform};
pub use io::{
    conform_rate, export_audio, import_audio, resample_linear, resample_to_len, DecodedAudio,
    ExportFormat,
};
