//! Procedural layers
//!
//! Noise, rumble and bubbling generators. Every generator takes the target
//! length, the sample rate, the parameters and the render RNG, and returns a
//! waveform of exactly that length.

pub mod bubbling;
pub mod noise;
pub mod rumble;

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::engine::Waveform;
use crate::params::AudioParameters;

pub use rumble::pitch_to_frequency;

/// Name of a procedural layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Noise,
    Rumble,
    Bubbling,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Noise => "noise",
            LayerKind::Rumble => "rumble",
            LayerKind::Bubbling => "bubbling",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Procedural layers of one render, discarded after mixing
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    layers: BTreeMap<LayerKind, Waveform>,
}

impl LayerSet {
    pub fn insert(&mut self, kind: LayerKind, wave: Waveform) {
        self.layers.insert(kind, wave);
    }

    pub fn get(&self, kind: LayerKind) -> Option<&Waveform> {
        self.layers.get(&kind)
    }

    pub fn contains(&self, kind: LayerKind) -> bool {
        self.layers.contains_key(&kind)
    }

    /// Layer names present, in mix order
    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Take the layers out, consuming the set
    pub fn into_layers(self) -> BTreeMap<LayerKind, Waveform> {
        self.layers
    }
}

/// Generate every procedural layer the parameters call for
///
/// Noise and rumble are always present; bubbling only above the wetness
/// threshold. Generators run in a fixed order so the RNG stream, and with
/// it the output, depends on the seed alone.
pub fn synthesize<R: Rng + ?Sized>(len: usize, params: &AudioParameters, rng: &mut R) -> LayerSet {
    let sample_rate = params.sample_rate();
    let mut layers = LayerSet::default();

    layers.insert(
        LayerKind::Noise,
        noise::generate(len, sample_rate, params, rng),
    );
    layers.insert(
        LayerKind::Rumble,
        rumble::generate(len, sample_rate, params, rng),
    );
    if params.has_bubbling() {
        layers.insert(
            LayerKind::Bubbling,
            bubbling::generate(len, sample_rate, params, rng),
        );
    }

    debug!(
        layers = layers.len(),
        rumble_hz = pitch_to_frequency(params.pitch()),
        bubbles = params.bubble_count(),
        "procedural layers generated"
    );
    layers
}
