//! Mixer
//!
//! Weighted sum of the transformed base and the procedural layers.

use crate::engine::Waveform;
use crate::synth::{LayerKind, LayerSet};

// ============================================================================
// Weights
// ============================================================================

/// Weight of the transformed base sample
pub const BASE_WEIGHT: f32 = 0.60;

/// Weight of the noise layer
pub const NOISE_WEIGHT: f32 = 0.15;

/// Weight of the rumble layer
pub const RUMBLE_WEIGHT: f32 = 0.20;

/// Weight of the bubbling layer
pub const BUBBLING_WEIGHT: f32 = 0.15;

/// Whole-mix attenuation when bubbling is present
pub const BUBBLING_ATTENUATION: f32 = 0.8;

/// Mix weight of a procedural layer
pub fn layer_weight(kind: LayerKind) -> f32 {
    match kind {
        LayerKind::Noise => NOISE_WEIGHT,
        LayerKind::Rumble => RUMBLE_WEIGHT,
        LayerKind::Bubbling => BUBBLING_WEIGHT,
    }
}

// ============================================================================
// Mix
// ============================================================================

/// Combine the base and the layers into one waveform of the base's length
///
/// Layers are zero-padded or truncated to the base length first.
pub fn mix(base: Waveform, layers: LayerSet) -> Waveform {
    let len = base.len();
    let sample_rate = base.sample_rate();
    let has_bubbling = layers.contains(LayerKind::Bubbling);

    let mut out = base.into_samples();
    for sample in &mut out {
        *sample *= BASE_WEIGHT;
    }

    for (kind, layer) in layers.into_layers() {
        let weight = layer_weight(kind);
        let layer = layer.fitted(len);
        for (o, &s) in out.iter_mut().zip(layer.samples()) {
            *o += s * weight;
        }
    }

    let mut mixed = Waveform::from_samples(out, sample_rate);
    if has_bubbling {
        mixed.scale(BUBBLING_ATTENUATION);
    }
    mixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn constant(value: f32, len: usize) -> Waveform {
        Waveform::from_samples(vec![value; len], 44100)
    }

    #[test]
    fn test_dry_mix_weights() {
        let mut layers = LayerSet::default();
        layers.insert(LayerKind::Noise, constant(1.0, 10));
        layers.insert(LayerKind::Rumble, constant(1.0, 10));
        let mixed = mix(constant(1.0, 10), layers);
        assert_eq!(mixed.len(), 10);
        for &s in mixed.samples() {
            assert_relative_eq!(s, 0.95, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_bubbling_mix_is_attenuated() {
        let mut layers = LayerSet::default();
        layers.insert(LayerKind::Noise, constant(1.0, 10));
        layers.insert(LayerKind::Rumble, constant(1.0, 10));
        layers.insert(LayerKind::Bubbling, constant(1.0, 10));
        let mixed = mix(constant(1.0, 10), layers);
        assert_relative_eq!(mixed.samples()[3], 0.88, epsilon = 1e-6);
    }

    #[test]
    fn test_layers_resized_to_base() {
        let mut layers = LayerSet::default();
        layers.insert(LayerKind::Noise, constant(1.0, 4));
        layers.insert(LayerKind::Rumble, constant(1.0, 100));
        let mixed = mix(constant(0.0, 8), layers);
        assert_eq!(mixed.len(), 8);
        assert_relative_eq!(mixed.samples()[0], 0.35, epsilon = 1e-6);
        assert_relative_eq!(mixed.samples()[7], 0.20, epsilon = 1e-6);
    }
}
