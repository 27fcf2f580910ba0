//! Post-Processor
//!
//! Runs the mastering chain on the mixed waveform, in order:
//! distortion drive, peak normalize, soft limiter, fades, optional reverb.
//! Progress is reported at 0/25/50/75/100.

use rand::Rng;
use tracing::debug;

use crate::dsp::effect::Effect;
use crate::dsp::fade::Fade;
use crate::dsp::gain::Normalize;
use crate::dsp::limiter::SoftLimiter;
use crate::dsp::reverb::ConvolutionReverb;
use crate::dsp::saturation::Saturation;
use crate::engine::Waveform;
use crate::params::AudioParameters;

/// One link of the chain and the progress reported once it has run
struct Stage {
    effect: Box<dyn Effect>,
    progress_after: Option<u8>,
}

/// Ordered mastering chain for one render
pub struct PostProcessor {
    stages: Vec<Stage>,
}

impl PostProcessor {
    /// Build the chain the parameters call for
    ///
    /// The reverb impulse response is drawn from `rng` only when reverb is
    /// requested, after every other consumer of the render RNG.
    pub fn for_params<R: Rng + ?Sized>(params: &AudioParameters, rng: &mut R) -> Self {
        let mut stages = Vec::with_capacity(5);

        let saturation = Saturation::new(params.distortion());
        if saturation.is_active() {
            stages.push(Stage {
                effect: Box::new(saturation),
                progress_after: None,
            });
        }
        stages.push(Stage {
            effect: Box::new(Normalize::default()),
            progress_after: Some(25),
        });
        stages.push(Stage {
            effect: Box::new(SoftLimiter::default()),
            progress_after: Some(50),
        });
        stages.push(Stage {
            effect: Box::new(Fade::default()),
            progress_after: Some(75),
        });
        if params.reverb_amount() > 0.0 {
            stages.push(Stage {
                effect: Box::new(ConvolutionReverb::new(
                    params.sample_rate(),
                    params.reverb_amount(),
                    rng,
                )),
                progress_after: None,
            });
        }

        Self { stages }
    }

    /// Effect identifiers in chain order
    pub fn effect_types(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.effect.effect_type()).collect()
    }

    /// Run the chain in place, calling `on_progress` at each milestone
    pub fn process(&mut self, wave: &mut Waveform, mut on_progress: impl FnMut(u8)) {
        on_progress(0);
        for stage in &mut self.stages {
            stage.effect.process(wave);
            debug!(effect = stage.effect.effect_type(), peak = wave.peak(), "post step done");
            if let Some(progress) = stage.progress_after {
                on_progress(progress);
            }
        }
        on_progress(100);
    }
}
