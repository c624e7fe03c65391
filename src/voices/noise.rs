//! Noise drum - white noise with a color-dependent filter.
//!
//! Below `color = 0.5` the noise is highpassed (`2000 + color·6000` Hz), giving
//! hissy shakers and cymbal washes. From 0.5 up it is band-passed around
//! `1000 + (color - 0.5)·10000` Hz with a Q that narrows as color rises, which
//! gives tonal, snare-like noise.

use crate::{
    dsp::{automation::Automation, filter::FilterType},
    graph::{
        envelope::{percussive_curve, EnvNode},
        extensions::NodeExt,
        filter::FilterNode,
        oscillator::NoiseNode,
    },
    voices::{DrumVoice, VoiceParams},
};

pub fn noise_drum(params: &VoiceParams, time: f64) -> DrumVoice {
    let decay = 0.05 + params.decay * 0.3;
    let amplitude = percussive_curve(time, params.velocity, 0.001, decay);

    let graph = NoiseNode::white()
        .through(color_filter(params.color))
        .amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}

fn color_filter(color: f32) -> FilterNode {
    if color < 0.5 {
        FilterNode::highpass(2_000.0 + color * 6_000.0)
    } else {
        let center = 1_000.0 + (color - 0.5) * 10_000.0;
        FilterNode::new(FilterType::BandPass, Automation::constant(center)).with_q(0.5 + color * 4.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_scales_with_color() {
        assert!(color_filter(0.9).q() > color_filter(0.6).q());
    }

    #[test]
    fn decay_formula() {
        let params = VoiceParams {
            decay: 1.0,
            ..VoiceParams::default()
        };
        assert!((noise_drum(&params, 0.0).envelope_end() - 0.35).abs() < 1e-6);
    }
}
