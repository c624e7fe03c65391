//! Snares: a pitched body layered with a burst of noise.
//!
//! The `snappy` control trades one for the other. Each layer carries its own
//! envelope, and an overall envelope bounds the hit.

use crate::{
    dsp::automation::{decay_floor, Automation},
    graph::{
        distortion::ShaperNode,
        envelope::{percussive_curve, EnvNode},
        extensions::NodeExt,
        filter::FilterNode,
        oscillator::{NoiseNode, OscNode},
    },
    voices::{DrumVoice, VoiceParams},
};

/// 808: two triangles at base and 1.5x base, highpassed white noise.
pub fn tr808_snare(params: &VoiceParams, time: f64) -> DrumVoice {
    let base = 140.0 + params.tuning * 100.0;
    let tone_decay = 0.1 + params.decay * 0.1;
    let noise_decay = 0.1 + params.decay * 0.3;
    let decay = 0.1 + params.decay * 0.7;

    let tone_level = 1.0 - 0.5 * params.snappy;
    let noise_level = 1.5 * params.snappy;

    let body = OscNode::triangle(base)
        .mix(OscNode::triangle(1.5 * base))
        .gain(0.5)
        .amplify(EnvNode::percussive(time, tone_level, 0.001, tone_decay));

    let noise = NoiseNode::white()
        .through(FilterNode::highpass(1_000.0 + params.tone * 3_000.0))
        .amplify(EnvNode::percussive(time, noise_level, 0.001, noise_decay));

    let amplitude = percussive_curve(time, params.velocity, 0.001, decay);
    let graph = body.mix(noise).amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}

/// 909: clipped square + triangle body, band-passed noise, linear attack.
pub fn tr909_snare(params: &VoiceParams, time: f64) -> DrumVoice {
    let base = 180.0 + params.tuning * 120.0;
    let tone_decay = 0.06 + params.decay * 0.1;
    let noise_decay = params.decay * 0.5;
    let decay = 0.1 + params.decay * 0.5;

    let body = OscNode::square(base)
        .mix(OscNode::triangle(1.71 * base))
        .through(ShaperNode::clip(1.5))
        .gain(0.5)
        .amplify(EnvNode::percussive(
            time,
            1.0 - 0.5 * params.snappy,
            0.001,
            tone_decay,
        ));

    let noise = NoiseNode::white()
        .through(FilterNode::bandpass(2_000.0 + params.tone * 4_000.0).with_q(1.0 + params.tone * 5.0))
        .amplify(EnvNode::percussive(time, params.snappy * 1.5, 0.001, noise_decay));

    let amplitude = linear_attack_curve(time, params.velocity, 0.001, decay);
    let graph = body.mix(noise).amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}

/// Linear rise to `peak` then exponential decay to the floor.
fn linear_attack_curve(start: f64, peak: f32, attack: f32, decay: f32) -> Automation {
    let attack_end = start + attack as f64;
    Automation::new(0.0)
        .set_value_at(0.0, start)
        .linear_ramp_to(peak, attack_end)
        .exponential_ramp_to(decay_floor(peak), (start + decay as f64).max(attack_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tr808_overall_decay() {
        let params = VoiceParams {
            decay: 1.0,
            ..VoiceParams::default()
        };
        let voice = tr808_snare(&params, 0.0);
        assert!((voice.envelope_end() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn tr909_attack_is_linear() {
        let voice = tr909_snare(&VoiceParams::default(), 0.0);
        let peak = VoiceParams::default().velocity;
        let half = voice.amplitude().value_at(0.0005);
        assert!((half - peak * 0.5).abs() < 1e-3, "got {half}");
    }
}
