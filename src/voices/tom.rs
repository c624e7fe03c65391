//! Toms.
//!
//! Both toms are a pitched body with a short downward bend. The 909's body is
//! a lightly driven triangle under a closing lowpass; the 808's is a rounder
//! sine.

use crate::{
    dsp::automation::Automation,
    graph::{
        distortion::ShaperNode,
        envelope::{percussive_curve, EnvNode},
        extensions::NodeExt,
        filter::FilterNode,
        oscillator::OscNode,
    },
    voices::{kick::pitch_drop, DrumVoice, VoiceParams},
};

pub fn tr909_tom(params: &VoiceParams, time: f64) -> DrumVoice {
    let base = 80.0 + params.tuning * 150.0;
    let decay = 0.1 + params.decay * 0.8;

    let cutoff = Automation::new(8.0 * base)
        .set_value_at(8.0 * base, time)
        .exponential_ramp_to(2.0 * base, time + 0.2);

    let amplitude = percussive_curve(time, params.velocity, 0.002, decay);
    let graph = OscNode::triangle_at(pitch_drop(1.5 * base, base, time, 0.05))
        .through(ShaperNode::saturate(1.5))
        .through(FilterNode::lowpass_at(cutoff))
        .amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}

pub fn tr808_tom(params: &VoiceParams, time: f64) -> DrumVoice {
    let base = 90.0 + params.tuning * 160.0;
    let decay = 0.15 + params.decay * 0.9;

    let amplitude = percussive_curve(time, params.velocity, 0.003, decay);
    let graph = OscNode::sine_at(pitch_drop(1.25 * base, base, time, 0.08))
        .through(FilterNode::lowpass(4.0 * base))
        .amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decays_follow_formulas() {
        let params = VoiceParams {
            decay: 1.0,
            ..VoiceParams::default()
        };
        assert!((tr909_tom(&params, 0.0).envelope_end() - 0.9).abs() < 1e-6);
        assert!((tr808_tom(&params, 0.0).envelope_end() - 1.05).abs() < 1e-6);
    }
}
