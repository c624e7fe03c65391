//! Kick drums.
//!
//! # 808
//!
//! The 808 kick is a bridged-T network pinged into a decaying sine. We model
//! it directly:
//!
//! 1. Sine body whose pitch falls exponentially from 4x base to base
//!    (`base = 40 + tuning·30` Hz) over `0.1·decay` seconds
//! 2. A ~30 ms square click, level set by `attack`
//! 3. Lowpass whose cutoff and resonance rise with `tone`
//! 4. 5 ms exponential attack, exponential decay over `0.1 + decay·3.9` s
//!
//! # 909
//!
//! The 909 kick is brighter and harder:
//!
//! 1. Triangle body falling from 6x base (`base = 50 + tuning·30` Hz) over
//!    `0.05·decay` seconds
//! 2. Drive `(π+k)x/(π+k|x|)` with `k = 5 + tone·50` squares the body off
//! 3. A ~20 ms sawtooth click scaled by `attack`
//! 4. Lowpass, decay over `0.1 + decay·1.5` s

use crate::{
    dsp::automation::Automation,
    graph::{
        distortion::ShaperNode,
        envelope::{percussive_curve, EnvNode},
        extensions::NodeExt,
        filter::FilterNode,
        oscillator::OscNode,
    },
    voices::{DrumVoice, VoiceParams},
};

const CLICK_808: f32 = 0.03;
const CLICK_909: f32 = 0.02;

/// Exponential pitch drop from `from` to `to` starting at `time`.
pub(crate) fn pitch_drop(from: f32, to: f32, time: f64, duration: f32) -> Automation {
    Automation::new(from)
        .set_value_at(from, time)
        .exponential_ramp_to(to, time + duration.max(0.001) as f64)
}

pub fn tr808_kick(params: &VoiceParams, time: f64) -> DrumVoice {
    let base = 40.0 + params.tuning * 30.0;
    let decay = 0.1 + params.decay * 3.9;

    let body = OscNode::sine_at(pitch_drop(4.0 * base, base, time, 0.1 * params.decay));
    let amplitude = percussive_curve(time, params.velocity, 0.005, decay);

    let click = OscNode::square(4.0 * base).amplify(EnvNode::percussive(
        time,
        params.attack * params.velocity * 0.5,
        0.0005,
        CLICK_808,
    ));

    let lowpass = FilterNode::lowpass(200.0 + params.tone * 3_000.0).with_q(0.7 + params.tone * 3.0);

    let graph = body
        .amplify(EnvNode::new(amplitude.clone()))
        .mix(click)
        .through(lowpass);

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}

pub fn tr909_kick(params: &VoiceParams, time: f64) -> DrumVoice {
    let base = 50.0 + params.tuning * 30.0;
    let decay = 0.1 + params.decay * 1.5;

    let body = OscNode::triangle_at(pitch_drop(6.0 * base, base, time, 0.05 * params.decay))
        .through(ShaperNode::kick_drive(5.0 + params.tone * 50.0));
    let amplitude = percussive_curve(time, params.velocity, 0.002, decay);

    let click = OscNode::sawtooth(8.0 * base).amplify(EnvNode::percussive(
        time,
        params.attack * params.velocity * 0.5,
        0.0005,
        CLICK_909,
    ));

    let graph = body
        .amplify(EnvNode::new(amplitude.clone()))
        .mix(click)
        .through(FilterNode::lowpass(1_500.0 + params.tone * 4_500.0));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}
