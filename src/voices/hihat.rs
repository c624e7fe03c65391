//! 808 hi-hat - six detuned square waves through two filters.
//!
//! # How It Works
//!
//! 1. Six square oscillators at inharmonic frequencies. Their beating produces
//!    the dense "metal" that noise alone can't fake
//! 2. `tone` shifts every partial up together
//! 3. Highpass at `7000 + color·3000` Hz strips the low beating
//! 4. Bandpass at `10000 - color·5000` Hz, Q `0.5 + color·2`, sets the color
//! 5. Very short decay: `0.01 + decay·0.2` s

use crate::{
    graph::{
        envelope::{percussive_curve, EnvNode},
        extensions::NodeExt,
        filter::FilterNode,
        oscillator::OscNode,
    },
    voices::{DrumVoice, VoiceParams},
};

/// Partials of the metal bank, in Hz, before the `tone` offset.
pub const HAT_PARTIALS: [f32; 6] = [2_000.0, 3_150.0, 4_160.0, 5_430.0, 6_800.0, 8_500.0];

/// Largest upward shift `tone` applies to every partial.
const TONE_SPREAD: f32 = 500.0;

pub fn tr808_hat(params: &VoiceParams, time: f64) -> DrumVoice {
    let decay = 0.01 + params.decay * 0.2;
    let [a, b, c, d, e, f] = HAT_PARTIALS.map(|partial| partial + params.tone * TONE_SPREAD);

    let metal = OscNode::square(a)
        .mix(OscNode::square(b))
        .mix(OscNode::square(c))
        .mix(OscNode::square(d))
        .mix(OscNode::square(e))
        .mix(OscNode::square(f))
        .gain(1.0 / 6.0);

    let amplitude = percussive_curve(time, params.velocity, 0.001, decay);
    let graph = metal
        .through(FilterNode::highpass(7_000.0 + params.color * 3_000.0))
        .through(FilterNode::bandpass(10_000.0 - params.color * 5_000.0).with_q(0.5 + params.color * 2.0))
        .amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}
