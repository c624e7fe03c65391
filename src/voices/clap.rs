//! 808 clap - filtered noise with a rebound envelope.
//!
//! A real hand clap is several hands hitting a few milliseconds apart. The 808
//! fakes it with a burst of short pulses before the main body:
//!
//! ```text
//!  level
//!    │▌ ▌ ▌ ▌ ╲
//!    │▌ ▌ ▌ ▌  ╲__
//!    │▌ ▌ ▌ ▌     ╲______
//!    └─────────────────────→ t
//!     rebounds  main decay
//! ```
//!
//! Each rebound is `REBOUND_LENGTH` long, `REBOUND_SPACING` after the one
//! before it and `REBOUND_ATTENUATION` of its level. The main decay of
//! `0.05 + decay·0.7` s starts after the last rebound.

use crate::{
    dsp::automation::{decay_floor, Automation},
    graph::{
        envelope::EnvNode,
        extensions::NodeExt,
        filter::FilterNode,
        oscillator::NoiseNode,
    },
    voices::{DrumVoice, VoiceParams},
};

pub const REBOUND_COUNT: usize = 4;
/// Seconds between rebound onsets.
pub const REBOUND_SPACING: f64 = 0.006;
/// Seconds from a rebound's onset until it has died away.
pub const REBOUND_LENGTH: f64 = 0.004;
/// Level of each rebound relative to the previous one.
pub const REBOUND_ATTENUATION: f32 = 0.85;

/// Rise time of each pulse.
const PULSE_RISE: f64 = 0.0005;

pub fn tr808_clap(params: &VoiceParams, time: f64) -> DrumVoice {
    let main_decay = 0.05 + params.decay as f64 * 0.7;
    let main_start = time + REBOUND_COUNT as f64 * REBOUND_SPACING;
    let decay = main_start - time + main_decay;

    let amplitude = rebound_curve(time, params.velocity, main_decay);

    let graph = NoiseNode::white()
        .through(FilterNode::highpass(600.0 + params.tone * 600.0))
        .through(FilterNode::bandpass(1_000.0 + params.tone * 1_500.0).with_q(1.5))
        .gain(2.0)
        .amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay)
}

fn rebound_curve(time: f64, peak: f32, main_decay: f64) -> Automation {
    let floor = decay_floor(peak);
    let mut curve = Automation::new(0.0);
    let mut level = peak;
    for i in 0..REBOUND_COUNT {
        let onset = time + i as f64 * REBOUND_SPACING;
        curve = curve
            .set_value_at(floor, onset)
            .linear_ramp_to(level, onset + PULSE_RISE)
            .exponential_ramp_to(floor, onset + REBOUND_LENGTH);
        level *= REBOUND_ATTENUATION;
    }

    let main_start = time + REBOUND_COUNT as f64 * REBOUND_SPACING;
    curve
        .set_value_at(floor, main_start)
        .linear_ramp_to(peak, main_start + PULSE_RISE)
        .exponential_ramp_to(floor, main_start + main_decay)
}
