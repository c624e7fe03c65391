//! FM drum - a sine carrier swept by a sine modulator.
//!
//! The modulation index (in Hz of deviation) starts at `tone·100 + 50` and
//! falls to 20 % of that over 100 ms, so the hit opens bright and settles on
//! a purer tone. `color` sets the modulator ratio, and non-integer ratios give
//! the clangy, bell-like partials.

use crate::{
    dsp::automation::Automation,
    graph::{
        envelope::{percussive_curve, EnvNode},
        extensions::NodeExt,
        oscillator::OscNode,
    },
    voices::{DrumVoice, VoiceParams},
};

pub fn fm_drum(params: &VoiceParams, time: f64) -> DrumVoice {
    let base = 200.0 + params.tuning * 300.0;
    let ratio = 1.4 + params.color * 2.7;
    let index = params.tone * 100.0 + 50.0;
    let decay = 0.05 + params.decay * 0.4;

    let index_curve = Automation::new(index)
        .set_value_at(index, time)
        .exponential_ramp_to(index * 0.2, time + 0.1);
    let modulator = OscNode::sine(base * ratio).amplify(EnvNode::new(index_curve));

    let amplitude = percussive_curve(time, params.velocity, 0.001, decay);
    let graph = OscNode::sine(base)
        .modulated_by(modulator)
        .amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::RenderCtx;

    #[test]
    fn renders_bounded_signal() {
        let mut voice = fm_drum(&VoiceParams::default(), 0.0);
        let ctx = RenderCtx::new(48_000.0, 0.0);
        let mut out = vec![0.0f32; 2_048];
        let mut scratch = vec![0.0f32; 2_048];
        voice.render_into(&mut out, &mut scratch, &ctx);

        assert!(out.iter().all(|s| s.abs() <= 1.0));
        assert!(out.iter().any(|s| s.abs() > 0.1));
    }
}
