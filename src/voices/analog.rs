//! Analog drum - a generic swept-oscillator percussion voice.
//!
//! The source comes from the track's oscillator type. Pitched sources sweep
//! down from `base·(1 + color·3)` to `base` (`base = 60 + tuning·440` Hz)
//! over `0.02 + decay·0.1` s, then everything runs through a lowpass at
//! `400 + tone·8000` Hz.
//!
//! `BridgedT` models the resonant circuit of the original analog machines:
//! a 2 ms noise burst rings a high-Q band-pass tuned to the swept pitch.

use crate::{
    dsp::oscillator::{NoiseColor, OscillatorWaveform},
    graph::{
        envelope::{percussive_curve, EnvNode},
        extensions::NodeExt,
        filter::FilterNode,
        node::GraphNode,
        oscillator::{NoiseNode, OscNode},
    },
    voices::{kick::pitch_drop, DrumVoice, OscillatorType, VoiceParams},
};

const PULSE_DUTY: f32 = 0.25;
const BRIDGED_T_Q: f32 = 25.0;
const BRIDGED_T_BURST: f32 = 0.002;
/// Make-up gain for the ringing band-pass; the burst carries little energy.
const BRIDGED_T_GAIN: f32 = 8.0;

pub fn analog_drum(params: &VoiceParams, time: f64) -> DrumVoice {
    let base = 60.0 + params.tuning * 440.0;
    let sweep = 0.02 + params.decay * 0.1;
    let pitch = pitch_drop(base * (1.0 + params.color * 3.0), base, time, sweep);

    let attack = 0.001 + params.attack * 0.02;
    let decay = 0.05 + params.decay * 1.5;

    let pitched = |waveform: OscillatorWaveform| OscNode::new(waveform, pitch.clone()).boxed();
    let source: Box<dyn GraphNode> = match params.oscillator {
        OscillatorType::Sine => pitched(OscillatorWaveform::Sine),
        OscillatorType::Triangle => pitched(OscillatorWaveform::Triangle),
        OscillatorType::Sawtooth => pitched(OscillatorWaveform::Sawtooth),
        OscillatorType::Square => pitched(OscillatorWaveform::Square),
        OscillatorType::Pulse => pitched(OscillatorWaveform::Pulse(PULSE_DUTY)),
        OscillatorType::BridgedT => NoiseNode::white()
            .amplify(EnvNode::percussive(time, 1.0, 0.0001, BRIDGED_T_BURST))
            .through(FilterNode::bandpass_at(pitch.clone()).with_q(BRIDGED_T_Q))
            .gain(BRIDGED_T_GAIN)
            .boxed(),
        OscillatorType::NoiseWhite => NoiseNode::new(NoiseColor::White).boxed(),
        OscillatorType::NoisePink => NoiseNode::new(NoiseColor::Pink).boxed(),
    };

    let amplitude = percussive_curve(time, params.velocity, attack, decay);
    let graph = source
        .through(FilterNode::lowpass(400.0 + params.tone * 8_000.0))
        .amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, decay as f64)
}
