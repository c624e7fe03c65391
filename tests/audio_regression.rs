use saavy_drums::{
    sequencing::StepUpdate,
    voices::{self, SampleBuffer},
    DrumMachine, EngineConfig, EventKind, Renderer, SynthType, VoiceParams, ENV_FLOOR,
};

const SAMPLE_RATE: u32 = 48_000;

fn manual_machine(config: EngineConfig) -> (DrumMachine, Renderer) {
    let machine = DrumMachine::new(config);
    assert!(machine.initialize());
    let renderer = machine.take_renderer().expect("manual mode hands out the renderer");
    (machine, renderer)
}

/// Render `seconds` of audio, running a control tick after every block.
fn bounce(machine: &DrumMachine, renderer: &mut Renderer, seconds: f64) -> (Vec<f32>, Vec<f32>) {
    let frames = (seconds * SAMPLE_RATE as f64) as usize;
    let mut left = vec![0.0f32; frames];
    let mut right = vec![0.0f32; frames];
    for (l, r) in left.chunks_mut(512).zip(right.chunks_mut(512)) {
        renderer.render_stereo(l, r);
        machine.tick();
    }
    (left, right)
}

fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

#[test]
fn every_voice_envelope_starts_and_ends_silent() {
    for velocity in [1.0 / 127.0, 0.5, 1.0] {
        let params = VoiceParams {
            velocity,
            ..VoiceParams::default()
        };
        for synth in SynthType::ALL.into_iter().filter(SynthType::is_synthesized) {
            let voice = voices::synthesize(synth, &params, 1.0).unwrap();
            let amplitude = voice.amplitude();

            let span = voice.envelope_end() - voice.start();
            let loudest = (0..=10_000)
                .map(|i| amplitude.value_at(voice.start() + span * i as f64 / 10_000.0))
                .fold(0.0f32, f32::max);
            assert!(loudest > 0.0, "{synth} at {velocity} never sounds");

            let start = amplitude.value_at(voice.start());
            assert!(
                start <= loudest * ENV_FLOOR * 2.0,
                "{synth} at {velocity} starts at {start} of {loudest}"
            );

            let tail = amplitude.value_at(voice.envelope_end());
            assert!(
                tail < loudest * 0.01,
                "{synth} at {velocity} ends at {tail} of {loudest}"
            );
        }
    }
}

#[test]
fn synthesized_kick_reaches_the_output() {
    let (machine, mut renderer) = manual_machine(EngineConfig::manual(SAMPLE_RATE));
    machine.synthesize_drum(SynthType::Tr808Kick, VoiceParams::default());

    let (left, right) = bounce(&machine, &mut renderer, 0.5);
    assert!(peak(&left) > 0.01);
    assert!(peak(&right) > 0.01);
    assert!(left.iter().chain(&right).all(|s| s.is_finite() && s.abs() <= 1.0));
}

#[test]
fn empty_engine_renders_silence() {
    let (machine, mut renderer) = manual_machine(EngineConfig::manual(SAMPLE_RATE));
    let (left, right) = bounce(&machine, &mut renderer, 0.25);
    assert_eq!(peak(&left), 0.0);
    assert_eq!(peak(&right), 0.0);
    assert_eq!(renderer.active_voices(), 0);
}

#[test]
fn samples_only_engine_plays_the_mapped_sample() {
    let config = EngineConfig {
        synthesis: false,
        ..EngineConfig::manual(SAMPLE_RATE)
    };
    let (machine, mut renderer) = manual_machine(config);

    // Nothing loaded yet: the trigger is skipped.
    machine.synthesize_drum(SynthType::Tr808Kick, VoiceParams::default());
    let (left, _) = bounce(&machine, &mut renderer, 0.1);
    assert_eq!(peak(&left), 0.0);

    let kick = SampleBuffer::new(vec![0.5f32; SAMPLE_RATE as usize / 10], SAMPLE_RATE);
    machine.load_sample("samples/kick.wav", kick);
    machine.synthesize_drum(SynthType::Tr808Kick, VoiceParams::default());
    let (left, _) = bounce(&machine, &mut renderer, 0.1);
    assert!(peak(&left) > 0.0);
}

#[test]
fn low_sample_rates_fall_back_to_samples() {
    let machine = DrumMachine::new(EngineConfig::manual(16_000));
    assert!(machine.initialize());
    assert_eq!(
        machine.synthesis_strategy(),
        Some(saavy_drums::engine::SynthesisStrategy::SamplesOnly)
    );
}

#[test]
fn sequenced_bounce_triggers_on_the_grid() {
    let (machine, mut renderer) = manual_machine(EngineConfig::manual(SAMPLE_RATE));
    machine.create_pattern("main", "Main", 16);
    for step in [0, 8] {
        machine.update_step(
            0,
            step,
            StepUpdate {
                active: Some(true),
                ..StepUpdate::default()
            },
        );
    }
    let triggers = machine.subscribe(EventKind::TrackTrigger);

    assert!(machine.start());
    // At 120 BPM steps 0 and 8 land at 0.0 s and 1.0 s; the next bar starts at 2.0 s.
    let (left, _) = bounce(&machine, &mut renderer, 1.5);
    assert_eq!(triggers.try_iter().count(), 2);

    let second_hit = SAMPLE_RATE as usize;
    assert!(peak(&left[..second_hit]) > 0.01);
    assert!(peak(&left[second_hit..second_hit + 4_800]) > 0.01);

    assert!(machine.stop());
}
