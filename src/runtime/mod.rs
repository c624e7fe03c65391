//! The engine context.
//!
//! [`DrumMachine`] ties the audio engine, the pattern store, the scheduler and
//! the event hub together. There is no global instance: create one, call
//! [`initialize`](DrumMachine::initialize), then drive it.
//!
//! # Example
//!
//! ```ignore
//! use saavy_drums::{DrumMachine, EngineConfig, EventKind};
//! use saavy_drums::sequencing::StepUpdate;
//!
//! let machine = DrumMachine::new(EngineConfig::default());
//! machine.initialize();
//! machine.create_pattern("main", "Main", 16);
//! for step in [0, 4, 8, 12] {
//!     machine.toggle_step(0, step);
//! }
//! let steps = machine.subscribe(EventKind::Step);
//! machine.start();
//! ```
//!
//! With [`OutputMode::Manual`] the caller owns both clocks: it renders
//! through [`take_renderer`](DrumMachine::take_renderer) and calls
//! [`tick`](DrumMachine::tick) between blocks, so offline bounces run as fast
//! as they can without a timer thread.

mod transport;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use self::transport::Transport;
use crate::{
    config::{EngineConfig, OutputMode},
    engine::{
        params::{BusParams, DelayUpdate, DistortionUpdate, ReverbUpdate},
        renderer::Renderer,
        AudioEngine, SynthesisStrategy,
    },
    error::EngineError,
    io::midi::{self, MidiEvent},
    sequencing::{
        events::{EventHub, EventKind, SequencerEvent, Subscription, SubscriptionId},
        pattern::{Pattern, PatternStore, StepUpdate},
        scheduler::{Scheduler, Trigger},
    },
    voices::{SampleBuffer, SampleOptions, SynthType, VoiceParams},
};

/// State shared by the caller and the transport thread.
pub(crate) struct Shared {
    engine: AudioEngine,
    patterns: PatternStore,
    scheduler: Scheduler,
    events: EventHub,
}

impl Shared {
    /// One control tick: schedule everything inside the lookahead window.
    pub(crate) fn tick(&mut self) {
        self.engine.collect_retired();

        let now = self.engine.current_time();
        let steps = self.scheduler.tick(now, self.patterns.current_pattern());

        for step in steps {
            for trigger in &step.triggers {
                self.dispatch(trigger);
                self.events.emit(SequencerEvent::TrackTrigger {
                    track_id: trigger.track_id,
                    step_index: trigger.step_index,
                    velocity: trigger.velocity,
                });
            }
            self.events.emit(SequencerEvent::Step {
                step_index: step.step_index,
            });
        }
    }

    fn dispatch(&mut self, trigger: &Trigger) {
        let result = match trigger.synth_type {
            SynthType::Sample => {
                let options = SampleOptions {
                    velocity: trigger.velocity as f32,
                    pitch: trigger.pitch,
                    decay: trigger.sample_decay,
                    time: Some(trigger.time),
                };
                self.engine.play_sample(&trigger.sound, &options)
            }
            synth_type => {
                self.engine
                    .synthesize_drum(synth_type, &trigger.params, Some(trigger.time))
            }
        };
        report(result, trigger.track_id);
    }
}

fn report(result: Result<(), EngineError>, track_id: u32) {
    match result {
        Ok(()) => {}
        Err(EngineError::NotInitialized) => debug!(track_id, "engine not initialized, trigger skipped"),
        Err(e) => warn!(%e, track_id, "trigger dropped"),
    }
}

pub struct DrumMachine {
    config: EngineConfig,
    shared: Arc<Mutex<Shared>>,
    transport: Mutex<Option<Transport>>,
}

impl DrumMachine {
    pub fn new(config: EngineConfig) -> Self {
        let shared = Shared {
            engine: AudioEngine::new(config.clone()),
            patterns: PatternStore::new(),
            scheduler: Scheduler::new(config.tempo, config.lookahead.as_secs_f64()),
            events: EventHub::new(),
        };
        Self {
            config,
            shared: Arc::new(Mutex::new(shared)),
            transport: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bring up audio. Returns false, after logging why, when there is no
    /// usable output.
    pub fn initialize(&self) -> bool {
        match self.try_initialize() {
            Ok(()) => true,
            Err(e) => {
                warn!(%e, "audio unavailable");
                false
            }
        }
    }

    pub fn try_initialize(&self) -> Result<(), EngineError> {
        self.shared.lock().engine.initialize()
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.lock().engine.is_initialized()
    }

    pub fn synthesis_strategy(&self) -> Option<SynthesisStrategy> {
        self.shared.lock().engine.strategy()
    }

    /// The renderer, in [`OutputMode::Manual`], once.
    pub fn take_renderer(&self) -> Option<Renderer> {
        self.shared.lock().engine.take_renderer()
    }

    /// Seconds on the audio clock.
    pub fn current_time(&self) -> f64 {
        self.shared.lock().engine.current_time()
    }

    // Voices

    pub fn load_sample(&self, id: impl Into<String>, buffer: SampleBuffer) {
        self.shared.lock().engine.load_sample(id, buffer);
    }

    pub fn play_sample(&self, id: &str, options: SampleOptions) {
        let result = self.shared.lock().engine.play_sample(id, &options);
        if let Err(e) = result {
            warn!(%e, %id, "sample playback dropped");
        }
    }

    /// Play a drum now.
    pub fn synthesize_drum(&self, synth_type: SynthType, params: VoiceParams) {
        let result = self.shared.lock().engine.synthesize_drum(synth_type, &params, None);
        if let Err(e) = result {
            warn!(%e, %synth_type, "drum dropped");
        }
    }

    /// Play the track at `track_index` of the current pattern now, the way a
    /// pad or MIDI note would. Returns false when there is no such track.
    pub fn trigger_track(&self, track_index: usize, velocity: u8) -> bool {
        let mut shared = self.shared.lock();
        let Some(track) = shared
            .patterns
            .current_pattern()
            .and_then(|p| p.tracks.get(track_index))
        else {
            return false;
        };

        let mut step = track.steps.first().copied().unwrap_or_default();
        step.velocity = velocity.min(127);

        let trigger = Trigger {
            track_id: track.id,
            step_index: 0,
            time: shared.engine.current_time(),
            velocity: step.velocity,
            synth_type: track.synth_type,
            sound: track.sound.clone(),
            params: step.voice_params(track.oscillator()),
            pitch: step.sample_pitch(),
            sample_decay: step.decay,
        };
        shared.dispatch(&trigger);
        true
    }

    /// Fire the track a raw MIDI note-on maps to. Returns false for anything
    /// that is not a mapped note-on.
    pub fn handle_midi(&self, bytes: &[u8]) -> bool {
        match MidiEvent::parse(bytes).and_then(midi::drum_trigger) {
            Some((slot, velocity)) => self.trigger_track(slot, velocity),
            None => false,
        }
    }

    // Bus

    pub fn set_delay_params(&self, update: DelayUpdate) {
        self.shared.lock().engine.set_delay_params(&update);
    }

    /// A size change resynthesizes the impulse response off the lock, so the
    /// transport keeps ticking while it builds.
    pub fn set_reverb_params(&self, update: ReverbUpdate) {
        let request = self.shared.lock().engine.update_reverb(&update);
        if let Some(request) = request {
            let built = request.build();
            self.shared.lock().engine.install_impulse(built);
        }
    }

    pub fn set_distortion_params(&self, update: DistortionUpdate) {
        self.shared.lock().engine.set_distortion_params(&update);
    }

    /// Master volume, 0 - 100.
    pub fn set_volume(&self, volume: f32) {
        self.shared.lock().engine.set_volume(volume);
    }

    pub fn bus_params(&self) -> BusParams {
        *self.shared.lock().engine.params()
    }

    // Transport

    /// Start playback at the current audio time. A no-op while playing.
    pub fn start(&self) -> bool {
        // Held across the whole start so a racing stop cannot miss the timer.
        let mut transport = self.transport.lock();
        {
            let mut shared = self.shared.lock();
            let now = shared.engine.current_time();
            if !shared.scheduler.start(now) {
                return false;
            }
            info!(tempo = shared.scheduler.tempo(), "transport started");
            shared.events.emit(SequencerEvent::PlayStateChange { is_playing: true });
            shared.tick();
        }

        if self.config.output == OutputMode::Device {
            match Transport::spawn(Arc::clone(&self.shared), self.config.tick_interval) {
                Ok(timer) => *transport = Some(timer),
                Err(e) => warn!(%e, "failed to start transport timer"),
            }
        }
        true
    }

    /// Stop playback. Voices already scheduled ring out. A no-op while
    /// stopped.
    pub fn stop(&self) -> bool {
        let mut transport = self.transport.lock();
        // Join first: the timer thread takes the shared lock.
        if let Some(timer) = transport.take() {
            timer.stop();
        }

        let mut shared = self.shared.lock();
        if !shared.scheduler.stop() {
            return false;
        }
        info!("transport stopped");
        shared.events.emit(SequencerEvent::PlayStateChange { is_playing: false });
        true
    }

    /// Run one control tick now.
    pub fn tick(&self) {
        self.shared.lock().tick();
    }

    pub fn is_playing(&self) -> bool {
        self.shared.lock().scheduler.is_playing()
    }

    /// Steps scheduled since `start`; 0 while stopped.
    pub fn current_step(&self) -> u64 {
        self.shared.lock().scheduler.current_step()
    }

    pub fn tempo(&self) -> f64 {
        self.shared.lock().scheduler.tempo()
    }

    /// Clamped to 30 - 300 BPM; takes effect from the next scheduled step.
    pub fn set_tempo(&self, bpm: f64) -> f64 {
        let tempo = self.shared.lock().scheduler.set_tempo(bpm);
        debug!(tempo, "tempo set");
        tempo
    }

    // Events

    pub fn subscribe(&self, kind: EventKind) -> Subscription {
        self.shared.lock().events.subscribe(kind)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.lock().events.unsubscribe(id)
    }

    /// Events dropped for a subscriber that stopped draining its channel.
    pub fn dropped_events(&self, id: SubscriptionId) -> Option<u64> {
        self.shared.lock().events.dropped(id)
    }

    // Patterns

    pub fn create_pattern(&self, id: &str, name: &str, step_count: usize) -> Pattern {
        self.shared
            .lock()
            .patterns
            .create_pattern(id, name, step_count)
            .clone()
    }

    pub fn get_patterns(&self) -> Vec<Pattern> {
        self.shared.lock().patterns.patterns().to_vec()
    }

    pub fn get_pattern(&self, id: &str) -> Option<Pattern> {
        self.shared.lock().patterns.pattern(id).cloned()
    }

    pub fn get_current_pattern(&self) -> Option<Pattern> {
        self.shared.lock().patterns.current_pattern().cloned()
    }

    pub fn set_current_pattern(&self, id: &str) -> bool {
        self.shared.lock().patterns.set_current_pattern(id)
    }

    pub fn delete_pattern(&self, id: &str) -> bool {
        self.shared.lock().patterns.delete_pattern(id)
    }

    pub fn update_step(&self, track_id: u32, step_index: usize, update: StepUpdate) -> bool {
        self.shared
            .lock()
            .patterns
            .update_step(track_id, step_index, &update)
    }

    pub fn toggle_step(&self, track_id: u32, step_index: usize) -> bool {
        self.shared.lock().patterns.toggle_step(track_id, step_index)
    }

    pub fn set_swing(&self, swing: f32) -> bool {
        self.shared.lock().patterns.set_swing(swing)
    }

    pub fn set_track_mute(&self, track_id: u32, mute: bool) -> bool {
        self.shared.lock().patterns.set_track_mute(track_id, mute)
    }

    pub fn set_track_solo(&self, track_id: u32, solo: bool) -> bool {
        self.shared.lock().patterns.set_track_solo(track_id, solo)
    }
}
