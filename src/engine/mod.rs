//! Control-side engine handle.
//!
//! [`AudioEngine`] owns everything that may allocate: it builds voices,
//! impulse responses and shaper tables, then pushes them to the
//! [`Renderer`](renderer::Renderer) over a lock-free queue. Whatever the
//! renderer is done with comes back over the retire queue and is dropped here.

pub mod allocator;
pub mod bus;
pub mod message;
pub mod params;
pub mod renderer;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, warn};

use self::{
    allocator::VoicePool,
    bus::EffectBus,
    message::{RenderCommand, Retired},
    params::{volume_gain, BusParams, DelayUpdate, DistortionUpdate, ReverbUpdate},
    renderer::Renderer,
};
use crate::{
    config::{EngineConfig, OutputMode},
    dsp::{
        distortion::ShaperCurve,
        reverb::{Convolver, ImpulseResponse, PARTITION_SIZE},
    },
    error::EngineError,
    io::device::OutputStream,
    voices::{self, sample_voice, SampleBank, SampleBuffer, SampleOptions, SynthType, VoiceParams},
};

/// Below this rate the upper hi-hat partials fold back over Nyquist.
pub const MIN_SYNTHESIS_RATE: u32 = 22_050;

/// How drum triggers are realised, fixed at initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisStrategy {
    /// Synth types run their algorithm; sample tracks play buffers.
    Synthesize,
    /// Every trigger plays its mapped sample.
    SamplesOnly,
}

impl SynthesisStrategy {
    pub fn resolve(config: &EngineConfig, sample_rate: u32) -> Self {
        if config.synthesis && sample_rate >= MIN_SYNTHESIS_RATE {
            SynthesisStrategy::Synthesize
        } else {
            SynthesisStrategy::SamplesOnly
        }
    }
}

/// The queues and clock shared with a running renderer.
struct EngineLink {
    sample_rate: u32,
    strategy: SynthesisStrategy,
    commands: Producer<RenderCommand>,
    retired: Consumer<Retired>,
    clock: Arc<AtomicU64>,
}

/// A room size whose impulse response has yet to be synthesized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseRequest {
    size: f32,
    sample_rate: u32,
    seed: u64,
}

impl ImpulseRequest {
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Synthesize and partition the response. Takes no engine state, so it
    /// can run without holding any lock.
    pub fn build(self) -> ImpulseBuild {
        let response = ImpulseResponse::synthesize(self.size, self.sample_rate as f32, self.seed);
        ImpulseBuild {
            size: self.size,
            convolver: Box::new(Convolver::new(&response, PARTITION_SIZE)),
        }
    }
}

/// A partitioned impulse response ready for the renderer.
#[derive(Debug)]
pub struct ImpulseBuild {
    size: f32,
    convolver: Box<Convolver>,
}

pub struct AudioEngine {
    config: EngineConfig,
    params: BusParams,
    samples: SampleBank,
    link: Option<EngineLink>,
    output: Option<OutputStream>,
    renderer: Option<Renderer>,
    impulse_seed: u64,
}

impl AudioEngine {
    pub fn new(config: EngineConfig) -> Self {
        let params = BusParams {
            volume: config.volume.clamp(0.0, 100.0),
            ..BusParams::default()
        };
        Self {
            config,
            params,
            samples: SampleBank::new(),
            link: None,
            output: None,
            renderer: None,
            impulse_seed: 0x5eed,
        }
    }

    /// Build the render side and connect it to the configured output.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        if self.link.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let (commands, command_rx) = RingBuffer::new(self.config.command_capacity.max(1));
        let retire_capacity = self.config.command_capacity.max(self.config.max_voices) * 2;
        let (retire_tx, retired) = RingBuffer::new(retire_capacity.max(1));
        let clock = Arc::new(AtomicU64::new(0));

        let params = self.params;
        let max_voices = self.config.max_voices;
        let seed = self.next_seed();
        let render_clock = Arc::clone(&clock);
        let build = move |sample_rate: u32| {
            let sample_rate = sample_rate as f32;
            Renderer::new(
                sample_rate,
                command_rx,
                retire_tx,
                VoicePool::new(max_voices),
                EffectBus::new(&params, sample_rate, seed),
                render_clock,
            )
        };

        let sample_rate = match self.config.output {
            OutputMode::Device => {
                let output = OutputStream::open(build)?;
                let sample_rate = output.sample_rate();
                self.output = Some(output);
                sample_rate
            }
            OutputMode::Manual => {
                let sample_rate = self.config.sample_rate.max(1);
                self.renderer = Some(build(sample_rate));
                sample_rate
            }
        };

        let strategy = SynthesisStrategy::resolve(&self.config, sample_rate);
        info!(sample_rate, ?strategy, voices = max_voices, "audio engine initialized");

        self.link = Some(EngineLink {
            sample_rate,
            strategy,
            commands,
            retired,
            clock,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.link.is_some()
    }

    /// The manual-mode renderer, once.
    pub fn take_renderer(&mut self) -> Option<Renderer> {
        self.renderer.take()
    }

    pub fn strategy(&self) -> Option<SynthesisStrategy> {
        self.link.as_ref().map(|link| link.strategy)
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.link.as_ref().map(|link| link.sample_rate)
    }

    /// Seconds rendered so far; 0 before initialisation.
    pub fn current_time(&self) -> f64 {
        self.link.as_ref().map_or(0.0, |link| {
            link.clock.load(Ordering::Acquire) as f64 / link.sample_rate as f64
        })
    }

    pub fn params(&self) -> &BusParams {
        &self.params
    }

    /// Register a decoded buffer under `id` (e.g. `samples/kick.wav`).
    pub fn load_sample(&mut self, id: impl Into<String>, buffer: SampleBuffer) {
        let id = id.into();
        debug!(%id, frames = buffer.len(), "sample loaded");
        self.samples.insert(id, buffer);
    }

    pub fn has_sample(&self, id: &str) -> bool {
        self.samples.contains(id)
    }

    /// Play a registered buffer. A missing buffer is logged and skipped.
    pub fn play_sample(&mut self, id: &str, options: &SampleOptions) -> Result<(), EngineError> {
        let time = self.resolve_time(options.time)?;
        let Some(buffer) = self.samples.get(id) else {
            warn!(%id, "sample not loaded, skipping");
            return Ok(());
        };
        let voice = sample_voice(buffer, options, time);
        self.send(RenderCommand::Voice(voice))
    }

    /// Trigger a drum at `time` (now when `None`).
    ///
    /// Under [`SynthesisStrategy::SamplesOnly`] the type's mapped sample
    /// plays instead. `Sample` has no algorithm and is ignored here; sample
    /// tracks go through [`play_sample`](Self::play_sample).
    pub fn synthesize_drum(
        &mut self,
        synth_type: SynthType,
        params: &VoiceParams,
        time: Option<f64>,
    ) -> Result<(), EngineError> {
        let strategy = self.link.as_ref().ok_or(EngineError::NotInitialized)?.strategy;
        let time = self.resolve_time(time)?;

        match strategy {
            SynthesisStrategy::Synthesize => {
                let Some(voice) = voices::synthesize(synth_type, params, time) else {
                    return Ok(());
                };
                debug!(%synth_type, time, "voice scheduled");
                self.send(RenderCommand::Voice(voice))
            }
            SynthesisStrategy::SamplesOnly => {
                let Some(id) = synth_type.fallback_sample() else {
                    return Ok(());
                };
                let options = SampleOptions {
                    velocity: params.clamped().velocity * 127.0,
                    time: Some(time),
                    ..SampleOptions::default()
                };
                self.play_sample(id, &options)
            }
        }
    }

    pub fn set_delay_params(&mut self, update: &DelayUpdate) {
        self.params.delay.apply(update);
        let coefficients = self.params.delay.coefficients();
        debug!(?coefficients, "delay updated");
        self.send_bus(RenderCommand::Delay(coefficients));
    }

    /// Merge a reverb update; a size change rebuilds the impulse response.
    pub fn set_reverb_params(&mut self, update: &ReverbUpdate) {
        if let Some(request) = self.update_reverb(update) {
            self.install_impulse(request.build());
        }
    }

    /// Merge a reverb update and send the new mix. When the room size changed
    /// on a running engine, returns the impulse response still to be built;
    /// build it with [`ImpulseRequest::build`] and hand it back through
    /// [`install_impulse`](Self::install_impulse).
    pub fn update_reverb(&mut self, update: &ReverbUpdate) -> Option<ImpulseRequest> {
        let previous_size = self.params.reverb.size;
        self.params.reverb.apply(update);
        let coefficients = self.params.reverb.coefficients();
        debug!(?coefficients, "reverb updated");
        self.send_bus(RenderCommand::Reverb(coefficients));

        if self.params.reverb.size == previous_size {
            return None;
        }
        let sample_rate = self.sample_rate()?;
        Some(ImpulseRequest {
            size: self.params.reverb.size,
            sample_rate,
            seed: self.next_seed(),
        })
    }

    /// Swap a built impulse response into the renderer. Returns false, and
    /// drops it, when the room size has moved on since it was requested.
    pub fn install_impulse(&mut self, built: ImpulseBuild) -> bool {
        if built.size != self.params.reverb.size {
            debug!(
                size = built.size,
                current = self.params.reverb.size,
                "stale impulse response discarded"
            );
            return false;
        }
        debug!(
            size = built.size,
            partitions = built.convolver.partition_count(),
            "impulse response rebuilt"
        );
        self.send_bus(RenderCommand::Impulse(built.convolver));
        true
    }

    /// Merge a distortion update; drive or character changes rebuild the curve.
    pub fn set_distortion_params(&mut self, update: &DistortionUpdate) {
        let previous = self.params.distortion;
        self.params.distortion.apply(update);
        let current = self.params.distortion;
        let coefficients = current.coefficients();
        debug!(?coefficients, "distortion updated");
        self.send_bus(RenderCommand::Distortion(coefficients));

        if current.drive != previous.drive || current.character != previous.character {
            let curve = ShaperCurve::new(current.character, current.drive);
            self.send_bus(RenderCommand::Curve(Box::new(curve)));
        }
    }

    /// Master volume, 0 - 100.
    pub fn set_volume(&mut self, volume: f32) {
        self.params.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 100.0) };
        self.send_bus(RenderCommand::MasterGain(volume_gain(self.params.volume)));
    }

    /// Drop everything the renderer has handed back.
    pub fn collect_retired(&mut self) -> usize {
        let Some(link) = self.link.as_mut() else {
            return 0;
        };
        let mut count = 0;
        while let Ok(item) = link.retired.pop() {
            drop(item);
            count += 1;
        }
        count
    }

    fn resolve_time(&self, time: Option<f64>) -> Result<f64, EngineError> {
        if self.link.is_none() {
            return Err(EngineError::NotInitialized);
        }
        Ok(time.unwrap_or_else(|| self.current_time()))
    }

    fn next_seed(&mut self) -> u64 {
        self.impulse_seed = self.impulse_seed.wrapping_add(1);
        self.impulse_seed
    }

    fn send(&mut self, command: RenderCommand) -> Result<(), EngineError> {
        self.collect_retired();
        let link = self.link.as_mut().ok_or(EngineError::NotInitialized)?;
        link.commands.push(command).map_err(|_| EngineError::QueueFull)
    }

    /// Bus updates before initialisation only touch the stored parameters;
    /// the renderer is built from them.
    fn send_bus(&mut self, command: RenderCommand) {
        if self.link.is_none() {
            return;
        }
        if let Err(e) = self.send(command) {
            warn!(%e, "bus update dropped");
        }
    }
}
