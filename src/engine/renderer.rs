use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer};

use crate::{
    engine::{
        allocator::VoicePool,
        bus::EffectBus,
        message::{RenderCommand, Retired},
    },
    graph::node::RenderCtx,
    RENDER_QUANTUM,
};

/// The audio-thread half of the engine.
///
/// Owns the voice slots and the effect bus. Each call drains pending
/// commands, renders whole quanta and advances the audio clock. Nothing here
/// allocates, blocks or frees heap memory in the steady state: finished
/// voices and displaced tables go back over the retire queue.
pub struct Renderer {
    sample_rate: f32,
    commands: Consumer<RenderCommand>,
    retired: Producer<Retired>,
    voices: VoicePool,
    bus: EffectBus,
    clock: Arc<AtomicU64>,
    frame_counter: u64,
    mix: Vec<f32>,
    scratch: Vec<f32>,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl Renderer {
    pub(crate) fn new(
        sample_rate: f32,
        commands: Consumer<RenderCommand>,
        retired: Producer<Retired>,
        voices: VoicePool,
        bus: EffectBus,
        clock: Arc<AtomicU64>,
    ) -> Self {
        Self {
            sample_rate,
            commands,
            retired,
            voices,
            bus,
            frame_counter: clock.load(Ordering::Acquire),
            clock,
            mix: vec![0.0; RENDER_QUANTUM],
            scratch: vec![0.0; RENDER_QUANTUM],
            left: vec![0.0; RENDER_QUANTUM],
            right: vec![0.0; RENDER_QUANTUM],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Audio-clock time of the next frame to be rendered.
    pub fn current_time(&self) -> f64 {
        self.frame_counter as f64 / self.sample_rate as f64
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_counter
    }

    pub fn active_voices(&self) -> usize {
        self.voices.active_count()
    }

    /// Fill an interleaved buffer of `channels` channels.
    ///
    /// Channels 0 and 1 carry the stereo bus output; a mono device gets the
    /// sum and any further channels get the centre.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let total_frames = out.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(RENDER_QUANTUM);
            self.render_quantum(frames_to_render);

            let out_off = frames_written * channels;
            let block = &mut out[out_off..out_off + frames_to_render * channels];
            for (i, frame) in block.chunks_exact_mut(channels).enumerate() {
                let (l, r) = (self.left[i], self.right[i]);
                match frame {
                    [mono] => *mono = (l + r) * 0.5,
                    [left, right, rest @ ..] => {
                        *left = l;
                        *right = r;
                        rest.fill((l + r) * 0.5);
                    }
                    [] => {}
                }
            }

            frames_written += frames_to_render;
        }
    }

    /// Fill separate left and right buffers (offline bounces and tests).
    pub fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        let total_frames = left.len().min(right.len());
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(RENDER_QUANTUM);
            self.render_quantum(frames_to_render);

            let range = frames_written..frames_written + frames_to_render;
            left[range.clone()].copy_from_slice(&self.left[..frames_to_render]);
            right[range].copy_from_slice(&self.right[..frames_to_render]);

            frames_written += frames_to_render;
        }
    }

    fn render_quantum(&mut self, frames: usize) {
        self.process_commands();

        let ctx = RenderCtx::at_frame(self.sample_rate, self.frame_counter);
        let mix = &mut self.mix[..frames];
        mix.fill(0.0);

        let retired = &mut self.retired;
        self.voices
            .render(mix, &mut self.scratch, &ctx, |voice| retire(retired, Retired::Voice(voice)));

        self.bus
            .process(mix, &mut self.left[..frames], &mut self.right[..frames]);

        self.frame_counter += frames as u64;
        self.clock.store(self.frame_counter, Ordering::Release);
    }

    fn process_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                RenderCommand::Voice(voice) => {
                    if let Some(stolen) = self.voices.insert(voice) {
                        retire(&mut self.retired, Retired::Voice(stolen));
                    }
                }
                RenderCommand::Delay(coefficients) => self.bus.set_delay(coefficients),
                RenderCommand::Reverb(coefficients) => self.bus.set_reverb(coefficients),
                RenderCommand::Distortion(coefficients) => self.bus.set_distortion(coefficients),
                RenderCommand::MasterGain(gain) => self.bus.set_master_gain(gain),
                RenderCommand::Impulse(convolver) => {
                    let old = self.bus.replace_convolver(convolver);
                    retire(&mut self.retired, Retired::Impulse(old));
                }
                RenderCommand::Curve(curve) => {
                    let old = self.bus.replace_curve(curve);
                    retire(&mut self.retired, Retired::Curve(old));
                }
            }
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let retired = &mut self.retired;
        self.voices
            .drain(|voice| retire(retired, Retired::Voice(voice)));
    }
}

/// Hand `item` back to the control side. With the queue full it is dropped
/// here instead.
#[inline]
fn retire(queue: &mut Producer<Retired>, item: Retired) {
    let _ = queue.push(item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::params::BusParams,
        voices::{self, SynthType, VoiceParams},
    };
    use rtrb::RingBuffer;

    const SR: f32 = 48_000.0;

    struct Harness {
        renderer: Renderer,
        commands: Producer<RenderCommand>,
        retired: Consumer<Retired>,
        clock: Arc<AtomicU64>,
    }

    fn harness(slots: usize) -> Harness {
        let (commands, command_rx) = RingBuffer::new(64);
        let (retire_tx, retired) = RingBuffer::new(64);
        let clock = Arc::new(AtomicU64::new(0));
        let params = BusParams {
            volume: 100.0,
            ..BusParams::default()
        };
        let renderer = Renderer::new(
            SR,
            command_rx,
            retire_tx,
            VoicePool::new(slots),
            EffectBus::new(&params, SR, 1),
            Arc::clone(&clock),
        );
        Harness {
            renderer,
            commands,
            retired,
            clock,
        }
    }

    fn kick(time: f64) -> RenderCommand {
        RenderCommand::Voice(
            voices::synthesize(SynthType::Tr808Kick, &VoiceParams::default(), time).unwrap(),
        )
    }

    #[test]
    fn clock_advances_with_rendered_frames() {
        let mut h = harness(4);
        let mut out = vec![0.0f32; 1_000 * 2];
        h.renderer.render(&mut out, 2);

        assert_eq!(h.renderer.frames_rendered(), 1_000);
        assert_eq!(h.clock.load(Ordering::Acquire), 1_000);
        assert!((h.renderer.current_time() - 1_000.0 / 48_000.0).abs() < 1e-12);
    }

    #[test]
    fn silent_without_voices() {
        let mut h = harness(4);
        let mut out = vec![0.0f32; 512 * 2];
        h.renderer.render(&mut out, 2);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn voice_sounds_at_its_start_time() {
        let mut h = harness(4);
        // 10 ms in.
        assert!(h.commands.push(kick(0.01)).is_ok());

        let mut left = vec![0.0f32; 4_800];
        let mut right = vec![0.0f32; 4_800];
        h.renderer.render_stereo(&mut left, &mut right);

        assert!(left[..480].iter().all(|&s| s == 0.0));
        assert!(left[480..].iter().any(|s| s.abs() > 1e-2));
        assert_eq!(h.renderer.active_voices(), 1);
    }

    #[test]
    fn finished_voices_are_retired() {
        let mut h = harness(4);
        let params = VoiceParams {
            decay: 0.0,
            ..VoiceParams::default()
        };
        let hat = voices::synthesize(SynthType::Tr808Hat, &params, 0.0).unwrap();
        let stop = hat.stop();
        assert!(h.commands.push(RenderCommand::Voice(hat)).is_ok());

        let frames = ((stop + 0.01) * SR as f64) as usize;
        let mut out = vec![0.0f32; frames * 2];
        h.renderer.render(&mut out, 2);

        assert_eq!(h.renderer.active_voices(), 0);
        assert!(matches!(h.retired.pop(), Ok(Retired::Voice(_))));
    }

    #[test]
    fn full_pool_steals() {
        let mut h = harness(2);
        for _ in 0..3 {
            assert!(h.commands.push(kick(0.0)).is_ok());
        }
        let mut out = vec![0.0f32; 128 * 2];
        h.renderer.render(&mut out, 2);

        assert_eq!(h.renderer.active_voices(), 2);
        assert!(matches!(h.retired.pop(), Ok(Retired::Voice(_))));
    }

    #[test]
    fn interleaves_channels() {
        let mut h = harness(4);
        assert!(h.commands.push(kick(0.0)).is_ok());

        let mut out = vec![0.0f32; 256 * 3];
        h.renderer.render(&mut out, 3);
        for frame in out.chunks_exact(3) {
            assert!((frame[2] - (frame[0] + frame[1]) * 0.5).abs() < 1e-6);
        }

        let mut mono = vec![0.0f32; 256];
        h.renderer.render(&mut mono, 1);
        assert!(mono.iter().any(|s| s.abs() > 1e-3));
    }

    #[test]
    fn dropping_hands_voices_back() {
        let mut h = harness(4);
        assert!(h.commands.push(kick(5.0)).is_ok());
        let mut out = vec![0.0f32; 128 * 2];
        h.renderer.render(&mut out, 2);

        let Harness {
            renderer, mut retired, ..
        } = h;
        drop(renderer);
        assert!(matches!(retired.pop(), Ok(Retired::Voice(_))));
    }
}
