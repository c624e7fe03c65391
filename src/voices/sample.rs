//! Sample fallback path.
//!
//! Plays a decoded buffer when a track is sample-typed or synthesis is
//! unavailable. Buffers are decoded elsewhere and registered by id
//! (`samples/<name>.wav`); this module only plays them.
//!
//! Mapping:
//! - gain = `velocity / 127`
//! - rate = `2^(pitch / 12)`, times `buffer_rate / engine_rate`
//! - with `decay`, gain ramps exponentially to the floor over
//!   `0.1 + decay/100 · 3.9` s and the voice stops there

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    dsp::automation::{decay_floor, Automation},
    graph::{
        envelope::EnvNode,
        extensions::NodeExt,
        node::{GraphNode, RenderCtx},
    },
    voices::DrumVoice,
};

/// Furthest a sample can be transposed, in semitones either way.
pub const MAX_PITCH_SEMITONES: f32 = 48.0;

/// A decoded mono buffer.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    frames: Arc<[f32]>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(frames: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        Self {
            frames: frames.into(),
            sample_rate: sample_rate.max(1),
        }
    }

    /// Average interleaved channels down to mono.
    pub fn from_interleaved(samples: &[f32], channels: usize, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let frames: Vec<f32> = samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Self::new(frames, sample_rate)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds at the buffer's own rate.
    pub fn duration(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }
}

/// Decoded buffers keyed by sample id.
#[derive(Debug, Default, Clone)]
pub struct SampleBank {
    buffers: HashMap<String, SampleBuffer>,
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `buffer` under `id`, returning the buffer it replaced.
    pub fn insert(&mut self, id: impl Into<String>, buffer: SampleBuffer) -> Option<SampleBuffer> {
        self.buffers.insert(id.into(), buffer)
    }

    pub fn get(&self, id: &str) -> Option<&SampleBuffer> {
        self.buffers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.buffers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// Options for one sample playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    /// 0 - 127.
    pub velocity: f32,
    /// Semitones.
    pub pitch: f32,
    /// 0 - 100; `None` plays the buffer to its end.
    pub decay: Option<f32>,
    /// Audio-clock start time; `None` means now.
    pub time: Option<f64>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            velocity: 100.0,
            pitch: 0.0,
            decay: None,
            time: None,
        }
    }
}

/// Reads a buffer at a fixed rate from a start time on the audio clock.
pub struct SamplePlayer {
    frames: Arc<[f32]>,
    buffer_rate: f64,
    rate: f64,
    start: f64,
    position: f64,
}

impl SamplePlayer {
    pub fn new(buffer: &SampleBuffer, rate: f64, start: f64) -> Self {
        Self {
            frames: Arc::clone(&buffer.frames),
            buffer_rate: buffer.sample_rate as f64,
            rate,
            start,
            position: 0.0,
        }
    }

    #[inline]
    fn read(&self) -> f32 {
        let index = self.position as usize;
        let Some(&a) = self.frames.get(index) else {
            return 0.0;
        };
        let b = self.frames.get(index + 1).copied().unwrap_or(0.0);
        let frac = (self.position - index as f64) as f32;
        a + (b - a) * frac
    }
}

impl GraphNode for SamplePlayer {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let step = self.rate * self.buffer_rate / ctx.sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            if ctx.frame_time(i) < self.start {
                *sample = 0.0;
                continue;
            }
            *sample = self.read();
            self.position += step;
        }
    }

    fn is_active(&self, _time: f64) -> bool {
        self.position < self.frames.len() as f64
    }
}

/// Playback rate for a pitch offset in semitones, clamped to
/// ±[`MAX_PITCH_SEMITONES`]. NaN plays at the original pitch.
#[inline]
pub fn playback_rate(semitones: f32) -> f64 {
    let semitones = if semitones.is_nan() {
        0.0
    } else {
        semitones.clamp(-MAX_PITCH_SEMITONES, MAX_PITCH_SEMITONES)
    };
    2f64.powf(semitones as f64 / 12.0)
}

/// Decay-ramp length for a 0 - 100 decay value.
#[inline]
pub fn decay_seconds(decay: f32) -> f64 {
    let decay = if decay.is_nan() { 0.0 } else { decay.clamp(0.0, 100.0) };
    0.1 + (decay as f64 / 100.0) * 3.9
}

/// Build the voice that plays `buffer` at `time`.
pub fn sample_voice(buffer: &SampleBuffer, options: &SampleOptions, time: f64) -> DrumVoice {
    let velocity = if options.velocity.is_nan() { 0.0 } else { options.velocity };
    let gain = velocity.clamp(0.0, 127.0) / 127.0;
    let rate = playback_rate(options.pitch);
    let length = buffer.duration() / rate;

    let (amplitude, end) = match options.decay {
        Some(decay) => {
            let ramp = decay_seconds(decay);
            let curve = Automation::new(0.0)
                .set_value_at(gain, time)
                .exponential_ramp_to(decay_floor(gain), time + ramp);
            (curve, time + ramp.min(length))
        }
        None => (Automation::new(0.0).set_value_at(gain, time), time + length),
    };

    let graph = SamplePlayer::new(buffer, rate, time).amplify(EnvNode::new(amplitude.clone()));

    DrumVoice::new(graph.boxed(), amplitude, time, end - time).with_stop(end)
}
