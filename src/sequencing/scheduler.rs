/*
Lookahead scheduling
====================

The transport timer wakes every ~25 ms, but its wake-ups jitter by several
milliseconds, far too coarse to place a drum hit. So each tick looks ahead:
every step whose time falls before `now + lookahead` is scheduled *now*, at
its exact audio-clock timestamp, and the renderer starts it on the right
frame.

    audio clock ──────────────────────────────────────────────────────▶
                   now            now + lookahead
    tick n          │◀──────────────▶│
                    │  step 4  step 5│ step 6
                    │    ▲       ▲   │
                    │    scheduled   │ (next tick)

As long as the lookahead exceeds the worst timer jitter, nothing is late.

Swing delays every odd step by a fraction of a step:

    offset = swing/100 · seconds_per_step · SWING_FACTOR

so full swing pushes the off-beat three quarters of the way to the next
step. The un-swung grid is never disturbed; `next_note_time` advances by
exactly one step per iteration.
*/

use crate::{
    sequencing::pattern::{Pattern, DEFAULT_STEP_COUNT},
    voices::{SynthType, VoiceParams},
};

pub const MIN_TEMPO: f64 = 30.0;
pub const MAX_TEMPO: f64 = 300.0;
/// Fraction of a step full swing delays an odd step by.
pub const SWING_FACTOR: f64 = 0.75;

/// Sixteenth-note length in seconds.
#[inline]
pub fn seconds_per_step(tempo: f64) -> f64 {
    (60.0 / tempo) / 4.0
}

#[inline]
pub fn swing_offset(step: u64, swing: f32, seconds_per_step: f64) -> f64 {
    if step % 2 == 1 {
        (swing.clamp(0.0, 100.0) as f64 / 100.0) * seconds_per_step * SWING_FACTOR
    } else {
        0.0
    }
}

pub fn clamp_tempo(bpm: f64) -> f64 {
    if bpm.is_nan() {
        MIN_TEMPO
    } else {
        bpm.clamp(MIN_TEMPO, MAX_TEMPO)
    }
}

/// One track firing on one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub track_id: u32,
    pub step_index: usize,
    /// Audio-clock time including swing.
    pub time: f64,
    /// 0 - 127.
    pub velocity: u8,
    pub synth_type: SynthType,
    /// Sample id played by sample tracks.
    pub sound: String,
    pub params: VoiceParams,
    /// Semitones, for sample playback.
    pub pitch: f32,
    /// Step decay (0 - 100) when set; sample tracks fade over it.
    pub sample_decay: Option<f32>,
}

/// Everything due for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledStep {
    pub step_index: usize,
    /// Grid time of the step, without swing.
    pub time: f64,
    pub triggers: Vec<Trigger>,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    tempo: f64,
    lookahead: f64,
    playing: bool,
    current_step: u64,
    next_note_time: f64,
}

impl Scheduler {
    pub fn new(tempo: f64, lookahead: f64) -> Self {
        Self {
            tempo: clamp_tempo(tempo),
            lookahead: lookahead.max(0.0),
            playing: false,
            current_step: 0,
            next_note_time: 0.0,
        }
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Clamp and apply; returns the tempo in effect.
    pub fn set_tempo(&mut self, bpm: f64) -> f64 {
        self.tempo = clamp_tempo(bpm);
        self.tempo
    }

    pub fn lookahead(&self) -> f64 {
        self.lookahead
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Steps scheduled since `start`.
    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    pub fn next_note_time(&self) -> f64 {
        self.next_note_time
    }

    /// Begin at `now`. Returns false if already playing.
    pub fn start(&mut self, now: f64) -> bool {
        if self.playing {
            return false;
        }
        self.playing = true;
        self.current_step = 0;
        self.next_note_time = now;
        true
    }

    /// Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.playing = false;
        self.current_step = 0;
        true
    }

    /// Schedule every step due before `now + lookahead`.
    pub fn tick(&mut self, now: f64, pattern: Option<&Pattern>) -> Vec<ScheduledStep> {
        let mut scheduled = Vec::new();
        if !self.playing {
            return scheduled;
        }

        let horizon = now + self.lookahead;
        while self.next_note_time < horizon {
            let step_duration = seconds_per_step(self.tempo);
            let step_count = pattern.map_or(DEFAULT_STEP_COUNT, |p| p.step_count);
            let step_index = (self.current_step % step_count as u64) as usize;

            let triggers = match pattern {
                Some(pattern) => {
                    let time = self.next_note_time
                        + swing_offset(self.current_step, pattern.swing, step_duration);
                    pattern
                        .triggers_at(step_index)
                        .map(|(track, step)| Trigger {
                            track_id: track.id,
                            step_index,
                            time,
                            velocity: step.velocity,
                            synth_type: track.synth_type,
                            sound: track.sound.clone(),
                            params: step.voice_params(track.oscillator()),
                            pitch: step.sample_pitch(),
                            sample_decay: step.decay,
                        })
                        .collect()
                }
                None => Vec::new(),
            };

            scheduled.push(ScheduledStep {
                step_index,
                time: self.next_note_time,
                triggers,
            });

            self.current_step += 1;
            self.next_note_time += step_duration;
        }
        scheduled
    }
}
