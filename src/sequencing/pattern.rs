/*
Pattern Store
=============

Patterns are plain data: a pattern holds tracks, a track holds one step per
slot of the bar. Nothing here knows about time; the scheduler reads the
current pattern once per tick and turns active steps into triggers.

    Pattern "main" (16 steps, swing 0)
    ├── 0 Kick     tr808_kick   x . . . x . . . x . . . x . . .
    ├── 1 Snare    tr808_snare  . . . . x . . . . . . . x . . .
    ├── 2 Hi-Hat   tr808_hat    x . x . x . x . x . x . x . x .
    └── ...

Step parameters are stored on the 0 - 100 scale a front panel shows and
converted to 0.0 - 1.0 when a voice is built. Anything out of range is
clamped on the way in; nothing is rejected.

Every track's step list is always exactly `step_count` long.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::voices::{OscillatorType, SynthType, VoiceParams};

pub const DEFAULT_STEP_COUNT: usize = 16;
pub const DEFAULT_VELOCITY: u8 = 100;
/// Value assumed for an unset step parameter.
pub const PARAM_CENTER: f32 = 50.0;
/// Semitones per unit of step pitch away from the centre (±12 over 0 - 100).
pub const PITCH_SEMITONES_PER_UNIT: f32 = 0.24;

#[inline]
fn percent(value: f32) -> f32 {
    if value.is_nan() {
        PARAM_CENTER
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// One slot of a track.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub active: bool,
    /// 0 - 127.
    pub velocity: u8,
    /// Stored, not consulted when triggering.
    pub probability: Option<f32>,
    pub pitch: Option<f32>,
    pub decay: Option<f32>,
    pub tone: Option<f32>,
    pub attack: Option<f32>,
    pub tuning: Option<f32>,
    pub snappy: Option<f32>,
    pub color: Option<f32>,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            active: false,
            velocity: DEFAULT_VELOCITY,
            probability: Some(100.0),
            pitch: None,
            decay: None,
            tone: None,
            attack: None,
            tuning: None,
            snappy: None,
            color: None,
        }
    }
}

/// Partial step edit; `None` fields are left alone.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepUpdate {
    pub active: Option<bool>,
    pub velocity: Option<u8>,
    pub probability: Option<f32>,
    pub pitch: Option<f32>,
    pub decay: Option<f32>,
    pub tone: Option<f32>,
    pub attack: Option<f32>,
    pub tuning: Option<f32>,
    pub snappy: Option<f32>,
    pub color: Option<f32>,
}

impl Step {
    pub fn apply(&mut self, update: &StepUpdate) {
        if let Some(active) = update.active {
            self.active = active;
        }
        if let Some(velocity) = update.velocity {
            self.velocity = velocity.min(127);
        }

        let merge = |slot: &mut Option<f32>, value: Option<f32>| {
            if let Some(value) = value {
                *slot = Some(percent(value));
            }
        };
        merge(&mut self.probability, update.probability);
        merge(&mut self.pitch, update.pitch);
        merge(&mut self.decay, update.decay);
        merge(&mut self.tone, update.tone);
        merge(&mut self.attack, update.attack);
        merge(&mut self.tuning, update.tuning);
        merge(&mut self.snappy, update.snappy);
        merge(&mut self.color, update.color);
    }

    /// Synthesis inputs for this step on a track using `oscillator`.
    pub fn voice_params(&self, oscillator: OscillatorType) -> VoiceParams {
        let unit = |value: Option<f32>| percent(value.unwrap_or(PARAM_CENTER)) / 100.0;
        VoiceParams {
            velocity: self.velocity.min(127) as f32 / 127.0,
            decay: unit(self.decay),
            tone: unit(self.tone),
            tuning: unit(self.tuning),
            attack: unit(self.attack),
            snappy: unit(self.snappy),
            color: unit(self.color),
            oscillator,
        }
    }

    /// Pitch offset in semitones for sample playback.
    pub fn sample_pitch(&self) -> f32 {
        (percent(self.pitch.unwrap_or(PARAM_CENTER)) - PARAM_CENTER) * PITCH_SEMITONES_PER_UNIT
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: u32,
    pub name: String,
    /// Sample id, e.g. `samples/kick.wav`.
    pub sound: String,
    pub synth_type: SynthType,
    pub oscillator_type: Option<OscillatorType>,
    pub mute: bool,
    pub solo: bool,
    pub steps: Vec<Step>,
}

impl Track {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        sound: impl Into<String>,
        synth_type: SynthType,
        step_count: usize,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            sound: sound.into(),
            synth_type,
            oscillator_type: None,
            mute: false,
            solo: false,
            steps: vec![Step::default(); step_count],
        }
    }

    /// Apply `defaults` to every step.
    pub fn with_step_defaults(mut self, defaults: StepUpdate) -> Self {
        for step in &mut self.steps {
            step.apply(&defaults);
        }
        self
    }

    pub fn with_oscillator(mut self, oscillator: OscillatorType) -> Self {
        self.oscillator_type = Some(oscillator);
        self
    }

    pub fn oscillator(&self) -> OscillatorType {
        self.oscillator_type.unwrap_or_default()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }
}

/// The eight tracks every new pattern starts with.
fn default_tracks(step_count: usize) -> Vec<Track> {
    vec![
        Track::new(0, "Kick", "samples/kick.wav", SynthType::Tr808Kick, step_count).with_step_defaults(
            StepUpdate {
                decay: Some(50.0),
                tone: Some(40.0),
                tuning: Some(30.0),
                attack: Some(40.0),
                ..StepUpdate::default()
            },
        ),
        Track::new(1, "Snare", "samples/snare.wav", SynthType::Tr808Snare, step_count)
            .with_step_defaults(StepUpdate {
                snappy: Some(60.0),
                tone: Some(50.0),
                ..StepUpdate::default()
            }),
        Track::new(2, "Hi-Hat", "samples/hihat.wav", SynthType::Tr808Hat, step_count)
            .with_step_defaults(StepUpdate {
                decay: Some(20.0),
                color: Some(50.0),
                ..StepUpdate::default()
            }),
        Track::new(3, "Clap", "samples/clap.wav", SynthType::Tr808Clap, step_count).with_step_defaults(
            StepUpdate {
                decay: Some(40.0),
                tone: Some(50.0),
                ..StepUpdate::default()
            },
        ),
        Track::new(4, "Tom Low", "samples/tom_low.wav", SynthType::Tr909Tom, step_count)
            .with_step_defaults(StepUpdate {
                tuning: Some(20.0),
                ..StepUpdate::default()
            }),
        Track::new(5, "Tom High", "samples/tom_high.wav", SynthType::Tr808Tom, step_count)
            .with_step_defaults(StepUpdate {
                tuning: Some(70.0),
                ..StepUpdate::default()
            }),
        Track::new(6, "Crash", "samples/crash.wav", SynthType::NoiseDrum, step_count)
            .with_step_defaults(StepUpdate {
                decay: Some(90.0),
                color: Some(80.0),
                ..StepUpdate::default()
            }),
        Track::new(7, "Perc", "samples/perc.wav", SynthType::FmDrum, step_count).with_step_defaults(
            StepUpdate {
                tone: Some(50.0),
                color: Some(40.0),
                ..StepUpdate::default()
            },
        ),
    ]
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    pub step_count: usize,
    /// 0 - 100.
    pub swing: f32,
    pub tracks: Vec<Track>,
}

impl Pattern {
    /// A pattern seeded with the default kit, every step off.
    pub fn new(id: impl Into<String>, name: impl Into<String>, step_count: usize) -> Self {
        let step_count = step_count.max(1);
        Self {
            id: id.into(),
            name: name.into(),
            step_count,
            swing: 0.0,
            tracks: default_tracks(step_count),
        }
    }

    pub fn track(&self, track_id: u32) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == track_id)
    }

    pub fn track_mut(&mut self, track_id: u32) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|track| track.id == track_id)
    }

    /// Whether `track` should sound given the pattern's mute and solo state.
    pub fn is_audible(&self, track: &Track) -> bool {
        if track.mute {
            return false;
        }
        let any_solo = self.tracks.iter().any(|t| t.solo);
        !any_solo || track.solo
    }

    /// Tracks whose step at `step_index` fires.
    pub fn triggers_at(&self, step_index: usize) -> impl Iterator<Item = (&Track, &Step)> {
        let index = step_index % self.step_count;
        self.tracks
            .iter()
            .filter(move |track| self.is_audible(track))
            .filter_map(move |track| track.step(index).map(|step| (track, step)))
            .filter(|(_, step)| step.active)
    }
}

/// Every pattern plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    patterns: Vec<Pattern>,
    current: Option<String>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) a pattern. The first pattern becomes current.
    pub fn create_pattern(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        step_count: usize,
    ) -> &Pattern {
        let pattern = Pattern::new(id, name, step_count);
        let id = pattern.id.clone();

        let index = match self.patterns.iter().position(|p| p.id == id) {
            Some(index) => {
                self.patterns[index] = pattern;
                index
            }
            None => {
                self.patterns.push(pattern);
                self.patterns.len() - 1
            }
        };
        if self.current.is_none() {
            self.current = Some(id);
        }
        &self.patterns[index]
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn pattern(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn current_pattern(&self) -> Option<&Pattern> {
        self.current.as_deref().and_then(|id| self.pattern(id))
    }

    fn current_pattern_mut(&mut self) -> Option<&mut Pattern> {
        let id = self.current.as_deref()?;
        self.patterns.iter_mut().find(|p| p.id == id)
    }

    pub fn set_current_pattern(&mut self, id: &str) -> bool {
        if self.pattern(id).is_none() {
            return false;
        }
        self.current = Some(id.to_string());
        true
    }

    /// Remove a pattern. Removing the current one selects the first left.
    pub fn delete_pattern(&mut self, id: &str) -> bool {
        let Some(index) = self.patterns.iter().position(|p| p.id == id) else {
            return false;
        };
        self.patterns.remove(index);
        if self.current.as_deref() == Some(id) {
            self.current = self.patterns.first().map(|p| p.id.clone());
        }
        true
    }

    /// Merge `update` into one step of the current pattern.
    pub fn update_step(&mut self, track_id: u32, step_index: usize, update: &StepUpdate) -> bool {
        self.with_step(track_id, step_index, |step| step.apply(update))
    }

    pub fn toggle_step(&mut self, track_id: u32, step_index: usize) -> bool {
        self.with_step(track_id, step_index, |step| step.active = !step.active)
    }

    pub fn set_swing(&mut self, swing: f32) -> bool {
        let Some(pattern) = self.current_pattern_mut() else {
            return false;
        };
        pattern.swing = if swing.is_nan() { 0.0 } else { swing.clamp(0.0, 100.0) };
        true
    }

    pub fn set_track_mute(&mut self, track_id: u32, mute: bool) -> bool {
        self.with_track(track_id, |track| track.mute = mute)
    }

    pub fn set_track_solo(&mut self, track_id: u32, solo: bool) -> bool {
        self.with_track(track_id, |track| track.solo = solo)
    }

    fn with_track(&mut self, track_id: u32, edit: impl FnOnce(&mut Track)) -> bool {
        match self.current_pattern_mut().and_then(|p| p.track_mut(track_id)) {
            Some(track) => {
                edit(track);
                true
            }
            None => false,
        }
    }

    fn with_step(&mut self, track_id: u32, step_index: usize, edit: impl FnOnce(&mut Step)) -> bool {
        match self
            .current_pattern_mut()
            .and_then(|p| p.track_mut(track_id))
            .and_then(|t| t.steps.get_mut(step_index))
        {
            Some(step) => {
                edit(step);
                true
            }
            None => false,
        }
    }
}
