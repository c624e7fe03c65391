//! Effect-bus parameter sets.
//!
//! The live sets sit on the control side. Setters merge a partial update,
//! clamp every field into range and re-derive the coefficients the renderer
//! needs; only those coefficients cross the queue.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::distortion::DistortionCharacter;

/// Longest delay time the bus line is allocated for.
pub const MAX_DELAY_SECONDS: f32 = 2.0;
pub const MAX_FEEDBACK: f32 = 0.95;
pub const MAX_PREDELAY_SECONDS: f32 = 0.5;

/// `200 · 100^x` Hz, 200 Hz at 0 and 20 kHz at 1.
#[inline]
pub fn sweep_hz(x: f32) -> f32 {
    200.0 * 100f32.powf(x.clamp(0.0, 1.0))
}

#[inline]
fn unit(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[inline]
fn wet(mix: f32, bypass: bool) -> f32 {
    if bypass {
        0.0
    } else {
        mix
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParams {
    /// Seconds, 0 - 2.
    pub time: f32,
    /// 0 - 0.95.
    pub feedback: f32,
    /// 0 - 1, mapped to 200 Hz - 20 kHz.
    pub filter_cutoff: f32,
    pub mix: f32,
    pub bypass: bool,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            time: 0.25,
            feedback: 0.3,
            filter_cutoff: 0.5,
            mix: 0.2,
            bypass: false,
        }
    }
}

/// Partial delay update; `None` fields keep their value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DelayUpdate {
    pub time: Option<f32>,
    pub feedback: Option<f32>,
    pub filter_cutoff: Option<f32>,
    pub mix: Option<f32>,
    pub bypass: Option<bool>,
}

impl DelayParams {
    pub fn apply(&mut self, update: &DelayUpdate) {
        if let Some(time) = update.time {
            self.time = time;
        }
        if let Some(feedback) = update.feedback {
            self.feedback = feedback;
        }
        if let Some(cutoff) = update.filter_cutoff {
            self.filter_cutoff = cutoff;
        }
        if let Some(mix) = update.mix {
            self.mix = mix;
        }
        if let Some(bypass) = update.bypass {
            self.bypass = bypass;
        }
        *self = self.clamped();
    }

    pub fn clamped(self) -> Self {
        Self {
            time: unit(self.time / MAX_DELAY_SECONDS) * MAX_DELAY_SECONDS,
            feedback: unit(self.feedback).min(MAX_FEEDBACK),
            filter_cutoff: unit(self.filter_cutoff),
            mix: unit(self.mix),
            bypass: self.bypass,
        }
    }

    pub fn wet(&self) -> f32 {
        wet(self.mix, self.bypass)
    }

    pub fn cutoff_hz(&self) -> f32 {
        sweep_hz(self.filter_cutoff)
    }

    pub fn coefficients(&self) -> DelayCoefficients {
        DelayCoefficients {
            time: self.time,
            feedback: self.feedback,
            cutoff_hz: self.cutoff_hz(),
            wet: self.wet(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayCoefficients {
    pub time: f32,
    pub feedback: f32,
    pub cutoff_hz: f32,
    pub wet: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    /// 0 - 1, impulse length 0.1 - 4 s.
    pub size: f32,
    /// 0 - 1, more damping closes the return lowpass.
    pub damping: f32,
    /// Seconds, 0 - 0.5.
    pub predelay: f32,
    pub mix: f32,
    pub bypass: bool,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            damping: 0.5,
            predelay: 0.01,
            mix: 0.2,
            bypass: false,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReverbUpdate {
    pub size: Option<f32>,
    pub damping: Option<f32>,
    pub predelay: Option<f32>,
    pub mix: Option<f32>,
    pub bypass: Option<bool>,
}

impl ReverbParams {
    pub fn apply(&mut self, update: &ReverbUpdate) {
        if let Some(size) = update.size {
            self.size = size;
        }
        if let Some(damping) = update.damping {
            self.damping = damping;
        }
        if let Some(predelay) = update.predelay {
            self.predelay = predelay;
        }
        if let Some(mix) = update.mix {
            self.mix = mix;
        }
        if let Some(bypass) = update.bypass {
            self.bypass = bypass;
        }
        *self = self.clamped();
    }

    pub fn clamped(self) -> Self {
        Self {
            size: unit(self.size),
            damping: unit(self.damping),
            predelay: unit(self.predelay / MAX_PREDELAY_SECONDS) * MAX_PREDELAY_SECONDS,
            mix: unit(self.mix),
            bypass: self.bypass,
        }
    }

    pub fn wet(&self) -> f32 {
        wet(self.mix, self.bypass)
    }

    pub fn damping_hz(&self) -> f32 {
        sweep_hz(1.0 - self.damping)
    }

    pub fn coefficients(&self) -> ReverbCoefficients {
        ReverbCoefficients {
            predelay: self.predelay,
            damping_hz: self.damping_hz(),
            wet: self.wet(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbCoefficients {
    pub predelay: f32,
    pub damping_hz: f32,
    pub wet: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionParams {
    pub drive: f32,
    /// 0 - 1, post-filter 200 Hz - 20 kHz.
    pub tone: f32,
    pub character: DistortionCharacter,
    pub mix: f32,
    pub bypass: bool,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            drive: 0.2,
            tone: 0.5,
            character: DistortionCharacter::Soft,
            mix: 0.0,
            bypass: false,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistortionUpdate {
    pub drive: Option<f32>,
    pub tone: Option<f32>,
    pub character: Option<DistortionCharacter>,
    pub mix: Option<f32>,
    pub bypass: Option<bool>,
}

impl DistortionParams {
    pub fn apply(&mut self, update: &DistortionUpdate) {
        if let Some(drive) = update.drive {
            self.drive = drive;
        }
        if let Some(tone) = update.tone {
            self.tone = tone;
        }
        if let Some(character) = update.character {
            self.character = character;
        }
        if let Some(mix) = update.mix {
            self.mix = mix;
        }
        if let Some(bypass) = update.bypass {
            self.bypass = bypass;
        }
        *self = self.clamped();
    }

    pub fn clamped(self) -> Self {
        Self {
            drive: unit(self.drive),
            tone: unit(self.tone),
            character: self.character,
            mix: unit(self.mix),
            bypass: self.bypass,
        }
    }

    pub fn wet(&self) -> f32 {
        wet(self.mix, self.bypass)
    }

    pub fn tone_hz(&self) -> f32 {
        sweep_hz(self.tone)
    }

    pub fn coefficients(&self) -> DistortionCoefficients {
        DistortionCoefficients {
            tone_hz: self.tone_hz(),
            wet: self.wet(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionCoefficients {
    pub tone_hz: f32,
    pub wet: f32,
}

/// Master gain for a 0 - 100 volume, `(v / 100)²`.
#[inline]
pub fn volume_gain(volume: f32) -> f32 {
    let v = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 100.0) } / 100.0;
    v * v
}

/// Every bus setting the control side tracks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusParams {
    pub delay: DelayParams,
    pub reverb: ReverbParams,
    pub distortion: DistortionParams,
    /// 0 - 100.
    pub volume: f32,
}

impl Default for BusParams {
    fn default() -> Self {
        Self {
            delay: DelayParams::default(),
            reverb: ReverbParams::default(),
            distortion: DistortionParams::default(),
            volume: 80.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_forces_zero_wet() {
        let mut delay = DelayParams {
            mix: 0.9,
            ..DelayParams::default()
        };
        delay.apply(&DelayUpdate {
            bypass: Some(true),
            ..DelayUpdate::default()
        });
        assert_eq!(delay.mix, 0.9);
        assert_eq!(delay.wet(), 0.0);
        assert_eq!(delay.coefficients().wet, 0.0);

        delay.apply(&DelayUpdate {
            mix: Some(0.4),
            ..DelayUpdate::default()
        });
        assert_eq!(delay.wet(), 0.0);

        delay.apply(&DelayUpdate {
            bypass: Some(false),
            ..DelayUpdate::default()
        });
        assert_eq!(delay.wet(), 0.4);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let mut reverb = ReverbParams::default();
        reverb.apply(&ReverbUpdate {
            size: Some(0.9),
            ..ReverbUpdate::default()
        });
        assert_eq!(reverb.size, 0.9);
        assert_eq!(reverb.damping, ReverbParams::default().damping);
        assert_eq!(reverb.mix, ReverbParams::default().mix);
    }

    #[test]
    fn values_are_clamped_not_rejected() {
        let mut delay = DelayParams::default();
        delay.apply(&DelayUpdate {
            time: Some(5.0),
            feedback: Some(1.5),
            mix: Some(-1.0),
            ..DelayUpdate::default()
        });
        assert_eq!(delay.time, MAX_DELAY_SECONDS);
        assert_eq!(delay.feedback, MAX_FEEDBACK);
        assert_eq!(delay.mix, 0.0);

        let mut reverb = ReverbParams::default();
        reverb.apply(&ReverbUpdate {
            predelay: Some(3.0),
            damping: Some(f32::NAN),
            ..ReverbUpdate::default()
        });
        assert_eq!(reverb.predelay, MAX_PREDELAY_SECONDS);
        assert_eq!(reverb.damping, 0.0);
    }

    #[test]
    fn cutoff_sweeps_two_decades() {
        assert!((sweep_hz(0.0) - 200.0).abs() < 1e-3);
        assert!((sweep_hz(0.5) - 2_000.0).abs() < 1e-1);
        assert!((sweep_hz(1.0) - 20_000.0).abs() < 1.0);

        let damped = ReverbParams {
            damping: 1.0,
            ..ReverbParams::default()
        };
        assert!((damped.damping_hz() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn distortion_character_merges() {
        let mut distortion = DistortionParams::default();
        distortion.apply(&DistortionUpdate {
            character: Some(DistortionCharacter::Fold),
            mix: Some(0.5),
            ..DistortionUpdate::default()
        });
        assert_eq!(distortion.character, DistortionCharacter::Fold);
        assert_eq!(distortion.wet(), 0.5);
        assert_eq!(distortion.drive, 0.2);
    }

    #[test]
    fn volume_is_squared() {
        assert_eq!(volume_gain(100.0), 1.0);
        assert!((volume_gain(50.0) - 0.25).abs() < 1e-6);
        assert_eq!(volume_gain(250.0), 1.0);
        assert_eq!(volume_gain(-3.0), 0.0);
    }
}
