use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where rendered audio goes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Open the default `cpal` output device; the device dictates the sample
    /// rate.
    #[default]
    Device,
    /// Hand the renderer to the caller (`DrumMachine::take_renderer`) for
    /// offline bounces and tests.
    Manual,
}

/// Engine configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in manual mode; a device dictates its own.
    pub sample_rate: u32,
    pub output: OutputMode,
    /// How far ahead of the audio clock the scheduler places triggers.
    pub lookahead: Duration,
    /// Period of the transport timer.
    pub tick_interval: Duration,
    /// Voice slots in the renderer's arena.
    pub max_voices: usize,
    /// Capacity of the control → render command queue.
    pub command_capacity: usize,
    /// Disable to force the sample fallback path.
    pub synthesis: bool,
    /// Initial master volume, 0-100.
    pub volume: f32,
    /// Initial tempo in BPM.
    pub tempo: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            output: OutputMode::Device,
            lookahead: Duration::from_millis(100),
            tick_interval: Duration::from_millis(25),
            max_voices: 64,
            command_capacity: 512,
            synthesis: true,
            volume: 80.0,
            tempo: 120.0,
        }
    }
}

impl EngineConfig {
    /// Manual (caller-rendered) engine at `sample_rate`.
    pub fn manual(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            output: OutputMode::Manual,
            ..Self::default()
        }
    }
}
