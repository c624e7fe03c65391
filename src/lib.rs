//! Realtime drum-machine core.
//!
//! Layers, leaves first:
//!
//! - [`dsp`]: allocation-free signal primitives (oscillators, filters,
//!   automation curves, convolution, dynamics)
//! - [`graph`]: composable nodes that render against the absolute audio clock
//! - [`voices`]: one-shot drum voices built from graph nodes
//! - [`engine`]: the effect bus, the renderer that runs on the audio thread
//!   and the control-side handle that feeds it
//! - [`sequencing`]: patterns, the lookahead scheduler and transport events
//! - [`runtime`]: [`DrumMachine`], the engine context that ties it together

pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod io;
pub mod runtime;
pub mod sequencing; // Patterns, scheduling and transport events
pub mod voices;

pub use config::{EngineConfig, OutputMode};
pub use engine::renderer::Renderer;
pub use error::EngineError;
pub use runtime::DrumMachine;
pub use sequencing::events::{EventKind, SequencerEvent, Subscription};
pub use voices::{SynthType, VoiceParams};

/// Frames rendered per internal processing block.
///
/// Scheduled voices, bus commands and node scratch buffers all work in chunks
/// of this size. Start times inside a block are still honoured per sample.
pub const RENDER_QUANTUM: usize = 128;

/// Shortest envelope segment, one frame at 48 kHz.
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Level, relative to its peak, at which an envelope counts as silent (-80 dB).
pub const ENV_FLOOR: f32 = 1.0e-4;
