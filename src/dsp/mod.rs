//! Low-level DSP primitives used by the graph nodes and the effect bus.
//!
//! Everything in this module is realtime-safe once constructed: rendering
//! never allocates. Construction may allocate (delay buffers, impulse
//! responses, shaper tables) and happens on the control side.

/// Timestamped parameter curves (set, linear and exponential ramps).
pub mod automation;
/// Circular delay line with fractional reads.
pub mod delay;
/// Waveshaping curves, sampled and closed-form.
pub mod distortion;
/// Compressor and limiter.
pub mod dynamics;
/// State-variable filter and one-pole smoother.
pub mod filter;
/// Summing helpers.
pub mod mix;
/// Oscillator waveforms and noise sources.
pub mod oscillator;
/// Impulse-response synthesis and partitioned convolution.
pub mod reverb;

pub use automation::Automation;
