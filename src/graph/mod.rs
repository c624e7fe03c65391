//! Composable building blocks for constructing drum voices.
//!
//! Graph nodes wrap the low-level DSP primitives with what voice design needs:
//! block rendering against the absolute audio clock and automated parameters.
//! The `extensions` module adds fluent helpers so voices can be authored with
//! a clear, chainable API.

/// Multiply two signals together (amplitude envelopes), fixed gain.
pub mod amplify;
/// Closed-form waveshapers for voices.
pub mod distortion;
/// Automation curves rendered as control signals.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.through()`, `.mix()`, `.gain()`).
pub mod extensions;
/// State-variable filter node with an automated cutoff.
pub mod filter;
/// Summing of parallel layers.
pub mod mix;
/// Core traits shared by all graph nodes.
pub mod node;
/// Oscillators, FM and noise sources.
pub mod oscillator;
/// Serial chaining of two nodes (source → effect).
pub mod through;

pub use node::{GraphNode, RenderCtx};
