//! Real-world scenario benchmarks.
//!
//! These model what the renderer actually does per block: drum voices in
//! flight, a full kit summed through the voice pool, and the effect bus.

mod bus;
mod kit;
mod voices;

pub use bus::bench_bus;
pub use kit::bench_kit;
pub use voices::bench_voices;
