//! Benchmarks for low-level DSP primitives.

mod automation;
mod delay;
mod distortion;
mod dynamics;
mod filter;
mod oscillator;
mod reverb;

pub use automation::bench_automation;
pub use delay::bench_delay;
pub use distortion::bench_distortion;
pub use dynamics::bench_dynamics;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use reverb::bench_reverb;
