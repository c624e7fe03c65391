use crate::{
    dsp::{
        automation::Automation,
        oscillator::{NoiseColor, NoiseSource, Oscillator, OscillatorWaveform},
    },
    graph::node::{GraphNode, RenderCtx},
    RENDER_QUANTUM,
};

/*
Audio Oscillators
=================

The sound sources of every drum voice. An oscillator turns a frequency into a
repeating waveform; a noise node produces random samples with no pitch at all.

Waveform Character (drum use):
------------------------------

Sine:      One partial, no overtones. The 808 kick body, FM carriers.
Triangle:  Weak odd harmonics. Snare and tom bodies, the 909 kick.
Square:    Strong odd harmonics. The six-oscillator 808 hat metal.
Sawtooth:  Every harmonic. The 909 kick click.
Pulse:     Narrow square; hollow and nasal.
Noise:     Every frequency at once. Snares, hats, claps, cymbals.

Pitch Is Automated, Not Played
------------------------------

Drum oscillators don't follow a keyboard. Their frequency is an `Automation`
curve on the absolute audio clock, which is how the pitch drop of a kick is
made:

  Hz
  160 ●╮
      │ ╲_
      │   ╲__                     (exponential ramp, 4x base → base)
   40 │      ╲________________
      └──────────────────────→ t
      start   start + 0.1·decay

Frequency Modulation
--------------------

`modulated_by` adds a second node's output to the frequency every sample:

    f(t) = f_carrier(t) + modulator(t)

The modulator is usually a sine scaled by an index envelope, so the index
(in Hz) sets how far the carrier swings and therefore how bright the hit is.

Example usage:
  // 808 kick body
  let body = OscNode::sine_at(
      Automation::new(160.0)
          .set_value_at(160.0, start)
          .exponential_ramp_to(40.0, start + 0.05),
  );

  // FM percussion
  let modulator = OscNode::sine(280.0).amplify(EnvNode::new(index));
  let fm = OscNode::sine(200.0).modulated_by(modulator);
*/

pub struct OscNode {
    osc: Oscillator,
    frequency: Automation,
}

impl OscNode {
    pub fn new(waveform: OscillatorWaveform, frequency: Automation) -> Self {
        Self {
            osc: Oscillator::new(waveform),
            frequency,
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::sine_at(Automation::constant(frequency))
    }

    pub fn sine_at(frequency: Automation) -> Self {
        Self::new(OscillatorWaveform::Sine, frequency)
    }

    pub fn triangle(frequency: f32) -> Self {
        Self::triangle_at(Automation::constant(frequency))
    }

    pub fn triangle_at(frequency: Automation) -> Self {
        Self::new(OscillatorWaveform::Triangle, frequency)
    }

    pub fn sawtooth(frequency: f32) -> Self {
        Self::new(OscillatorWaveform::Sawtooth, Automation::constant(frequency))
    }

    pub fn square(frequency: f32) -> Self {
        Self::new(OscillatorWaveform::Square, Automation::constant(frequency))
    }

    /// Feed `modulator`'s output into this oscillator's frequency (in Hz).
    pub fn modulated_by<M: GraphNode>(self, modulator: M) -> FmNode<M> {
        FmNode::new(self, modulator)
    }

    /// Render with a per-sample frequency offset.
    fn render_with_offset(&mut self, out: &mut [f32], offsets: &[f32], ctx: &RenderCtx) {
        for (i, (sample, offset)) in out.iter_mut().zip(offsets).enumerate() {
            let frequency = self.frequency.next_value(ctx.frame_time(i)) + offset;
            *sample = self.osc.next_sample(frequency, ctx.sample_rate);
        }
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let frequency = self.frequency.next_value(ctx.frame_time(i));
            *sample = self.osc.next_sample(frequency, ctx.sample_rate);
        }
    }
}

/// Carrier oscillator whose frequency is offset by a modulator node.
pub struct FmNode<M> {
    carrier: OscNode,
    modulator: M,
    temp_buffer: Vec<f32>,
}

impl<M> FmNode<M> {
    pub fn new(carrier: OscNode, modulator: M) -> Self {
        Self {
            carrier,
            modulator,
            temp_buffer: vec![0.0; RENDER_QUANTUM],
        }
    }
}

impl<M: GraphNode> GraphNode for FmNode<M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (index, chunk) in out.chunks_mut(RENDER_QUANTUM).enumerate() {
            let chunk_ctx = ctx.offset(index * RENDER_QUANTUM);
            let offsets = &mut self.temp_buffer[..chunk.len()];
            offsets.fill(0.0);
            self.modulator.render_block(offsets, &chunk_ctx);
            self.carrier.render_with_offset(chunk, offsets, &chunk_ctx);
        }
    }

    fn is_active(&self, time: f64) -> bool {
        self.modulator.is_active(time)
    }
}

/// Unpitched noise source.
pub struct NoiseNode {
    source: NoiseSource,
}

impl NoiseNode {
    pub fn new(color: NoiseColor) -> Self {
        Self {
            source: match color {
                NoiseColor::White => NoiseSource::white(),
                NoiseColor::Pink => NoiseSource::pink(),
            },
        }
    }

    pub fn white() -> Self {
        Self::new(NoiseColor::White)
    }

    pub fn pink() -> Self {
        Self::new(NoiseColor::Pink)
    }

    /// Deterministic noise, for tests and offline renders.
    pub fn seeded(color: NoiseColor, seed: u64) -> Self {
        Self {
            source: NoiseSource::new(color, seed),
        }
    }
}

impl GraphNode for NoiseNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.source.next_sample();
        }
    }
}
