use crate::{
    graph::node::{GraphNode, RenderCtx},
    RENDER_QUANTUM,
};

/*
Parallel Signal Mixing
======================

The Mix node sums two audio signals rendered in parallel. It is the additive
counterpart to the Amplify node (which multiplies signals).

How it works:
1. Render source A into the output buffer
2. Render source B into a temporary buffer
3. Add: output = A + B

No weighting happens here. Drum voices are built from layers that each carry
their own envelope and level (the snare's tone and noise, the kick's body and
click), so a plain sum keeps every layer at the level its envelope sets. Use
`.gain()` on a layer to trim it.

Clipping Risk
-------------

Two layers that each peak at 1.0 can sum to 2.0. Voices keep their layer
levels below full scale, and the bus compressor and limiter catch the rest.

Example usage:
  let snare = tone.amplify(tone_env)
      .mix(noise.amplify(noise_env))
      .amplify(overall_env);

Important: apply a shared envelope AFTER mixing if it should gate both layers:

  tone.mix(noise).amplify(env)  // ✓ Envelope gates both
  tone.amplify(env).mix(noise)  // ✗ Only the tone is gated, the noise drones
*/

pub struct Mix<A, B> {
    pub source_a: A,
    pub source_b: B,
    temp_buffer: Vec<f32>,
}

impl<A, B> Mix<A, B> {
    pub fn new(source_a: A, source_b: B) -> Self {
        Mix {
            source_a,
            source_b,
            temp_buffer: vec![0.0; RENDER_QUANTUM],
        }
    }
}

impl<A: GraphNode, B: GraphNode> GraphNode for Mix<A, B> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source_a.render_block(out, ctx);

        for (index, chunk) in out.chunks_mut(RENDER_QUANTUM).enumerate() {
            let frames = &mut self.temp_buffer[..chunk.len()];
            frames.fill(0.0);
            self.source_b
                .render_block(frames, &ctx.offset(index * RENDER_QUANTUM));

            for (o, b) in chunk.iter_mut().zip(frames.iter()) {
                *o += *b;
            }
        }
    }

    fn is_active(&self, time: f64) -> bool {
        self.source_a.is_active(time) || self.source_b.is_active(time)
    }
}
