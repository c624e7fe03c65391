use crate::{
    graph::node::{GraphNode, RenderCtx},
    RENDER_QUANTUM,
};

/// Multiply a signal by a modulator (an envelope, usually).
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            temp_buffer: vec![0.0; RENDER_QUANTUM],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // Render signal into output
        self.signal.render_block(out, ctx);

        // Modulator in quantum-sized pieces (RT-safe, no allocation)
        for (index, chunk) in out.chunks_mut(RENDER_QUANTUM).enumerate() {
            let frames = &mut self.temp_buffer[..chunk.len()];
            frames.fill(0.0);
            self.modulator
                .render_block(frames, &ctx.offset(index * RENDER_QUANTUM));

            for (o, m) in chunk.iter_mut().zip(frames.iter()) {
                *o *= *m;
            }
        }
    }

    // Silent as soon as either factor is.
    fn is_active(&self, time: f64) -> bool {
        self.signal.is_active(time) && self.modulator.is_active(time)
    }
}

/// Fixed linear gain.
pub struct Gain<N> {
    pub signal: N,
    pub gain: f32,
}

impl<N> Gain<N> {
    pub fn new(signal: N, gain: f32) -> Self {
        Self { signal, gain }
    }
}

impl<N: GraphNode> GraphNode for Gain<N> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);
        for sample in out.iter_mut() {
            *sample *= self.gain;
        }
    }

    fn is_active(&self, time: f64) -> bool {
        self.gain != 0.0 && self.signal.is_active(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode};

    #[test]
    fn envelope_gates_signal() {
        let ctx = RenderCtx::new(48_000.0, 0.0);
        // Starts at t = 0.01, so the first 480 frames are silent.
        let mut voice = OscNode::sine(440.0).amplify(EnvNode::percussive(0.01, 1.0, 0.001, 0.1));
        let mut buffer = vec![0.0f32; 1_024];
        voice.render_block(&mut buffer, &ctx);

        assert!(buffer[..470].iter().all(|s| s.abs() < 1e-6));
        assert!(buffer[500..].iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn long_blocks_are_split_into_quanta() {
        let ctx = RenderCtx::new(48_000.0, 0.0);
        let mut long = OscNode::sine(200.0).amplify(EnvNode::percussive(0.0, 1.0, 0.001, 0.05));
        let mut short = OscNode::sine(200.0).amplify(EnvNode::percussive(0.0, 1.0, 0.001, 0.05));

        let mut a = vec![0.0f32; 512];
        long.render_block(&mut a, &ctx);

        let mut b = vec![0.0f32; 512];
        for (index, chunk) in b.chunks_mut(RENDER_QUANTUM).enumerate() {
            short.render_block(chunk, &ctx.offset(index * RENDER_QUANTUM));
        }

        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn gain_scales_signal() {
        let ctx = RenderCtx::new(48_000.0, 0.0);
        let mut plain = OscNode::sine(440.0);
        let mut loud = OscNode::sine(440.0).gain(2.0);
        let mut a = vec![0.0f32; 64];
        let mut b = vec![0.0f32; 64];
        plain.render_block(&mut a, &ctx);
        loud.render_block(&mut b, &ctx);
        for (x, y) in a.iter().zip(&b) {
            assert!((x * 2.0 - y).abs() < 1e-6);
        }
    }

    #[test]
    fn amplify_inactive_once_envelope_ends() {
        let voice = OscNode::sine(440.0).amplify(EnvNode::percussive(0.0, 1.0, 0.001, 0.1));
        assert!(voice.is_active(0.05));
        assert!(!voice.is_active(0.2));
    }
}
