use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two nodes in series, passing the output of the first (source)
into the second (effect). This is the fundamental building block for creating
signal processing chains like: oscillator → shaper → filter.

How It Works:
-------------
1. Render the source into the output buffer
2. Pass that buffer through the effect (in-place processing)

  Source renders:  [0.5, 0.8, -0.3, 0.9, ...]
  Effect processes in-place (e.g., filter)
  Final output:    [0.4, 0.6, -0.2, 0.7, ...]  (filtered result)

This is different from Amplify (which multiplies) or Mix (which layers).
Through passes audio through a processor that transforms it.

Common Use Cases:
-----------------

1. Subtractive Synthesis Chain:
   The classic synth signal path.

     let tom = OscNode::triangle_at(pitch)
         .through(FilterNode::lowpass_at(cutoff))
         .amplify(EnvNode::percussive(start, peak, 0.002, decay));

   - Triangle → filter (shape tone) → envelope (shape volume)

2. Adding Drive:
   Shape first, then filter the new harmonics.

     let kick = body
         .through(ShaperNode::kick_drive(30.0))
         .through(FilterNode::lowpass(3_000.0));

   - Square the sine off, then soften the edges

3. Multi-stage Filtering:
   Stack filters for steeper rolloff or complex EQ.

     let metal = squares
         .through(FilterNode::highpass(8_000.0))
         .through(FilterNode::bandpass(7_500.0));

   - Highpass then bandpass, the 808 hat's two-stage filter

Through vs Amplify vs Mix:
--------------------------
- Through: Serial processing (source → effect → output)
- Amplify: Multiplication (signal × modulator)
- Mix:     Parallel layering (A + B)

Signal Flow Diagram:
--------------------
  Through: [Source] ──→ [Effect] ──→ output

  Amplify: [Signal] ──┬──→ (×) ──→ output
           [Mod]    ──┘

  Mix:     [A] ──────┬──→ (+) ──→ output
           [B] ──────┘

Choose Through when audio flows from one processor to the next.
*/

pub struct Through<S, F> {
    source: S,
    filter: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, filter: F) -> Self {
        Self { source, filter }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.filter.render_block(out, ctx);
    }

    fn is_active(&self, time: f64) -> bool {
        self.source.is_active(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode,
    };

    fn ctx() -> RenderCtx {
        RenderCtx::new(48_000.0, 0.0)
    }

    #[test]
    fn renders_source_then_filter() {
        let mut node = OscNode::sine(440.0).through(FilterNode::highpass(5_000.0));
        let mut buffer = vec![1.0; 1_024];
        node.render_block(&mut buffer, &ctx());

        let peak = buffer[512..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak < 0.05, "highpass should remove a 440 Hz sine, got {peak}");
    }

    #[test]
    fn follows_source_activity() {
        let node = OscNode::sine(440.0)
            .amplify(EnvNode::percussive(0.0, 1.0, 0.001, 0.1))
            .through(FilterNode::lowpass(2_000.0));

        assert!(node.is_active(0.05));
        assert!(!node.is_active(0.5));
    }
}
