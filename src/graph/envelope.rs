use crate::{
    dsp::automation::{decay_floor, Automation},
    graph::node::{GraphNode, RenderCtx},
};

/// Renders an automation curve as a control signal.
///
/// Used as the modulator of `.amplify()` for amplitude envelopes, and as an
/// FM index. Once the curve has passed its last event and settled at the
/// decay floor of its own peak, the node reports itself inactive.
#[derive(Debug, Clone)]
pub struct EnvNode {
    curve: Automation,
    floor: f32,
}

impl EnvNode {
    pub fn new(curve: Automation) -> Self {
        let floor = decay_floor(curve.peak());
        Self { curve, floor }
    }

    /// Classic percussive shape: silent until `start`, exponential attack to
    /// `peak` over `attack` seconds, exponential decay to
    /// [`decay_floor`]`(peak)` at `start + decay`.
    pub fn percussive(start: f64, peak: f32, attack: f32, decay: f32) -> Self {
        Self::new(percussive_curve(start, peak, attack, decay))
    }

    pub fn curve(&self) -> &Automation {
        &self.curve
    }
}

/// The curve behind [`EnvNode::percussive`].
pub fn percussive_curve(start: f64, peak: f32, attack: f32, decay: f32) -> Automation {
    let attack_end = start + attack.max(crate::MIN_TIME) as f64;
    let end = (start + decay as f64).max(attack_end);
    let floor = decay_floor(peak);
    Automation::new(0.0)
        .set_value_at(floor, start)
        .exponential_ramp_to(peak, attack_end)
        .exponential_ramp_to(floor, end)
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.curve.render(out, ctx);
    }

    fn is_active(&self, time: f64) -> bool {
        match self.curve.end_time() {
            Some(end) if time < end => true,
            _ => self.curve.final_value().abs() > self.floor,
        }
    }
}
