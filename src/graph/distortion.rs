use crate::dsp::distortion::{hard_clip, kick_drive, soft_clip};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Voice Waveshapers
=================

Per-hit distortion used inside drum voices. Unlike the bus distortion, which
reads a sampled curve, these evaluate closed-form shapers so building a voice
never allocates a table.

Shapes
------

KickDrive:  (π + k)·x / (π + k·|x|)
            The 909 kick's drive. k = 0 is clean, large k squares the sine
            off into a thumping near-square while keeping ±1 at ±1.

Clip:       clamp(x · drive, -1, 1)
            The 909 snare's body: square + triangle pushed into clipping.

Saturate:   tanh(x · drive)
            Gentle warmth, used on the 909 tom.

Example usage:

  let body = OscNode::triangle_at(pitch)
      .through(ShaperNode::kick_drive(5.0 + tone * 50.0));
*/

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShaperMode {
    KickDrive(f32),
    Clip(f32),
    Saturate(f32),
}

pub struct ShaperNode {
    mode: ShaperMode,
}

impl ShaperNode {
    pub fn new(mode: ShaperMode) -> Self {
        Self { mode }
    }

    pub fn kick_drive(k: f32) -> Self {
        Self::new(ShaperMode::KickDrive(k.max(0.0)))
    }

    pub fn clip(drive: f32) -> Self {
        Self::new(ShaperMode::Clip(drive.max(0.0)))
    }

    pub fn saturate(drive: f32) -> Self {
        Self::new(ShaperMode::Saturate(drive.max(0.0)))
    }
}

impl GraphNode for ShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        match self.mode {
            ShaperMode::KickDrive(k) => out.iter_mut().for_each(|s| *s = kick_drive(*s, k)),
            ShaperMode::Clip(drive) => out.iter_mut().for_each(|s| *s = hard_clip(*s, drive)),
            ShaperMode::Saturate(drive) => out.iter_mut().for_each(|s| *s = soft_clip(*s, drive)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ctx() -> RenderCtx {
        RenderCtx::new(48_000.0, 0.0)
    }

    #[test]
    fn test_kick_drive_modifies_signal() {
        let mut node = ShaperNode::kick_drive(30.0);
        let mut buffer = vec![0.2, -0.2, 0.5, -0.5];
        let original = buffer.clone();

        node.render_block(&mut buffer, &test_ctx());

        assert!(buffer.iter().zip(&original).all(|(a, b)| a.abs() > b.abs()));
        assert!(buffer.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_clip_limits_amplitude() {
        let mut node = ShaperNode::clip(3.0);
        let mut buffer = vec![0.5, -0.5, 0.8, -0.8, 0.1];

        node.render_block(&mut buffer, &test_ctx());

        for sample in &buffer {
            assert!(sample.abs() <= 1.0 + 1e-6);
        }
        assert!((buffer[4] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_negative_drive_is_clamped() {
        assert_eq!(ShaperNode::saturate(-2.0).mode, ShaperMode::Saturate(0.0));
    }
}
