/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Absolute audio-clock time of the first frame in the block (seconds)
///
/// Voices are scheduled against the absolute clock, so every node derives the
/// time of frame `i` as `time + i / sample_rate` and evaluates its automation
/// there. Nothing is relative to "note on".
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Context for the block starting at `frame` frames since the clock started.
    pub fn at_frame(sample_rate: f32, frame: u64) -> Self {
        Self {
            sample_rate,
            time: frame as f64 / sample_rate as f64,
        }
    }

    /// Absolute time of frame `index` within the block.
    #[inline]
    pub fn frame_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Context for the sub-block starting `frames` into this block.
    #[inline]
    pub fn offset(&self, frames: usize) -> Self {
        Self {
            sample_rate: self.sample_rate,
            time: self.frame_time(frames),
        }
    }

    /// Duration of one frame in seconds.
    #[inline]
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.sample_rate as f64
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes render blocks of mono audio. Sources overwrite `out`; processors
/// transform it in place.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node can still produce sound at or after `time`
    ///
    /// Used by the renderer to know when a voice slot can be freed.
    fn is_active(&self, _time: f64) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn is_active(&self, time: f64) -> bool {
        (**self).is_active(time)
    }
}
