use crate::{graph::node::RenderCtx, voices::DrumVoice};

/// Fixed set of voice slots, allocated once.
///
/// A new voice takes the first free slot. When every slot is busy the voice
/// that would stop soonest is displaced; it is the closest to silence.
pub struct VoicePool {
    slots: Vec<Option<DrumVoice>>,
}

impl VoicePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity.max(1)).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Place `voice`, returning the voice it displaced, if any.
    pub fn insert(&mut self, voice: DrumVoice) -> Option<DrumVoice> {
        // First pass: free slot
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(voice);
            return None;
        }

        // Second pass: steal the voice closest to its stop time
        let steal_idx = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|v| (idx, v.stop())))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx)?;

        self.slots[steal_idx].replace(voice)
    }

    /// Sum every sounding voice into `out`, handing finished ones to `retire`.
    pub fn render(
        &mut self,
        out: &mut [f32],
        scratch: &mut [f32],
        ctx: &RenderCtx,
        mut retire: impl FnMut(DrumVoice),
    ) {
        let block_end = ctx.frame_time(out.len());

        for slot in &mut self.slots {
            let Some(voice) = slot else {
                continue;
            };
            // Scheduled past this block; nothing to render yet.
            if voice.start() >= block_end {
                continue;
            }
            voice.render_into(out, scratch, ctx);

            if voice.is_finished(block_end) {
                if let Some(done) = slot.take() {
                    retire(done);
                }
            }
        }
    }

    /// Remove every voice.
    pub fn drain(&mut self, mut retire: impl FnMut(DrumVoice)) {
        for slot in &mut self.slots {
            if let Some(voice) = slot.take() {
                retire(voice);
            }
        }
    }
}
