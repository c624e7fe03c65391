use smallvec::SmallVec;

use crate::{graph::node::RenderCtx, ENV_FLOOR};

/// Smallest level an exponential ramp passes through.
pub const MIN_RAMP_LEVEL: f32 = 1.0e-9;

/*
Timestamped Parameter Automation
================================

Every drum voice is "fire and forget": the control thread builds it, schedules
every parameter change against the absolute audio clock, and hands it to the
renderer. Nothing talks to the voice afterwards. This module is the piece
that makes that possible - a parameter whose value is a function of absolute
time, described by a short list of events.

Vocabulary
----------

  event       A (time, value, shape) triple. The value is *reached* at `time`.

  set         Jump to `value` at `time` and hold it.

  linear      Ramp in a straight line from the previous event's value/time to
              this event's value/time.

  exponential Ramp along an exponential curve from the previous event. This is
              how acoustic sounds decay and how the 808 pitch drop behaves.


The Shapes
----------

   value
     │ set(1.0, t0)
  1.0├──●╮
     │   ╲  exponential(0.001, t1)     linear ramps are straight lines
     │    ╲_                           between events; exponential ramps are
     │      ╲__                        straight lines on a log scale.
     │         ╲____
  0.0└──────────────●──────→ time
        t0          t1

Between events the value follows the shape of the *next* event. After the last
event the value holds.


The Math: Exponential Ramp
--------------------------

    v(t) = v0 · (v1 / v0) ^ ((t - t0) / (t1 - t0))

Exponential curves cannot cross or touch zero, so both ends are floored at
MIN_RAMP_LEVEL. Envelopes do not ramp to that absolute floor, though: they
ramp to `decay_floor(peak)`, ENV_FLOOR (-80 dB) *below their own peak*, so a
ghost note at velocity 1 decays exactly as far as a full-velocity hit.


Realtime Safety
---------------

The event list is a SmallVec with inline capacity for every voice in the crate
(the clap's rebound envelope is the largest at 15 events), so building and
rendering never touch the heap. Rendering walks a cursor forward because the
audio clock only moves forward.
*/

/// Inline capacity of the event list.
const INLINE_EVENTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Set,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy)]
struct AutomationEvent {
    time: f64,
    value: f32,
    shape: Shape,
}

/// A parameter driven by timestamped events.
#[derive(Debug, Clone)]
pub struct Automation {
    initial: f32,
    events: SmallVec<[AutomationEvent; INLINE_EVENTS]>,
    cursor: usize,
}

impl Automation {
    /// A parameter that holds `initial` until the first event.
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            events: SmallVec::new(),
            cursor: 0,
        }
    }

    /// A parameter that never changes.
    pub fn constant(value: f32) -> Self {
        Self::new(value)
    }

    /// Jump to `value` at `time`.
    pub fn set_value_at(mut self, value: f32, time: f64) -> Self {
        self.push(value, time, Shape::Set);
        self
    }

    /// Ramp linearly from the previous event to `value`, arriving at `time`.
    pub fn linear_ramp_to(mut self, value: f32, time: f64) -> Self {
        self.push(value, time, Shape::Linear);
        self
    }

    /// Ramp exponentially from the previous event to `value`, arriving at `time`.
    pub fn exponential_ramp_to(mut self, value: f32, time: f64) -> Self {
        self.push(value, time, Shape::Exponential);
        self
    }

    fn push(&mut self, value: f32, time: f64, shape: Shape) {
        let value = if shape == Shape::Exponential && value >= 0.0 {
            value.max(MIN_RAMP_LEVEL)
        } else {
            value
        };
        // Keep events sorted; equal timestamps keep insertion order.
        let index = self.events.partition_point(|event| event.time <= time);
        self.events.insert(index, AutomationEvent { time, value, shape });
        self.cursor = 0;
    }

    /// Time of the last scheduled event, if any.
    pub fn end_time(&self) -> Option<f64> {
        self.events.last().map(|event| event.time)
    }

    /// Largest magnitude the curve ever takes.
    pub fn peak(&self) -> f32 {
        self.events
            .iter()
            .map(|event| event.value.abs())
            .fold(self.initial.abs(), f32::max)
    }

    /// Value the parameter settles on after its last event.
    pub fn final_value(&self) -> f32 {
        self.events.last().map_or(self.initial, |event| event.value)
    }

    /// Evaluate the curve at absolute time `t` without touching the cursor.
    pub fn value_at(&self, t: f64) -> f32 {
        let index = self.events.partition_point(|event| event.time <= t);
        self.evaluate(index, t)
    }

    /// Evaluate at `t`, assuming `t` never decreases between calls.
    #[inline]
    pub fn next_value(&mut self, t: f64) -> f32 {
        if self.cursor > 0 && self.events[self.cursor - 1].time > t {
            self.cursor = 0;
        }
        while self.cursor < self.events.len() && self.events[self.cursor].time <= t {
            self.cursor += 1;
        }
        self.evaluate(self.cursor, t)
    }

    /// `passed` is the number of events at or before `t`.
    fn evaluate(&self, passed: usize, t: f64) -> f32 {
        let Some(next) = self.events.get(passed) else {
            return self.final_value();
        };

        if passed == 0 {
            // A ramp with nothing before it behaves like a jump at its own time.
            return self.initial;
        }

        let prev = self.events[passed - 1];
        match next.shape {
            Shape::Set => prev.value,
            Shape::Linear => {
                let progress = ramp_progress(prev.time, next.time, t);
                prev.value + (next.value - prev.value) * progress
            }
            Shape::Exponential => {
                let progress = ramp_progress(prev.time, next.time, t);
                exponential_interpolate(prev.value, next.value, progress)
            }
        }
    }

    /// Fill `out` with the curve sampled at every frame of the block.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.next_value(ctx.frame_time(i));
        }
    }
}

/// Level an envelope peaking at `peak` decays to: ENV_FLOOR below the peak.
#[inline]
pub fn decay_floor(peak: f32) -> f32 {
    (peak.abs() * ENV_FLOOR).max(MIN_RAMP_LEVEL)
}

#[inline]
fn ramp_progress(start: f64, end: f64, t: f64) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return 1.0;
    }
    ((t - start) / span).clamp(0.0, 1.0) as f32
}

#[inline]
fn exponential_interpolate(from: f32, to: f32, progress: f32) -> f32 {
    // Exponential curves need same-signed, non-zero endpoints.
    if from < 0.0 || to < 0.0 {
        return from + (to - from) * progress;
    }
    let from = from.max(MIN_RAMP_LEVEL);
    let to = to.max(MIN_RAMP_LEVEL);
    from * (to / from).powf(progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_initial_value_before_first_event() {
        let curve = Automation::new(0.25).set_value_at(1.0, 1.0);
        assert_eq!(curve.value_at(0.5), 0.25);
        assert_eq!(curve.value_at(1.0), 1.0);
        assert_eq!(curve.value_at(5.0), 1.0);
    }

    #[test]
    fn linear_ramp_hits_midpoint() {
        let curve = Automation::new(0.0)
            .set_value_at(0.0, 1.0)
            .linear_ramp_to(1.0, 2.0);
        assert!((curve.value_at(1.5) - 0.5).abs() < 1e-6);
        assert!((curve.value_at(2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn exponential_ramp_is_geometric() {
        let curve = Automation::new(0.0)
            .set_value_at(160.0, 0.0)
            .exponential_ramp_to(40.0, 1.0);
        // Geometric midpoint of 160 and 40 is 80.
        assert!((curve.value_at(0.5) - 80.0).abs() < 1e-3);
    }

    #[test]
    fn exponential_ramp_to_zero_lands_on_floor() {
        let curve = Automation::new(0.0)
            .set_value_at(1.0, 0.0)
            .exponential_ramp_to(0.0, 1.0);
        assert_eq!(curve.value_at(1.0), MIN_RAMP_LEVEL);
        assert!(curve.value_at(0.99) < 0.01);
    }

    #[test]
    fn decay_floor_follows_peak() {
        assert_eq!(decay_floor(1.0), ENV_FLOOR);
        assert!((decay_floor(1.0 / 127.0) - ENV_FLOOR / 127.0).abs() < 1e-12);
        assert_eq!(decay_floor(0.0), MIN_RAMP_LEVEL);
        assert_eq!(decay_floor(-0.5), decay_floor(0.5));
    }

    #[test]
    fn peak_is_largest_magnitude() {
        let curve = Automation::new(0.0)
            .set_value_at(ENV_FLOOR, 0.0)
            .exponential_ramp_to(0.3, 0.01)
            .exponential_ramp_to(ENV_FLOOR, 0.5);
        assert_eq!(curve.peak(), 0.3);
        assert_eq!(Automation::constant(-2.0).peak(), 2.0);
    }

    #[test]
    fn events_are_sorted_regardless_of_insertion_order() {
        let curve = Automation::new(0.0)
            .linear_ramp_to(1.0, 2.0)
            .set_value_at(0.0, 1.0);
        assert!((curve.value_at(1.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn cursor_matches_random_access() {
        let mut curve = Automation::new(0.0)
            .set_value_at(ENV_FLOOR, 0.0)
            .linear_ramp_to(1.0, 0.005)
            .exponential_ramp_to(ENV_FLOOR, 0.2);
        let reference = curve.clone();
        for i in 0..400 {
            let t = i as f64 * 0.001;
            assert!((curve.next_value(t) - reference.value_at(t)).abs() < 1e-6);
        }
    }

    #[test]
    fn render_fills_block_from_absolute_time() {
        let mut curve = Automation::new(0.0)
            .set_value_at(0.0, 1.0)
            .linear_ramp_to(1.0, 1.004);
        let ctx = RenderCtx::new(1_000.0, 1.0);
        let mut buffer = [0.0f32; 5];
        curve.render(&mut buffer, &ctx);
        for (i, value) in buffer.iter().enumerate() {
            assert!((value - i as f32 * 0.25).abs() < 1e-4);
        }
    }
}
