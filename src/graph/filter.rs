use crate::{
    dsp::{
        automation::Automation,
        filter::{FilterType, SVFilter},
    },
    graph::node::{GraphNode, RenderCtx},
};

/*
State-Variable Filter (SVF)
===========================

A filter removes or attenuates certain frequencies from a signal. In subtractive
synthesis, you start with a harmonically rich waveform (like a sawtooth) and
filter out frequencies to sculpt the timbre. This is why it's called
"subtractive" - you're subtracting harmonics.

Filter Types:
-------------

Lowpass (LP): Passes frequencies BELOW the cutoff, attenuates above.
  - The most common synth filter
  - Higher cutoff = brighter sound
  - Lower cutoff = darker, muffled sound
  - Use: Kick and tom bodies, taming clicks

Highpass (HP): Passes frequencies ABOVE the cutoff, attenuates below.
  - Removes low-end rumble and muddiness
  - Creates thin, airy sounds
  - Use: Hi-hats, snare noise, claps

Bandpass (BP): Passes frequencies AROUND the cutoff, attenuates both sides.
  - Creates a focused, "telephone" quality
  - Sweeping bandpass = classic wah effect
  - Use: 909 snare noise, clap "crack", cymbal color

Notch: Attenuates frequencies AT the cutoff, passes everything else.
  - Creates a "hollow" sound at the notch frequency
  - Opposite of bandpass
  - Use: Removing a ringing partial

Parameters:
-----------

Cutoff (Hz): The frequency where the filter takes effect.
  - 20 Hz:     Barely open (very dark)
  - 200 Hz:    Muffled, like through a wall
  - 1000 Hz:   Warm, round bass
  - 5000 Hz:   Present, clear
  - 20000 Hz:  Fully open (no filtering)

Resonance (Q): Emphasis at the cutoff frequency.
  - 0.707: Flat (Butterworth), no peak
  - 2-5:   Audible peak, tonal noise
  - 25:    Rings like a tuned circuit; a noise burst becomes a pitched "bonk"

Why "State-Variable"?
---------------------
The SVF is a specific filter topology that's popular in synthesizers because:
1. It provides LP, HP, BP, and Notch outputs simultaneously
2. It's stable and well-behaved at high resonance
3. Cutoff and resonance are independently controllable
4. It uses a "TPT" (topology-preserving transform) for digital accuracy

Cutoff Is Automated
-------------------

Drum filters sweep with the hit: the 909 tom's lowpass closes from 8x to 2x
its base pitch over 200 ms. The cutoff is therefore an `Automation` curve on
the absolute clock, evaluated every sample. Q is fixed per hit.

Example usage:
  // Hat: highpass into a resonant bandpass
  let metal = source
      .through(FilterNode::highpass(8_500.0))
      .through(FilterNode::bandpass(7_500.0).with_q(1.5));

  // Tom: closing lowpass
  let cutoff = Automation::new(8.0 * base)
      .set_value_at(8.0 * base, start)
      .exponential_ramp_to(2.0 * base, start + 0.2);
  let tom = body.through(FilterNode::lowpass_at(cutoff));
*/

pub struct FilterNode {
    filter: SVFilter,
    cutoff: Automation,
}

impl FilterNode {
    pub fn new(filter_type: FilterType, cutoff: Automation) -> Self {
        Self {
            filter: SVFilter::new(filter_type),
            cutoff,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::lowpass_at(Automation::constant(cutoff_hz))
    }

    pub fn lowpass_at(cutoff: Automation) -> Self {
        Self::new(FilterType::LowPass, cutoff)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, Automation::constant(cutoff_hz))
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::bandpass_at(Automation::constant(cutoff_hz))
    }

    pub fn bandpass_at(cutoff: Automation) -> Self {
        Self::new(FilterType::BandPass, cutoff)
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.filter.set_q(q);
        self
    }

    pub fn q(&self) -> f32 {
        self.filter.q
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let cutoff = self.cutoff.next_value(ctx.frame_time(i));
            *sample = self.filter.process(*sample, cutoff, ctx.sample_rate);
        }
    }
}
