//! The shared send-effects bus every voice is summed into.

/*
                 ┌─ delay filter ─ delay line ─┬──────────────── × delay wet ──┐
                 │        ▲                    │                                │
                 │        └──── × feedback ────┘                                │
                 │                                                              │
   voices ─ Σ ───┼─ predelay ─ convolver ─ damping (L, R) ───── × reverb wet ───┤
                 │                                                              ├─ × master ─ compressor ─ limiter ─ out (L, R)
                 ├─ 60 Hz HPF ─ shaper curve ─ tone LPF ──── × distortion wet ──┤
                 │                                                              │
                 └─ dry ────────────────────────────────────────────────────────┘

The voice sum is mono. Only the reverb return is stereo, so the delay,
distortion and dry paths land equally on both channels and the convolver's
two impulse channels provide the width.

Every continuous setting (delay time, feedback, cutoffs, wet gains, master
gain) is a target that the bus slews toward with a 10 ms one-pole, so changes
arriving between blocks never step the signal. The convolver and the shaper
table are swapped whole; the previous ones are handed back to the caller so
they can be dropped off the audio thread.

The convolver adds `PARTITION_SIZE` frames of latency on top of the predelay.
*/

use crate::{
    dsp::{
        delay::DelayLine,
        distortion::ShaperCurve,
        dynamics::{Compressor, CompressorSettings, Limiter},
        filter::{FilterType, OnePole, SVFilter},
        reverb::{Convolver, ImpulseResponse, PARTITION_SIZE},
    },
    engine::params::{
        volume_gain, BusParams, DelayCoefficients, DistortionCoefficients, ReverbCoefficients,
        MAX_DELAY_SECONDS, MAX_PREDELAY_SECONDS,
    },
};

/// Slew time for every continuous bus setting.
pub const SMOOTHING_SECONDS: f32 = 0.01;
/// Corner of the highpass ahead of the shaper.
pub const PRE_FILTER_HZ: f32 = 60.0;

/// A setting slewing toward its target.
#[derive(Debug, Clone, Copy)]
struct Smoothed {
    target: f32,
    pole: OnePole,
}

impl Smoothed {
    fn new(value: f32) -> Self {
        let mut pole = OnePole::default();
        pole.reset(value);
        Self { target: value, pole }
    }

    fn set(&mut self, target: f32) {
        self.target = target;
    }

    #[inline]
    fn next(&mut self, coefficient: f32) -> f32 {
        self.pole.next(self.target, coefficient)
    }
}

struct DelaySend {
    line: DelayLine,
    filter: SVFilter,
    time: Smoothed,
    feedback: Smoothed,
    cutoff_hz: Smoothed,
    wet: Smoothed,
}

impl DelaySend {
    fn new(coefficients: DelayCoefficients, sample_rate: f32) -> Self {
        Self {
            line: DelayLine::with_duration(MAX_DELAY_SECONDS, sample_rate),
            filter: SVFilter::new(FilterType::LowPass),
            time: Smoothed::new(coefficients.time),
            feedback: Smoothed::new(coefficients.feedback),
            cutoff_hz: Smoothed::new(coefficients.cutoff_hz),
            wet: Smoothed::new(coefficients.wet),
        }
    }

    fn set(&mut self, coefficients: DelayCoefficients) {
        self.time.set(coefficients.time);
        self.feedback.set(coefficients.feedback);
        self.cutoff_hz.set(coefficients.cutoff_hz);
        self.wet.set(coefficients.wet);
    }

    #[inline]
    fn next(&mut self, input: f32, smoothing: f32, sample_rate: f32) -> f32 {
        let delay = self.time.next(smoothing) * sample_rate;
        let feedback = self.feedback.next(smoothing);
        let cutoff = self.cutoff_hz.next(smoothing);

        let delayed = self.line.read(delay);
        let filtered = self.filter.process(input + delayed * feedback, cutoff, sample_rate);
        self.line.write(filtered);

        delayed * self.wet.next(smoothing)
    }
}

struct ReverbSend {
    predelay_line: DelayLine,
    predelay: Smoothed,
    convolver: Box<Convolver>,
    damping: [SVFilter; 2],
    damping_hz: Smoothed,
    wet: Smoothed,
}

impl ReverbSend {
    fn new(coefficients: ReverbCoefficients, convolver: Box<Convolver>, sample_rate: f32) -> Self {
        Self {
            predelay_line: DelayLine::with_duration(MAX_PREDELAY_SECONDS, sample_rate),
            predelay: Smoothed::new(coefficients.predelay),
            convolver,
            damping: [SVFilter::new(FilterType::LowPass), SVFilter::new(FilterType::LowPass)],
            damping_hz: Smoothed::new(coefficients.damping_hz),
            wet: Smoothed::new(coefficients.wet),
        }
    }

    fn set(&mut self, coefficients: ReverbCoefficients) {
        self.predelay.set(coefficients.predelay);
        self.damping_hz.set(coefficients.damping_hz);
        self.wet.set(coefficients.wet);
    }

    #[inline]
    fn next(&mut self, input: f32, smoothing: f32, sample_rate: f32) -> (f32, f32) {
        let predelay = self.predelay.next(smoothing) * sample_rate;
        let delayed = self.predelay_line.next_sample(input, predelay);
        let (left, right) = self.convolver.process(delayed);

        let cutoff = self.damping_hz.next(smoothing);
        let left = self.damping[0].process(left, cutoff, sample_rate);
        let right = self.damping[1].process(right, cutoff, sample_rate);

        let wet = self.wet.next(smoothing);
        (left * wet, right * wet)
    }
}

struct DistortionSend {
    pre_filter: SVFilter,
    curve: Box<ShaperCurve>,
    post_filter: SVFilter,
    tone_hz: Smoothed,
    wet: Smoothed,
}

impl DistortionSend {
    fn new(coefficients: DistortionCoefficients, curve: Box<ShaperCurve>) -> Self {
        Self {
            pre_filter: SVFilter::highpass(PRE_FILTER_HZ),
            curve,
            post_filter: SVFilter::new(FilterType::LowPass),
            tone_hz: Smoothed::new(coefficients.tone_hz),
            wet: Smoothed::new(coefficients.wet),
        }
    }

    fn set(&mut self, coefficients: DistortionCoefficients) {
        self.tone_hz.set(coefficients.tone_hz);
        self.wet.set(coefficients.wet);
    }

    #[inline]
    fn next(&mut self, input: f32, smoothing: f32, sample_rate: f32) -> f32 {
        let cleaned = self.pre_filter.process(input, PRE_FILTER_HZ, sample_rate);
        let shaped = self.curve.apply(cleaned);
        let tone = self.tone_hz.next(smoothing);
        self.post_filter.process(shaped, tone, sample_rate) * self.wet.next(smoothing)
    }
}

struct MasterSection {
    gain: Smoothed,
    compressor: [Compressor; 2],
    limiter: [Limiter; 2],
}

impl MasterSection {
    fn new(gain: f32, sample_rate: f32) -> Self {
        let settings = CompressorSettings::default();
        Self {
            gain: Smoothed::new(gain),
            compressor: [
                Compressor::new(settings, sample_rate),
                Compressor::new(settings, sample_rate),
            ],
            limiter: [Limiter::new(sample_rate), Limiter::new(sample_rate)],
        }
    }

    #[inline]
    fn next(&mut self, left: f32, right: f32, smoothing: f32) -> (f32, f32) {
        let gain = self.gain.next(smoothing);
        let left = self.compressor[0].next_sample(left * gain);
        let right = self.compressor[1].next_sample(right * gain);
        (self.limiter[0].next_sample(left), self.limiter[1].next_sample(right))
    }
}

/// Named stages of the bus, allocated once.
pub struct EffectBus {
    sample_rate: f32,
    smoothing: f32,
    delay: DelaySend,
    reverb: ReverbSend,
    distortion: DistortionSend,
    master: MasterSection,
}

impl EffectBus {
    /// Build the bus with its impulse response and shaper table for `params`.
    pub fn new(params: &BusParams, sample_rate: f32, seed: u64) -> Self {
        let response = ImpulseResponse::synthesize(params.reverb.size, sample_rate, seed);
        let convolver = Box::new(Convolver::new(&response, PARTITION_SIZE));
        let curve = Box::new(ShaperCurve::new(params.distortion.character, params.distortion.drive));

        Self {
            sample_rate,
            smoothing: OnePole::coefficient(SMOOTHING_SECONDS, sample_rate),
            delay: DelaySend::new(params.delay.coefficients(), sample_rate),
            reverb: ReverbSend::new(params.reverb.coefficients(), convolver, sample_rate),
            distortion: DistortionSend::new(params.distortion.coefficients(), curve),
            master: MasterSection::new(volume_gain(params.volume), sample_rate),
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn set_delay(&mut self, coefficients: DelayCoefficients) {
        self.delay.set(coefficients);
    }

    pub fn set_reverb(&mut self, coefficients: ReverbCoefficients) {
        self.reverb.set(coefficients);
    }

    pub fn set_distortion(&mut self, coefficients: DistortionCoefficients) {
        self.distortion.set(coefficients);
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        self.master.gain.set(gain);
    }

    /// Swap in a new convolver, returning the old one.
    pub fn replace_convolver(&mut self, convolver: Box<Convolver>) -> Box<Convolver> {
        std::mem::replace(&mut self.reverb.convolver, convolver)
    }

    /// Swap in a new shaper table, returning the old one.
    pub fn replace_curve(&mut self, curve: Box<ShaperCurve>) -> Box<ShaperCurve> {
        std::mem::replace(&mut self.distortion.curve, curve)
    }

    /// Run the mono voice sum through the bus into a stereo pair.
    pub fn process(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        let smoothing = self.smoothing;
        let sample_rate = self.sample_rate;

        for ((&dry, l), r) in input.iter().zip(left.iter_mut()).zip(right.iter_mut()) {
            let delayed = self.delay.next(dry, smoothing, sample_rate);
            let (room_l, room_r) = self.reverb.next(dry, smoothing, sample_rate);
            let driven = self.distortion.next(dry, smoothing, sample_rate);

            let center = dry + delayed + driven;
            let (out_l, out_r) = self.master.next(center + room_l, center + room_r, smoothing);
            *l = out_l;
            *r = out_r;
        }
    }
}
