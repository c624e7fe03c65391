use crate::{
    dsp::{distortion::ShaperCurve, reverb::Convolver},
    engine::params::{DelayCoefficients, DistortionCoefficients, ReverbCoefficients},
    voices::DrumVoice,
};

/// Control → render traffic. Everything heap-backed is built before it is
/// pushed; the renderer only moves it into place.
#[derive(Debug)]
pub enum RenderCommand {
    Voice(DrumVoice),
    Delay(DelayCoefficients),
    Reverb(ReverbCoefficients),
    Impulse(Box<Convolver>),
    Distortion(DistortionCoefficients),
    Curve(Box<ShaperCurve>),
    MasterGain(f32),
}

/// Render → control traffic: allocations the audio thread is done with.
#[derive(Debug)]
pub enum Retired {
    Voice(DrumVoice),
    Impulse(Box<Convolver>),
    Curve(Box<ShaperCurve>),
}
