//! Signal summing primitives.

/*
Signal Summing
==============

Mixing combines signals by ADDING them together, optionally with weights.
This is the additive counterpart to multiplication (amplify).

Every voice that is sounding writes into one shared bus input; the bus then
adds each effect return to the dry signal at its own wet gain:

    bus_in  = Σ voice_i
    out     = bus_in + delay · delay_wet + reverb · reverb_wet + drive · drive_wet

The sends are parallel, so the dry level never drops as an effect comes in.
That is the difference from a wet/dry crossfade, where raising the wet level
lowers the dry.


Clipping Risk
-------------

Sums can exceed [-1.0, +1.0]:

    Kick:   [ 0.9,  0.7, -0.5]
    Snare:  [ 0.6,  0.8,  0.2]
    Sum:    [ 1.5,  1.5, -0.3]  ← exceeds ±1.0!

Nothing here protects against that. The master chain (gain, compressor,
limiter) runs after the sum and owns the final level.
*/

/// Add signal B into signal A in-place (summing).
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Add `b × gain` into `a` in-place.
#[inline]
pub fn sum_scaled_in_place(a: &mut [f32], b: &[f32], gain: f32) {
    debug_assert_eq!(a.len(), b.len());

    if gain == 0.0 {
        return;
    }
    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb * gain;
    }
}
