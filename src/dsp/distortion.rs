//! Output saturation
//!
//! The engine sums up to two dozen voices into one signal. Even after the mix
//! headroom gain that sum can exceed [-1, 1], and a DAC hard-clips anything
//! outside that range into harsh odd harmonics.
//!
//! Soft clipping bends the signal smoothly towards the rails instead:
//!
//!   f(x) = tanh(x)
//!
//!   - |x| < 0.3:  f(x) ≈ x, quiet mixes pass through untouched
//!   - |x| ≈ 1:    gentle compression, tanh(1) ≈ 0.76
//!   - |x| → ∞:    output approaches ±1 but never reaches it
//!
//! The result is always strictly inside [-1, 1] for finite input.

/// tanh soft clipper.
#[inline]
pub fn soft_clip(sample: f32) -> f32 {
    sample.tanh()
}

/// Apply soft clipping to an entire buffer in place.
pub fn soft_clip_buffer(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = soft_clip(*sample);
    }
}
