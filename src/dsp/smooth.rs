//! One-pole parameter smoothing.
//!
//! Jumping a parameter like filter cutoff from one block to the next produces
//! "zipper noise": an audible click at every step. A one-pole lowpass on the
//! parameter itself turns each step into a short exponential glide:
//!
//!   value = target + (value - target) * coeff
//!   coeff = exp(-1 / (time * sample_rate))
//!
//! After `time` seconds the remaining distance is e^-1 ≈ 37% of the step,
//! after 5× `time` it is below 1%.

/// Per-sample coefficient for a one-pole glide with the given time constant.
#[inline]
pub fn one_pole_coeff(time_secs: f32, sample_rate: f32) -> f32 {
    let samples = (time_secs * sample_rate).max(1.0);
    (-1.0 / samples).exp()
}

#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    value: f32,
    target: f32,
    coeff: f32,
}

impl OnePole {
    pub fn new(initial: f32, time_secs: f32, sample_rate: f32) -> Self {
        Self {
            value: initial,
            target: initial,
            coeff: one_pole_coeff(time_secs, sample_rate),
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump straight to the target, skipping the glide.
    pub fn snap(&mut self) {
        self.value = self.target;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        self.value = self.target + (self.value - self.target) * self.coeff;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn coeff(&self) -> f32 {
        self.coeff
    }
}
