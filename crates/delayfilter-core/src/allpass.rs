//! First-order allpass stage for phasers.
//!
//! Difference equation (coefficient supplied per sample so an LFO can sweep it):
//!
//! ```text
//! y[n] = x[n-1] + a * (x[n] - y[n-1])
//! ```

use core::f64::consts::PI;
use libm::tan;

use crate::math::flush_denormal;

/// Coefficient that places the allpass 90° point at `frequency`.
///
/// `a = (1 - tan(π·f/fs)) / (1 + tan(π·f/fs))`. Computed in `f64` because
/// `tan` is steep near Nyquist.
pub fn allpass_coefficient(frequency: f64, sample_rate: f64) -> f32 {
    let t = tan(PI * frequency / sample_rate);
    ((1.0 - t) / (1.0 + t)) as f32
}

/// First-order allpass memory: previous input and previous output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOrderAllpass {
    /// Previous input sample
    x1: f32,
    /// Previous output sample
    y1: f32,
}

impl FirstOrderAllpass {
    /// Create a stage with cleared memory.
    pub const fn new() -> Self {
        Self { x1: 0.0, y1: 0.0 }
    }

    /// Process a single sample with coefficient `a`.
    #[inline]
    pub fn process(&mut self, input: f32, a: f32) -> f32 {
        let output = self.x1 + a * (input - self.y1);
        self.x1 = input;
        self.y1 = flush_denormal(output);
        output
    }

    /// Clear filter state.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
