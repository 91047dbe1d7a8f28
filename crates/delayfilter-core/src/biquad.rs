//! Second-order IIR section for the engine's IIR mode.
//!
//! Low-pass, high-pass and band-pass designs follow the RBJ Audio EQ
//! Cookbook. Design functions return the raw `(b0, b1, b2, a0, a1, a2)`
//! sextuple; [`BiquadCoefficients::from_raw`] divides through by `a0`.

use core::f32::consts::TAU;
use libm::{cosf, sinf};

use crate::math::flush_denormal;

/// Raw cookbook output: `(b0, b1, b2, a0, a1, a2)`.
pub type RawCoefficients = (f32, f32, f32, f32, f32, f32);

/// Normalized biquad coefficients (`a0 == 1`).
///
/// ```text
/// H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Gain on the current input.
    pub b0: f32,
    /// Gain on the input one sample back.
    pub b1: f32,
    /// Gain on the input two samples back.
    pub b2: f32,
    /// Pole term on the previous output.
    pub a1: f32,
    /// Pole term on the output two samples back.
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Passthrough: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalizes a raw cookbook sextuple by its `a0`.
    pub fn from_raw((b0, b1, b2, a0, a1, a2): RawCoefficients) -> Self {
        let scale = a0.recip();
        Self {
            b0: b0 * scale,
            b1: b1 * scale,
            b2: b2 * scale,
            a1: a1 * scale,
            a2: a2 * scale,
        }
    }

    /// Returns `true` if both poles lie strictly inside the unit circle.
    ///
    /// Stability triangle for `1 + a1 z^-1 + a2 z^-2`:
    /// `|a2| < 1` and `|a1| < 1 + a2`.
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One biquad section with Direct Form I memory.
///
/// Installing new coefficients keeps the memory, so per-block redesign
/// does not click.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    /// `[x[n-1], x[n-2]]`
    inputs: [f32; 2],
    /// `[y[n-1], y[n-2]]`
    outputs: [f32; 2],
}

impl Biquad {
    /// Passthrough section with zeroed memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an already-normalized coefficient set.
    #[inline]
    pub fn set_normalized(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Currently installed coefficients.
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let BiquadCoefficients { b0, b1, b2, a1, a2 } = self.coeffs;
        let [x1, x2] = self.inputs;
        let [y1, y2] = self.outputs;

        let y = b0 * input + b1 * x1 + b2 * x2 - a1 * y1 - a2 * y2;

        self.inputs = [input, x1];
        self.outputs = [flush_denormal(y), y1];
        y
    }

    /// Zeroes the memory. Coefficients are kept.
    pub fn clear(&mut self) {
        self.inputs = [0.0; 2];
        self.outputs = [0.0; 2];
    }
}

/// Shared cookbook intermediates for one design point.
struct Rbj {
    cos_w: f32,
    alpha: f32,
}

impl Rbj {
    fn new(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let w = TAU * frequency / sample_rate;
        Self {
            cos_w: cosf(w),
            alpha: sinf(w) / (2.0 * q),
        }
    }

    /// Denominator common to all three designs: `(a0, a1, a2)`.
    fn poles(&self) -> (f32, f32, f32) {
        (1.0 + self.alpha, -2.0 * self.cos_w, 1.0 - self.alpha)
    }

    fn with_zeros(&self, b0: f32, b1: f32, b2: f32) -> RawCoefficients {
        let (a0, a1, a2) = self.poles();
        (b0, b1, b2, a0, a1, a2)
    }
}

/// Low-pass design at cutoff `frequency` Hz. 0.707 gives a Butterworth response.
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> RawCoefficients {
    let rbj = Rbj::new(frequency, q, sample_rate);
    let side = (1.0 - rbj.cos_w) * 0.5;
    rbj.with_zeros(side, 2.0 * side, side)
}

/// High-pass design at cutoff `frequency` Hz.
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> RawCoefficients {
    let rbj = Rbj::new(frequency, q, sample_rate);
    let side = (1.0 + rbj.cos_w) * 0.5;
    rbj.with_zeros(side, -2.0 * side, side)
}

/// Band-pass design centred on `frequency` Hz with 0 dB peak gain.
///
/// Bandwidth is `frequency / q`.
pub fn bandpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> RawCoefficients {
    let rbj = Rbj::new(frequency, q, sample_rate);
    rbj.with_zeros(rbj.alpha, 0.0, -rbj.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(biquad: &mut Biquad, input: f32, samples: usize) -> f32 {
        (0..samples).fold(0.0, |_, _| biquad.process(input))
    }

    #[test]
    fn new_section_passes_input_through() {
        let mut biquad = Biquad::new();
        let ramp = [0.0, 0.25, -0.5, 0.75, 1.0];
        for x in ramp {
            assert_eq!(biquad.process(x), x);
        }
    }

    #[test]
    fn clear_zeroes_memory() {
        let mut biquad = Biquad::new();
        biquad.set_normalized(BiquadCoefficients::from_raw(lowpass_coefficients(
            200.0, 2.0, 48000.0,
        )));
        settle(&mut biquad, 0.8, 64);

        biquad.clear();
        assert_eq!(biquad.inputs, [0.0; 2]);
        assert_eq!(biquad.outputs, [0.0; 2]);
        assert_eq!(biquad.process(0.0), 0.0);
    }

    #[test]
    fn lowpass_has_unity_dc_gain() {
        let mut biquad = Biquad::new();
        biquad.set_normalized(BiquadCoefficients::from_raw(lowpass_coefficients(
            1000.0, 0.707, 44100.0,
        )));
        let out = settle(&mut biquad, 1.0, 1000);
        assert!((out - 1.0).abs() < 0.05, "DC gain {out}");
    }

    #[test]
    fn highpass_rejects_dc() {
        let mut biquad = Biquad::new();
        biquad.set_normalized(BiquadCoefficients::from_raw(highpass_coefficients(
            1000.0, 0.707, 44100.0,
        )));
        let out = settle(&mut biquad, 1.0, 2000);
        assert!(out.abs() < 1e-3, "DC leaked through high-pass: {out}");
    }

    #[test]
    fn bandpass_zeros_are_antisymmetric() {
        let c = BiquadCoefficients::from_raw(bandpass_coefficients(1000.0, 2.0, 44100.0));
        assert!(c.is_stable());
        assert_eq!(c.b1, 0.0);
        assert_eq!(c.b2, -c.b0);
        assert!(c.b0 > 0.0 && c.b0 < 1.0);
    }

    #[test]
    fn designs_share_denominator() {
        let lp = lowpass_coefficients(3000.0, 1.2, 96000.0);
        let hp = highpass_coefficients(3000.0, 1.2, 96000.0);
        let bp = bandpass_coefficients(3000.0, 1.2, 96000.0);
        assert_eq!((lp.3, lp.4, lp.5), (hp.3, hp.4, hp.5));
        assert_eq!((lp.3, lp.4, lp.5), (bp.3, bp.4, bp.5));
    }

    #[test]
    fn from_raw_divides_by_a0() {
        let c = BiquadCoefficients::from_raw((2.0, 4.0, 6.0, 2.0, 1.0, 0.5));
        assert_eq!(
            c,
            BiquadCoefficients {
                b0: 1.0,
                b1: 2.0,
                b2: 3.0,
                a1: 0.5,
                a2: 0.25,
            }
        );
    }

    #[test]
    fn stability_triangle() {
        assert!(BiquadCoefficients::IDENTITY.is_stable());
        let outside = BiquadCoefficients {
            a2: 1.2,
            ..BiquadCoefficients::IDENTITY
        };
        assert!(!outside.is_stable());
        let edge = BiquadCoefficients {
            a1: 1.5,
            a2: 0.5,
            ..BiquadCoefficients::IDENTITY
        };
        assert!(!edge.is_stable());
    }

    #[test]
    fn coefficient_swap_keeps_memory() {
        let mut biquad = Biquad::new();
        biquad.process(0.5);
        biquad.set_normalized(BiquadCoefficients::from_raw(lowpass_coefficients(
            500.0, 1.0, 48000.0,
        )));
        assert_eq!(biquad.inputs[0], 0.5);
        assert_eq!(biquad.outputs[0], 0.5);
    }
}
