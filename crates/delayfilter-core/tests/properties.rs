//! Property-based tests for delayfilter-core DSP primitives.
//!
//! Tests filter stability, ring-buffer cursor arithmetic and interpolation
//! bounds using proptest for randomized input generation.

use proptest::prelude::*;
use delayfilter_core::{
    Biquad, BiquadCoefficients, DelayLine, FirstOrderAllpass, LinearSmoothedParam,
    bandpass_coefficients, highpass_coefficients, lowpass_coefficients,
};

fn design(variant: usize, freq: f32, q: f32, sr: f32) -> BiquadCoefficients {
    let raw = match variant % 3 {
        0 => lowpass_coefficients(freq, q, sr),
        1 => highpass_coefficients(freq, q, sr),
        _ => bandpass_coefficients(freq, q, sr),
    };
    BiquadCoefficients::from_raw(raw)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every cutoff below Nyquist and Q in the control range yields poles
    /// inside the unit circle and finite output.
    #[test]
    fn biquad_stability(
        sr in prop::sample::select(vec![22050.0f32, 44100.0, 48000.0, 96000.0, 192000.0]),
        cutoff_ratio in 0.0005f32..0.49f32,
        q in 0.1f32..20.0f32,
        variant in 0usize..3,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let coeffs = design(variant, cutoff_ratio * sr, q, sr);
        prop_assert!(coeffs.is_stable(), "unstable: {:?}", coeffs);

        let mut biquad = Biquad::new();
        biquad.set_normalized(coeffs);
        for _ in 0..32 {
            for &sample in &input {
                prop_assert!(biquad.process(sample).is_finite());
            }
        }
    }

    /// After K advances the cursor sits at (start + K) mod capacity.
    #[test]
    fn cursor_advances_modulo_capacity(
        capacity in 1usize..4096,
        start in 0usize..10_000,
        k in 0usize..20_000,
    ) {
        let mut delay = DelayLine::new(capacity);
        for _ in 0..start {
            delay.advance();
        }
        let before = delay.write_position();
        prop_assert_eq!(before, start % capacity);
        for _ in 0..k {
            delay.advance();
        }
        prop_assert_eq!(delay.write_position(), (before + k) % capacity);
    }

    /// A linear read between two stored samples never leaves their hull.
    #[test]
    fn interpolated_read_is_bounded(
        a in -1.0f32..=1.0f32,
        b in -1.0f32..=1.0f32,
        frac in 0.0f32..1.0f32,
    ) {
        let mut delay = DelayLine::new(64);
        delay.write(0, a);
        delay.advance();
        delay.write(0, b);
        delay.advance();

        // delay 1 -> b, delay 2 -> a
        let out = delay.read_interpolated(0, 1.0 + frac);
        let lo = a.min(b) - 1e-6;
        let hi = a.max(b) + 1e-6;
        prop_assert!(out >= lo && out <= hi, "{} outside [{}, {}]", out, lo, hi);
    }

    /// Two cascaded allpass stages stay finite for any coefficient in the clamp region.
    #[test]
    fn allpass_cascade_finite(
        a in -0.99f32..=0.99f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut s1 = FirstOrderAllpass::new();
        let mut s2 = FirstOrderAllpass::new();
        for _ in 0..64 {
            for &x in &input {
                let y = s2.process(s1.process(x, a), a);
                prop_assert!(y.is_finite() && y.abs() < 100.0);
            }
        }
    }

    /// The linear smoother moves monotonically and never leaves
    /// `[start, target]`, even over ramps of ~10k samples.
    #[test]
    fn smoother_monotonic(
        start in 20.0f32..20000.0f32,
        target in 20.0f32..20000.0f32,
        sr in 22050.0f32..192000.0f32,
    ) {
        let mut param = LinearSmoothedParam::with_config(start, sr, 50.0);
        param.set_target(target);
        let (lo, hi) = (start.min(target), start.max(target));
        let rising = target >= start;
        let mut previous = start;
        while !param.is_settled() {
            let v = param.advance();
            prop_assert!(v >= lo && v <= hi, "{} outside [{}, {}]", v, lo, hi);
            let monotonic = if rising { v >= previous } else { v <= previous };
            prop_assert!(monotonic);
            previous = v;
        }
        prop_assert_eq!(param.get(), target);
    }
}
