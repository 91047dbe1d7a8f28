//! Small numeric helpers shared by the mode processors.

/// Zeroes magnitudes below 1e-20.
///
/// Feedback and filter memories decay toward zero on silent input; once they
/// reach the subnormal range every operation on them becomes slow on x86.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals: `dry * (1 - mix) + wet * mix`.
///
/// `mix == 0.0` returns `dry` and `mix == 1.0` returns `wet` unchanged,
/// signed zeros included.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    if mix == 0.0 {
        dry
    } else if mix == 1.0 {
        wet
    } else {
        dry * (1.0 - mix) + wet * mix
    }
}

/// Milliseconds to fractional samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * 0.001 * sample_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_denormal_zeroes_tiny_values() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
        assert_eq!(flush_denormal(-1e-10), -1e-10);
    }

    #[test]
    fn mix_endpoints_are_exact() {
        let dry = 0.123_456_7;
        let wet = -0.987_654_3;
        assert_eq!(wet_dry_mix(dry, wet, 0.0).to_bits(), dry.to_bits());
        assert_eq!(wet_dry_mix(dry, wet, 1.0).to_bits(), wet.to_bits());

        assert_eq!(wet_dry_mix(-0.0, 0.5, 0.0).to_bits(), (-0.0f32).to_bits());
        assert_eq!(wet_dry_mix(0.5, -0.0, 1.0).to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn mix_midpoint_averages() {
        assert!((wet_dry_mix(1.0, 0.0, 0.5) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn ms_to_samples_scales() {
        assert_eq!(ms_to_samples(1000.0, 48000.0), 48000.0);
        assert!((ms_to_samples(20.0, 44100.0) - 882.0).abs() < 1e-3);
    }
}
