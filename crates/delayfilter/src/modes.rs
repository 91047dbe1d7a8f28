//! Per-sample mode processors.
//!
//! Each block, [`BlockContext::new`] turns the parameter snapshot into the
//! constants every mode needs (effective delay, FIR tap table, phaser base
//! coefficient). The per-sample functions below then map one dry input to a
//! [`ModeOutput`]: the wet sample plus the sample to store in the delay line.
//!
//! | Mode | Wet | Delay-line feed |
//! |------|-----|-----------------|
//! | Comb | `in + fb * delayed` | wet |
//! | FIR | Hann-weighted tap sum | dry |
//! | IIR | biquad output | none |
//! | Phaser | `in + fb * (allpass - in)` | none |
//! | Flanger | `in + fb * delayed(mod)` | wet |

use delayfilter_core::{
    Biquad, DelayLine, FirstOrderAllpass, allpass_coefficient, flush_denormal, ms_to_samples,
};
use libm::cosf;

use crate::params::{FilterType, MAX_TAPS, ParamSnapshot};

/// Feedback magnitude limit, applied where feedback is consumed.
pub const FEEDBACK_LIMIT: f32 = 0.99;
/// Phaser allpass coefficient limit.
pub const ALLPASS_LIMIT: f32 = 0.99;
/// Flanger read delay lower bound in milliseconds.
pub const FLANGER_MIN_MS: f32 = 0.1;
/// Flanger read delay upper bound in milliseconds.
pub const FLANGER_MAX_MS: f32 = 1000.0;
/// LFO depth (ms) to allpass coefficient swing.
const PHASER_DEPTH_SCALE: f32 = 1.0 / 20.0;

/// Result of one mode for one channel and one sample.
#[derive(Debug, Clone, Copy)]
pub struct ModeOutput {
    /// Processed sample, before dry/wet mixing.
    pub wet: f32,
    /// Sample to store in the delay line (ignored by IIR and Phaser).
    pub feed: f32,
}

/// Per-channel filter memory: one biquad and two allpass stages.
#[derive(Debug, Clone, Default)]
pub struct ChannelState {
    /// IIR mode filter.
    pub biquad: Biquad,
    /// Phaser stages.
    pub allpass: [FirstOrderAllpass; 2],
}

impl ChannelState {
    /// Zeroes every history sample. Biquad coefficients are kept.
    pub fn clear(&mut self) {
        self.biquad.clear();
        for stage in &mut self.allpass {
            stage.clear();
        }
    }
}

/// One FIR tap: read delay and combined window/gain weight.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FirTap {
    /// Delay in samples, `0` for the direct tap.
    pub delay_samples: f32,
    /// `tapGain / taps * hann(frac)`.
    pub weight: f32,
}

/// Block-constant values derived from a [`ParamSnapshot`].
#[derive(Debug, Clone, Copy)]
pub struct BlockContext {
    /// Active algorithm.
    pub filter_type: FilterType,
    /// Feedback clamped to `±FEEDBACK_LIMIT`.
    pub feedback: f32,
    /// Delay after `filterFreq` tracking, in milliseconds.
    pub effective_delay_ms: f32,
    /// Comb read delay in samples.
    pub delay_samples: f32,
    /// LFO depth in milliseconds.
    pub lfo_depth_ms: f32,
    /// Phaser coefficient at the LFO center.
    pub phaser_base: f32,
    /// FIR taps; only the first `tap_count` entries are live.
    pub taps: [FirTap; MAX_TAPS],
    /// Live FIR tap count.
    pub tap_count: usize,
    /// Sample rate in Hz.
    pub sample_rate: f32,
}

impl BlockContext {
    /// Derives the block constants for `snapshot` at `sample_rate`.
    pub fn new(snapshot: &ParamSnapshot, sample_rate: f32) -> Self {
        let effective_delay_ms = effective_delay_ms(snapshot);
        let tap_count = snapshot.taps.clamp(1, MAX_TAPS);

        let mut taps = [FirTap::default(); MAX_TAPS];
        if snapshot.filter_type == FilterType::Fir {
            let gain_per_tap = snapshot.tap_gain / tap_count as f32;
            let span = (tap_count - 1).max(1) as f32;
            for (t, tap) in taps.iter_mut().enumerate().take(tap_count) {
                let frac = t as f32 / span;
                tap.delay_samples = ms_to_samples(frac * effective_delay_ms, sample_rate);
                tap.weight = gain_per_tap * hann(frac);
            }
        }

        Self {
            filter_type: snapshot.filter_type,
            feedback: snapshot.feedback.clamp(-FEEDBACK_LIMIT, FEEDBACK_LIMIT),
            effective_delay_ms,
            delay_samples: ms_to_samples(effective_delay_ms, sample_rate),
            lfo_depth_ms: snapshot.lfo_depth_ms,
            phaser_base: allpass_coefficient(
                f64::from(snapshot.filter_freq),
                f64::from(sample_rate),
            ),
            taps,
            tap_count,
            sample_rate,
        }
    }

    /// Phaser coefficient for this sample's LFO value.
    #[inline]
    pub fn phaser_coefficient(&self, lfo: f32) -> f32 {
        phaser_coefficient(self.phaser_base, lfo, self.lfo_depth_ms)
    }

    /// Flanger read delay in samples for this sample's LFO value.
    #[inline]
    pub fn flanger_delay_samples(&self, lfo: f32) -> f32 {
        let ms = (self.effective_delay_ms + self.lfo_depth_ms * lfo)
            .clamp(FLANGER_MIN_MS, FLANGER_MAX_MS);
        ms_to_samples(ms, self.sample_rate)
    }
}

/// Delay time after frequency tracking.
///
/// Comb, FIR and Flanger tune their delay to one period of `filterFreq`; FIR
/// stretches that to `taps - 1` periods so adjacent taps sit one period apart.
/// A non-positive frequency keeps the raw `delayMs`.
pub fn effective_delay_ms(snapshot: &ParamSnapshot) -> f32 {
    if snapshot.filter_freq <= 0.0 || !snapshot.filter_type.tracks_frequency() {
        return snapshot.delay_ms;
    }
    let period_ms = 1000.0 / snapshot.filter_freq;
    if snapshot.filter_type == FilterType::Fir && snapshot.taps > 1 {
        period_ms * (snapshot.taps - 1) as f32
    } else {
        period_ms
    }
}

/// `clamp(base + lfo * depth / 20, ±0.99)`.
#[inline]
pub fn phaser_coefficient(base: f32, lfo: f32, lfo_depth_ms: f32) -> f32 {
    (base + lfo * lfo_depth_ms * PHASER_DEPTH_SCALE).clamp(-ALLPASS_LIMIT, ALLPASS_LIMIT)
}

/// Hann window over `[0, 1]`: zero at both ends, one at the center.
#[inline]
pub fn hann(frac: f32) -> f32 {
    0.5 * (1.0 - cosf(core::f32::consts::TAU * frac))
}

/// Feedback comb.
#[inline]
pub fn comb(ctx: &BlockContext, delay: &DelayLine, channel: usize, input: f32) -> ModeOutput {
    let delayed = delay.read_interpolated(channel, ctx.delay_samples);
    let wet = flush_denormal(input + ctx.feedback * delayed);
    ModeOutput { wet, feed: wet }
}

/// Windowed multi-tap FIR.
///
/// The delay line is fed the dry input, not the tap sum, so each tap reads
/// raw input history.
#[inline]
pub fn fir(ctx: &BlockContext, delay: &DelayLine, channel: usize, input: f32) -> ModeOutput {
    let mut wet = input * ctx.taps[0].weight;
    for tap in &ctx.taps[1..ctx.tap_count] {
        wet += delay.read_interpolated(channel, tap.delay_samples) * tap.weight;
    }
    ModeOutput { wet, feed: input }
}

/// Biquad, coefficients installed once per block by the driver.
#[inline]
pub fn iir(state: &mut ChannelState, input: f32) -> ModeOutput {
    ModeOutput {
        wet: state.biquad.process(input),
        feed: input,
    }
}

/// Two allpass stages sharing coefficient `a`.
#[inline]
pub fn phaser(ctx: &BlockContext, state: &mut ChannelState, input: f32, a: f32) -> ModeOutput {
    let [stage1, stage2] = &mut state.allpass;
    let out1 = stage1.process(input, a);
    let out2 = stage2.process(out1, a);
    ModeOutput {
        wet: input + ctx.feedback * (out2 - input),
        feed: input,
    }
}

/// Comb with a modulated read delay (`delay_samples` from [`BlockContext::flanger_delay_samples`]).
#[inline]
pub fn flanger(
    ctx: &BlockContext,
    delay: &DelayLine,
    channel: usize,
    input: f32,
    delay_samples: f32,
) -> ModeOutput {
    let delayed = delay.read_interpolated(channel, delay_samples);
    let wet = flush_denormal(input + ctx.feedback * delayed);
    ModeOutput { wet, feed: wet }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::IirType;

    fn snapshot(filter_type: FilterType) -> ParamSnapshot {
        ParamSnapshot {
            filter_type,
            mix: 1.0,
            delay_ms: 20.0,
            feedback: 0.0,
            taps: 2,
            tap_gain: 0.5,
            filter_freq: 1000.0,
            iir_q: 0.707,
            iir_type: IirType::LowPass,
            lfo_rate: 0.5,
            lfo_depth_ms: 2.0,
        }
    }

    #[test]
    fn effective_delay_tracks_frequency() {
        let comb = snapshot(FilterType::Comb);
        assert!((effective_delay_ms(&comb) - 1.0).abs() < 1e-6);

        let mut fir = snapshot(FilterType::Fir);
        fir.taps = 5;
        fir.filter_freq = 500.0;
        assert!((effective_delay_ms(&fir) - 8.0).abs() < 1e-6);

        // Single tap: one period, no stretch
        fir.taps = 1;
        assert!((effective_delay_ms(&fir) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn effective_delay_raw_for_untracked_modes() {
        let phaser = snapshot(FilterType::Phaser);
        assert_eq!(effective_delay_ms(&phaser), 20.0);

        let mut comb = snapshot(FilterType::Comb);
        comb.filter_freq = 0.0;
        assert_eq!(effective_delay_ms(&comb), 20.0);
    }

    #[test]
    fn hann_edges_and_center() {
        assert_eq!(hann(0.0), 0.0);
        assert!(hann(1.0).abs() < 1e-6);
        assert!((hann(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fir_tap_table() {
        let mut snap = snapshot(FilterType::Fir);
        snap.taps = 3;
        snap.tap_gain = 0.9;
        snap.filter_freq = 1000.0;
        let ctx = BlockContext::new(&snap, 48000.0);

        assert_eq!(ctx.tap_count, 3);
        // span = 2 periods = 2 ms = 96 samples
        assert_eq!(ctx.taps[0].delay_samples, 0.0);
        assert!((ctx.taps[1].delay_samples - 48.0).abs() < 1e-3);
        assert!((ctx.taps[2].delay_samples - 96.0).abs() < 1e-3);

        assert_eq!(ctx.taps[0].weight, 0.0);
        assert!((ctx.taps[1].weight - 0.3).abs() < 1e-6);
        assert!(ctx.taps[2].weight.abs() < 1e-6);
    }

    #[test]
    fn single_tap_fir_is_silent() {
        let mut snap = snapshot(FilterType::Fir);
        snap.taps = 1;
        snap.tap_gain = 1.0;
        let ctx = BlockContext::new(&snap, 44100.0);
        let delay = DelayLine::new(64);

        let out = fir(&ctx, &delay, 0, 0.8);
        assert_eq!(out.wet, 0.0);
        assert_eq!(out.feed, 0.8);
    }

    #[test]
    fn feedback_clamped_at_use() {
        let mut snap = snapshot(FilterType::Comb);
        snap.feedback = 3.0;
        assert_eq!(BlockContext::new(&snap, 44100.0).feedback, FEEDBACK_LIMIT);
        snap.feedback = -3.0;
        assert_eq!(BlockContext::new(&snap, 44100.0).feedback, -FEEDBACK_LIMIT);
    }

    #[test]
    fn comb_feeds_wet() {
        let mut snap = snapshot(FilterType::Comb);
        snap.feedback = 0.5;
        snap.filter_freq = 44100.0; // one-sample period
        let ctx = BlockContext::new(&snap, 44100.0);
        assert!((ctx.delay_samples - 1.0).abs() < 1e-4);

        let mut delay = DelayLine::new(16);
        delay.write(0, 1.0);
        delay.advance();

        let out = comb(&ctx, &delay, 0, 0.25);
        assert!((out.wet - 0.75).abs() < 1e-4);
        assert_eq!(out.wet, out.feed);
    }

    #[test]
    fn phaser_coefficient_bounded() {
        for base in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            for lfo in [-1.0, 0.0, 1.0] {
                let a = phaser_coefficient(base, lfo, 10.0);
                assert!((-ALLPASS_LIMIT..=ALLPASS_LIMIT).contains(&a), "a = {a}");
            }
        }
        assert!((phaser_coefficient(0.2, 1.0, 2.0) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn phaser_zero_feedback_is_dry() {
        let ctx = BlockContext::new(&snapshot(FilterType::Phaser), 44100.0);
        let mut state = ChannelState::default();
        for &x in &[0.1, -0.4, 0.9] {
            let out = phaser(&ctx, &mut state, x, 0.3);
            assert_eq!(out.wet, x);
        }
    }

    #[test]
    fn flanger_delay_clamped() {
        let mut snap = snapshot(FilterType::Flanger);
        snap.filter_freq = 20000.0; // 0.05 ms period
        snap.lfo_depth_ms = 10.0;
        let ctx = BlockContext::new(&snap, 48000.0);

        // 0.05 - 10 ms clamps to the 0.1 ms floor
        assert!((ctx.flanger_delay_samples(-1.0) - 4.8).abs() < 1e-3);
        assert!((ctx.flanger_delay_samples(1.0) - 482.4).abs() < 1e-2);
    }
}
