//! Block driver: owns the engine state and runs the per-sample loop.
//!
//! ```text
//! prepare() ──► Ready ──► process_block() ──► Ready
//!   ▲                         │
//!   └──── re-prepare ◄────────┘
//! ```
//!
//! Per block: snapshot the parameters, derive a [`BlockContext`], retarget
//! the smoothers and, in IIR mode, install fresh biquad coefficients. Per
//! sample: step both smoothers and the LFO, run the active mode on each
//! channel, mix dry/wet, feed the delay line and advance its cursor.

use std::sync::Arc;

use delayfilter_core::{
    BiquadCoefficients, CHANNELS, DelayLine, Lfo, LinearSmoothedParam, bandpass_coefficients,
    highpass_coefficients, lowpass_coefficients, wet_dry_mix,
};

use crate::error::StateError;
use crate::modes::{self, BlockContext, ChannelState, ModeOutput};
use crate::params::{FilterType, IirType, ParamSnapshot, ParameterSet};

/// Delay line length in seconds.
pub const MAX_DELAY_SECONDS: f32 = 2.0;
/// Ramp time for the IIR cutoff and Q smoothers.
pub const SMOOTHING_MS: f32 = 50.0;
/// Lowest biquad cutoff in Hz.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest biquad cutoff as a fraction of the sample rate.
pub const MAX_CUTOFF_RATIO: f32 = 0.49;
/// Lowest biquad Q.
pub const MIN_Q: f32 = 0.1;
/// Highest biquad Q.
pub const MAX_Q: f32 = 20.0;

/// State that exists only between `prepare` and drop.
#[derive(Debug)]
struct EngineState {
    sample_rate: f32,
    block_size: usize,
    delay: DelayLine,
    lfo: Lfo,
    channels: [ChannelState; CHANNELS],
    smoothed_freq: LinearSmoothedParam,
    smoothed_q: LinearSmoothedParam,
}

impl EngineState {
    fn new(sample_rate: f32, block_size: usize, snapshot: &ParamSnapshot) -> Self {
        Self {
            sample_rate,
            block_size,
            delay: DelayLine::from_time(sample_rate, MAX_DELAY_SECONDS),
            lfo: Lfo::new(f64::from(sample_rate)),
            channels: Default::default(),
            smoothed_freq: LinearSmoothedParam::with_config(
                snapshot.filter_freq,
                sample_rate,
                SMOOTHING_MS,
            ),
            smoothed_q: LinearSmoothedParam::with_config(snapshot.iir_q, sample_rate, SMOOTHING_MS),
        }
    }

    fn clear(&mut self, snapshot: &ParamSnapshot) {
        self.delay.clear();
        self.lfo.reset();
        for channel in &mut self.channels {
            channel.clear();
        }
        self.smoothed_freq.set_immediate(snapshot.filter_freq);
        self.smoothed_q.set_immediate(snapshot.iir_q);
    }

    /// Designs coefficients from the current smoothed values and installs
    /// them on both channels.
    fn install_iir(&mut self, iir_type: IirType) {
        let sr = self.sample_rate;
        let max_cutoff = (MAX_CUTOFF_RATIO * sr).max(MIN_CUTOFF_HZ);
        let cutoff = self.smoothed_freq.get().clamp(MIN_CUTOFF_HZ, max_cutoff);
        let q = self.smoothed_q.get().clamp(MIN_Q, MAX_Q);

        let raw = match iir_type {
            IirType::LowPass => lowpass_coefficients(cutoff, q, sr),
            IirType::HighPass => highpass_coefficients(cutoff, q, sr),
            IirType::BandPass => bandpass_coefficients(cutoff, q, sr),
        };
        let coeffs = BiquadCoefficients::from_raw(raw);
        for channel in &mut self.channels {
            channel.biquad.set_normalized(coeffs);
        }
    }

    fn begin_block(&mut self, snapshot: &ParamSnapshot) -> BlockContext {
        self.lfo.set_rate(f64::from(snapshot.lfo_rate));
        self.smoothed_freq.set_target(snapshot.filter_freq);
        self.smoothed_q.set_target(snapshot.iir_q);
        if snapshot.filter_type == FilterType::Iir {
            self.install_iir(snapshot.iir_type);
        }
        BlockContext::new(snapshot, self.sample_rate)
    }

    #[inline]
    fn process_frame(
        &mut self,
        ctx: &BlockContext,
        mix: f32,
        dry: [f32; CHANNELS],
    ) -> [f32; CHANNELS] {
        // Ramp timing must not depend on the active mode.
        self.smoothed_freq.advance();
        self.smoothed_q.advance();
        let lfo = self.lfo.step();

        let phaser_a = ctx.phaser_coefficient(lfo);
        let flanger_delay = ctx.flanger_delay_samples(lfo);

        let mut out = [0.0; CHANNELS];
        for (ch, (&input, slot)) in dry.iter().zip(out.iter_mut()).enumerate() {
            let ModeOutput { wet, feed } = match ctx.filter_type {
                FilterType::Comb => modes::comb(ctx, &self.delay, ch, input),
                FilterType::Fir => modes::fir(ctx, &self.delay, ch, input),
                FilterType::Iir => modes::iir(&mut self.channels[ch], input),
                FilterType::Phaser => modes::phaser(ctx, &mut self.channels[ch], input, phaser_a),
                FilterType::Flanger => modes::flanger(ctx, &self.delay, ch, input, flanger_delay),
            };
            *slot = wet_dry_mix(input, wet, mix);
            if ctx.filter_type.writes_delay() {
                self.delay.write(ch, feed);
            }
        }
        self.delay.advance();
        out
    }
}

/// The delay/filter engine.
///
/// Parameters live in a shared [`ParameterSet`]; everything else (delay line,
/// filter memories, LFO phase, smoothers) is owned here and only touched by
/// [`prepare`](Self::prepare), [`reset`](Self::reset) and the process calls.
///
/// # Example
///
/// ```rust
/// use delayfilter::{DelayFilter, FilterType};
///
/// let mut engine = DelayFilter::new();
/// engine.params().set_filter_type(FilterType::Flanger);
/// engine.params().set_by_name("feedback", 0.6);
/// engine.prepare(48000.0, 256);
///
/// let mut left = vec![0.0f32; 256];
/// let mut right = vec![0.0f32; 256];
/// left[0] = 1.0;
/// right[0] = 1.0;
/// engine.process_block(&mut left, &mut right);
/// assert_eq!(engine.write_position(), 256);
/// ```
#[derive(Debug)]
pub struct DelayFilter {
    params: Arc<ParameterSet>,
    state: Option<EngineState>,
}

impl DelayFilter {
    /// Host-facing engine name.
    pub const NAME: &'static str = "DelayFilter";

    /// Creates an unprepared engine with a fresh default parameter table.
    pub fn new() -> Self {
        Self::with_params(Arc::new(ParameterSet::new()))
    }

    /// Creates an unprepared engine reading from `params`.
    pub fn with_params(params: Arc<ParameterSet>) -> Self {
        Self {
            params,
            state: None,
        }
    }

    /// The shared parameter table.
    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    /// Only stereo in, stereo out is supported.
    pub fn supports_layout(inputs: usize, outputs: usize) -> bool {
        inputs == CHANNELS && outputs == CHANNELS
    }

    /// Allocates the delay line for `sample_rate` and resets all state.
    ///
    /// May be called again to change sample rate or block size. A non-finite
    /// or non-positive sample rate leaves the engine unprepared.
    pub fn prepare(&mut self, sample_rate: f64, block_size: usize) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            tracing::warn!(sample_rate, "rejected sample rate, engine left unprepared");
            self.state = None;
            return;
        }

        let sample_rate = sample_rate as f32;
        let snapshot = self.params.snapshot();
        let state = EngineState::new(sample_rate, block_size, &snapshot);

        tracing::debug!(
            sample_rate,
            block_size,
            capacity = state.delay.capacity(),
            ramp_samples = state.smoothed_freq.ramp_samples(),
            "engine prepared"
        );
        self.state = Some(state);
    }

    /// Whether [`prepare`](Self::prepare) has succeeded.
    pub fn is_prepared(&self) -> bool {
        self.state.is_some()
    }

    /// Clears the delay line, filter memories, LFO phase and cursor without
    /// reallocating. Smoothers jump to the current parameter values.
    pub fn reset(&mut self) {
        let snapshot = self.params.snapshot();
        if let Some(state) = self.state.as_mut() {
            state.clear(&snapshot);
        }
    }

    /// Processes planar stereo in place.
    ///
    /// Slices of unequal length are processed up to the shorter one. Before
    /// [`prepare`](Self::prepare) the buffers are left untouched.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.run(left.iter_mut().zip(right.iter_mut()));
    }

    /// Processes an interleaved `L R L R ...` buffer in place.
    ///
    /// A trailing odd sample is left untouched.
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        self.run(buffer.chunks_exact_mut(CHANNELS).map(|frame| {
            let (l, r) = frame.split_at_mut(1);
            (&mut l[0], &mut r[0])
        }));
    }

    fn run<'a>(&mut self, frames: impl Iterator<Item = (&'a mut f32, &'a mut f32)>) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let snapshot = self.params.snapshot();
        let ctx = state.begin_block(&snapshot);

        for (l, r) in frames {
            let [out_l, out_r] = state.process_frame(&ctx, snapshot.mix, [*l, *r]);
            *l = out_l;
            *r = out_r;
        }
    }

    /// Tail length reported to hosts. Always `0.0`.
    pub fn tail_seconds(&self) -> f64 {
        0.0
    }

    /// Sample rate passed to the last successful `prepare`.
    pub fn sample_rate(&self) -> Option<f32> {
        self.state.as_ref().map(|s| s.sample_rate)
    }

    /// Block size passed to the last successful `prepare`.
    pub fn block_size(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.block_size)
    }

    /// Delay line write cursor, `0` while unprepared.
    pub fn write_position(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.delay.write_position())
    }

    /// LFO phase in radians, `0` while unprepared.
    pub fn lfo_phase(&self) -> f64 {
        self.state.as_ref().map_or(0.0, |s| s.lfo.phase())
    }

    /// Delay line capacity in frames, `0` while unprepared.
    pub fn capacity(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.delay.capacity())
    }

    /// Biquad coefficients last installed for IIR mode.
    pub fn iir_coefficients(&self) -> Option<BiquadCoefficients> {
        self.state
            .as_ref()
            .map(|s| s.channels[0].biquad.coefficients())
    }

    /// Serializes the parameter table.
    pub fn get_state(&self) -> Result<Vec<u8>, StateError> {
        self.params.save_state()
    }

    /// Restores the parameter table from `data`.
    ///
    /// A malformed blob is logged and ignored; parameters keep their values.
    pub fn set_state(&self, data: &[u8]) {
        if let Err(err) = self.params.try_load_state(data) {
            tracing::warn!(%err, len = data.len(), "ignoring invalid state blob");
        }
    }
}

impl Default for DelayFilter {
    fn default() -> Self {
        Self::new()
    }
}
