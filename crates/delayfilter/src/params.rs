//! Lock-free parameter table shared between the control path and the engine.
//!
//! Values live as `f32` bit patterns in `AtomicU32` slots, one per control.
//! The control path (host automation, CLI) writes through `&self`; the audio
//! path takes a [`ParamSnapshot`] once per block. Reads of separate slots are
//! not mutually atomic, so a snapshot taken during a burst of writes may mix
//! old and new values. Every value is a plain scalar, so that race can only
//! produce a combination a user could have dialed in by hand.
//!
//! # Parameters
//!
//! | Index | String ID | Range | Default |
//! |-------|-----------|-------|---------|
//! | 0 | `filterType` | Comb, FIR, IIR, Phaser, Flanger | Comb |
//! | 1 | `mix` | 0.0 - 1.0 | 0.5 |
//! | 2 | `delayMs` | 0.1 - 1000.0 ms | 20.0 |
//! | 3 | `feedback` | -0.99 - 0.99 | 0.0 |
//! | 4 | `taps` | 1 - 16, step 1 | 2 |
//! | 5 | `tapGain` | 0.0 - 1.0 | 0.5 |
//! | 6 | `filterFreq` | 20 - 20000 Hz | 1000.0 |
//! | 7 | `iirQ` | 0.1 - 20.0 | 0.707 |
//! | 8 | `iirType` | Low-pass, High-pass, Band-pass | Low-pass |
//! | 9 | `lfoRate` | 0.01 - 10.0 Hz | 0.5 |
//! | 10 | `lfoDepth` | 0.0 - 10.0 ms | 2.0 |

use std::sync::atomic::{AtomicU32, Ordering};

use delayfilter_core::{ParamDescriptor, ParamId, ParamScale, ParamUnit};

/// Index of the mode selector.
pub const FILTER_TYPE: usize = 0;
/// Index of the dry/wet mix.
pub const MIX: usize = 1;
/// Index of the raw delay time.
pub const DELAY_MS: usize = 2;
/// Index of the feedback amount.
pub const FEEDBACK: usize = 3;
/// Index of the FIR tap count.
pub const TAPS: usize = 4;
/// Index of the FIR overall tap gain.
pub const TAP_GAIN: usize = 5;
/// Index of the filter frequency.
pub const FILTER_FREQ: usize = 6;
/// Index of the IIR resonance.
pub const IIR_Q: usize = 7;
/// Index of the IIR response selector.
pub const IIR_TYPE: usize = 8;
/// Index of the LFO rate.
pub const LFO_RATE: usize = 9;
/// Index of the LFO depth.
pub const LFO_DEPTH: usize = 10;

/// Number of engine parameters.
pub const PARAM_COUNT: usize = 11;

/// Maximum FIR tap count.
pub const MAX_TAPS: usize = 16;

const FILTER_TYPE_LABELS: &[&str] = &["Comb", "FIR", "IIR", "Phaser", "Flanger"];
const IIR_TYPE_LABELS: &[&str] = &["Low-pass", "High-pass", "Band-pass"];

/// Descriptor table, indexed by parameter position.
pub static DESCRIPTORS: [ParamDescriptor; PARAM_COUNT] = [
    ParamDescriptor::choice("Filter Type", "Type", FILTER_TYPE_LABELS, 0)
        .with_id(ParamId(0), "filterType"),
    ParamDescriptor::continuous("Mix", "Mix", 0.0, 1.0, 0.5).with_id(ParamId(1), "mix"),
    ParamDescriptor::continuous("Delay (ms)", "Delay", 0.1, 1000.0, 20.0)
        .with_unit(ParamUnit::Milliseconds)
        .with_id(ParamId(2), "delayMs"),
    ParamDescriptor::continuous("Feedback", "Fdbk", -0.99, 0.99, 0.0)
        .with_id(ParamId(3), "feedback"),
    ParamDescriptor::stepped("Taps", "Taps", 1.0, MAX_TAPS as f32, 2.0)
        .with_id(ParamId(4), "taps"),
    ParamDescriptor::continuous("Tap Gain", "TapGain", 0.0, 1.0, 0.5)
        .with_id(ParamId(5), "tapGain"),
    ParamDescriptor::continuous("Filter Freq Hz", "Freq", 20.0, 20000.0, 1000.0)
        .with_unit(ParamUnit::Hertz)
        .with_scale(ParamScale::Logarithmic)
        .with_id(ParamId(6), "filterFreq"),
    ParamDescriptor::continuous("IIR Q", "Q", 0.1, 20.0, 0.707)
        .with_scale(ParamScale::Logarithmic)
        .with_id(ParamId(7), "iirQ"),
    ParamDescriptor::choice("IIR Type", "IIRType", IIR_TYPE_LABELS, 0)
        .with_id(ParamId(8), "iirType"),
    ParamDescriptor::continuous("LFO Rate Hz", "Rate", 0.01, 10.0, 0.5)
        .with_unit(ParamUnit::Hertz)
        .with_scale(ParamScale::Logarithmic)
        .with_id(ParamId(9), "lfoRate"),
    ParamDescriptor::continuous("LFO Depth ms", "Depth", 0.0, 10.0, 2.0)
        .with_unit(ParamUnit::Milliseconds)
        .with_id(ParamId(10), "lfoDepth"),
];

/// Active processing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterType {
    /// Feedback comb: single interpolated tap.
    #[default]
    Comb,
    /// Hann-windowed multi-tap feedforward filter.
    Fir,
    /// RBJ biquad (see [`IirType`]).
    Iir,
    /// Two cascaded first-order allpass stages swept by the LFO.
    Phaser,
    /// Comb with LFO-modulated read delay.
    Flanger,
}

impl FilterType {
    /// All variants, in parameter index order.
    pub const ALL: [FilterType; 5] = [
        FilterType::Comb,
        FilterType::Fir,
        FilterType::Iir,
        FilterType::Phaser,
        FilterType::Flanger,
    ];

    /// Variant for a parameter index. Unknown indices fall back to [`FilterType::Comb`].
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Parameter index of this variant.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        FILTER_TYPE_LABELS[self.index()]
    }

    /// Whether the mode feeds the shared delay line.
    pub fn writes_delay(self) -> bool {
        matches!(self, FilterType::Comb | FilterType::Fir | FilterType::Flanger)
    }

    /// Whether the mode derives its delay from `filterFreq`.
    pub fn tracks_frequency(self) -> bool {
        self.writes_delay()
    }
}

/// Biquad response used by [`FilterType::Iir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IirType {
    /// 12 dB/oct low-pass.
    #[default]
    LowPass,
    /// 12 dB/oct high-pass.
    HighPass,
    /// Constant 0 dB peak band-pass.
    BandPass,
}

impl IirType {
    /// All variants, in parameter index order.
    pub const ALL: [IirType; 3] = [IirType::LowPass, IirType::HighPass, IirType::BandPass];

    /// Variant for a parameter index. Unknown indices fall back to [`IirType::LowPass`].
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Parameter index of this variant.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        IIR_TYPE_LABELS[self.index()]
    }
}

/// Typed copy of every parameter, taken once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    /// Active algorithm.
    pub filter_type: FilterType,
    /// Dry/wet mix in `[0, 1]`.
    pub mix: f32,
    /// Raw delay time in milliseconds.
    pub delay_ms: f32,
    /// Feedback amount.
    pub feedback: f32,
    /// FIR tap count, at least 1.
    pub taps: usize,
    /// FIR overall gain.
    pub tap_gain: f32,
    /// Filter frequency in Hz.
    pub filter_freq: f32,
    /// Biquad Q.
    pub iir_q: f32,
    /// Biquad response.
    pub iir_type: IirType,
    /// LFO rate in Hz.
    pub lfo_rate: f32,
    /// LFO depth in milliseconds.
    pub lfo_depth_ms: f32,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        ParameterSet::new().snapshot()
    }
}

/// The engine's parameter table.
///
/// Share it as `Arc<ParameterSet>`: every method takes `&self`.
///
/// ```rust
/// use delayfilter::{FilterType, ParameterSet};
///
/// let params = ParameterSet::new();
/// assert!(params.set_by_name("filterType", 3.0));
/// assert!(params.set_by_name("mix", 7.0)); // clamped
///
/// let snap = params.snapshot();
/// assert_eq!(snap.filter_type, FilterType::Phaser);
/// assert_eq!(snap.mix, 1.0);
/// ```
#[derive(Debug)]
pub struct ParameterSet {
    values: [AtomicU32; PARAM_COUNT],
}

impl ParameterSet {
    /// Creates a table holding every default.
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicU32::new(DESCRIPTORS[i].default.to_bits())),
        }
    }

    /// Parameter descriptors, indexed by position.
    pub fn descriptors(&self) -> &'static [ParamDescriptor] {
        &DESCRIPTORS
    }

    /// Descriptor at `index`.
    pub fn descriptor(&self, index: usize) -> Option<&'static ParamDescriptor> {
        DESCRIPTORS.get(index)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        PARAM_COUNT
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Position of the parameter whose string ID is `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        DESCRIPTORS.iter().position(|d| d.string_id == name)
    }

    /// Current value at `index` (lock-free).
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values
            .get(index)
            .map(|v| f32::from_bits(v.load(Ordering::Acquire)))
    }

    /// Writes `value` at `index` (lock-free).
    ///
    /// The value is clamped to the descriptor range and snapped onto the step
    /// grid for `taps` and the choices. Returns `false` for an unknown index.
    pub fn set(&self, index: usize, value: f32) -> bool {
        let Some((atomic, desc)) = self.values.get(index).zip(DESCRIPTORS.get(index)) else {
            return false;
        };
        atomic.store(desc.quantize(value).to_bits(), Ordering::Release);
        true
    }

    /// Current value at `index` on the host's 0..1 scale.
    pub fn get_normalized(&self, index: usize) -> Option<f32> {
        let desc = DESCRIPTORS.get(index)?;
        self.get(index).map(|v| desc.normalize(v))
    }

    /// Writes a 0..1 host value at `index`, mapped through the descriptor's
    /// scale. Returns `false` for an unknown index.
    pub fn set_normalized(&self, index: usize, normalized: f32) -> bool {
        let Some(desc) = DESCRIPTORS.get(index) else {
            return false;
        };
        self.set(index, desc.denormalize(normalized.clamp(0.0, 1.0)))
    }

    /// Current value of the parameter named `name`.
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        self.index_of(name).and_then(|i| self.get(i))
    }

    /// Writes the parameter named `name`. Returns `false` for an unknown name.
    pub fn set_by_name(&self, name: &str, value: f32) -> bool {
        self.index_of(name).is_some_and(|i| self.set(i, value))
    }

    /// Selects the active algorithm.
    pub fn set_filter_type(&self, filter_type: FilterType) {
        self.set(FILTER_TYPE, filter_type.index() as f32);
    }

    /// Selects the biquad response.
    pub fn set_iir_type(&self, iir_type: IirType) {
        self.set(IIR_TYPE, iir_type.index() as f32);
    }

    /// Restores every parameter to its default.
    pub fn reset_to_defaults(&self) {
        for (atomic, desc) in self.values.iter().zip(DESCRIPTORS.iter()) {
            atomic.store(desc.default.to_bits(), Ordering::Release);
        }
    }

    /// Reads every slot into a typed snapshot.
    pub fn snapshot(&self) -> ParamSnapshot {
        let value = |index: usize| f32::from_bits(self.values[index].load(Ordering::Acquire));

        ParamSnapshot {
            filter_type: FilterType::from_index(value(FILTER_TYPE) as usize),
            mix: value(MIX),
            delay_ms: value(DELAY_MS),
            feedback: value(FEEDBACK),
            taps: (value(TAPS) as usize).clamp(1, MAX_TAPS),
            tap_gain: value(TAP_GAIN),
            filter_freq: value(FILTER_FREQ),
            iir_q: value(IIR_Q),
            iir_type: IirType::from_index(value(IIR_TYPE) as usize),
            lfo_rate: value(LFO_RATE),
            lfo_depth_ms: value(LFO_DEPTH),
        }
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::new()
    }
}
