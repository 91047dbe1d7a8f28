//! Parameter metadata for host-facing controls.
//!
//! Each engine control is described by a [`ParamDescriptor`] carrying the
//! information a host, a preset system or a CLI needs:
//!
//! - [`ParamId`] - stable numeric ID for automation
//! - `string_id` - stable textual ID, used as the persistence key
//! - [`ParamScale`] - normalization curve (linear or logarithmic)
//! - [`ParamFlags`] - capability flags (automatable, stepped, choice)
//! - `labels` - display strings for choice parameters
//!
//! Descriptors are `const`-constructible so a processor can declare its whole
//! parameter table as a `static`.
//!
//! # Example
//!
//! ```rust
//! use delayfilter_core::{ParamDescriptor, ParamId, ParamUnit};
//!
//! const DELAY: ParamDescriptor = ParamDescriptor::continuous("Delay (ms)", "Delay", 0.1, 1000.0, 20.0)
//!     .with_unit(ParamUnit::Milliseconds)
//!     .with_id(ParamId(2), "delayMs");
//!
//! assert_eq!(DELAY.clamp(5000.0), 1000.0);
//! assert_eq!(DELAY.string_id, "delayMs");
//! ```

use libm::{logf, powf, roundf};

/// Mapping between a plain value and the host's 0..1 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamScale {
    /// `(value - min) / (max - min)`
    #[default]
    Linear,
    /// `ln(value / min) / ln(max / min)`. Only meaningful for `min > 0`.
    Logarithmic,
}

/// Numeric parameter identity. Never reused or renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Capability bits, combined with [`union`](Self::union).
///
/// ```rust
/// use delayfilter_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!flags.contains(ParamFlags::CHOICE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// Empty set.
    pub const NONE: Self = Self(0);
    /// Exposed to host automation.
    pub const AUTOMATABLE: Self = Self(0b001);
    /// Snapped to multiples of `step` above `min`.
    pub const STEPPED: Self = Self(0b010);
    /// Value is an index into `labels`.
    pub const CHOICE: Self = Self(0b100);

    /// Every bit of `other` is present.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Bitwise OR.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Range, default, identity and display data for one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Host-facing label, e.g. "Filter Freq Hz".
    pub name: &'static str,
    /// Abbreviation for narrow displays.
    pub short_name: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Lower bound, inclusive.
    pub min: f32,
    /// Upper bound, inclusive.
    pub max: f32,
    /// Initial value.
    pub default: f32,
    /// Grid spacing, applied only with [`ParamFlags::STEPPED`].
    pub step: f32,
    /// Numeric identity (`ParamId(0)` until assigned).
    pub id: ParamId,
    /// Persistence key (empty until assigned).
    pub string_id: &'static str,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Capability bits.
    pub flags: ParamFlags,
    /// Choice labels by index; empty for numeric controls.
    pub labels: &'static [&'static str],
}

impl ParamDescriptor {
    /// Unitless, linear, automatable control over `[min, max]`.
    pub const fn continuous(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: 0.01,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
            labels: &[],
        }
    }

    /// Control snapped to whole steps above `min`.
    pub const fn stepped(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            step: 1.0,
            ..Self::continuous(name, short_name, min, max, default)
        }
        .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED))
    }

    /// Choice parameter over `labels`; the value is the label index.
    pub const fn choice(
        name: &'static str,
        short_name: &'static str,
        labels: &'static [&'static str],
        default: usize,
    ) -> Self {
        Self {
            step: 1.0,
            labels,
            ..Self::continuous(
                name,
                short_name,
                0.0,
                labels.len().saturating_sub(1) as f32,
                default as f32,
            )
        }
        .with_flags(
            ParamFlags::AUTOMATABLE
                .union(ParamFlags::STEPPED)
                .union(ParamFlags::CHOICE),
        )
    }

    /// Assigns the numeric and persistence identities.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Display unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Normalization curve.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Replaces the capability bits.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether the parameter selects among labels.
    #[inline]
    pub const fn is_choice(&self) -> bool {
        self.flags.contains(ParamFlags::CHOICE)
    }

    /// Limits `value` to `[min, max]`. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.max(self.min).min(self.max)
    }

    /// Clamps, then snaps stepped and choice parameters onto their grid.
    ///
    /// ```rust
    /// use delayfilter_core::ParamDescriptor;
    ///
    /// let taps = ParamDescriptor::stepped("Taps", "Taps", 1.0, 16.0, 2.0);
    /// assert_eq!(taps.quantize(3.4), 3.0);
    /// assert_eq!(taps.quantize(40.0), 16.0);
    /// ```
    #[inline]
    pub fn quantize(&self, value: f32) -> f32 {
        let clamped = self.clamp(value);
        if self.flags.contains(ParamFlags::STEPPED) && self.step > 0.0 {
            let steps = roundf((clamped - self.min) / self.step);
            (self.min + steps * self.step).min(self.max)
        } else {
            clamped
        }
    }

    /// Label for a choice value, `None` for numeric parameters.
    pub fn label(&self, value: f32) -> Option<&'static str> {
        if !self.is_choice() {
            return None;
        }
        let index = self.quantize(value) as usize;
        self.labels.get(index).copied()
    }

    /// Index of a choice label (case-insensitive).
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l.eq_ignore_ascii_case(label))
    }

    /// Plain value to `0..1` along [`scale`](Self::scale).
    ///
    /// Degenerate ranges and non-positive log inputs map to 0.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        if self.max == self.min {
            return 0.0;
        }
        match self.scale {
            ParamScale::Linear => (value - self.min) / (self.max - self.min),
            ParamScale::Logarithmic if self.min > 0.0 && value > 0.0 => {
                logf(value / self.min) / logf(self.max / self.min)
            }
            ParamScale::Logarithmic => 0.0,
        }
    }

    /// `0..1` back to a plain value; inverse of [`normalize`](Self::normalize).
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        match self.scale {
            ParamScale::Linear => self.min + (self.max - self.min) * normalized,
            ParamScale::Logarithmic if self.min > 0.0 => {
                self.min * powf(self.max / self.min, normalized)
            }
            ParamScale::Logarithmic => self.min,
        }
    }
}

/// Display unit of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Filter frequency and LFO rate.
    Hertz,
    /// Delay time and modulation depth.
    Milliseconds,
    /// Mix, gains, Q, counts and choices.
    None,
}

impl ParamUnit {
    /// Suffix appended to a formatted value, with its leading space.
    ///
    /// ```rust
    /// use delayfilter_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::None => "",
        }
    }
}
