//! Low Frequency Oscillator for modulated delay and allpass effects.
//!
//! Phase is accumulated in radians as `f64` so that long sessions at low
//! rates do not drift. The value is evaluated at the current phase and the
//! phase is advanced afterwards.

use core::f64::consts::TAU;
use libm::sin;

/// Sine LFO with a radian phase accumulator.
///
/// Invariant: `0 <= phase < 2π` after every [`step`](Self::step).
///
/// # Example
///
/// ```rust
/// use delayfilter_core::Lfo;
///
/// let mut lfo = Lfo::new(44100.0);
/// lfo.set_rate(0.5);
///
/// // First value is sin(0)
/// assert_eq!(lfo.step(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase in radians, `[0, 2π)`
    phase: f64,
    /// Phase increment per sample in radians
    phase_inc: f64,
    /// Rate in Hz
    rate_hz: f64,
    /// Sample rate in Hz
    sample_rate: f64,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(44100.0)
    }
}

impl Lfo {
    /// Create a stopped LFO (rate 0 Hz) at the given sample rate.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 0.0,
            rate_hz: 0.0,
            sample_rate,
        }
    }

    /// Set rate in Hz. Increment becomes `2π·rate / sample_rate`.
    pub fn set_rate(&mut self, rate_hz: f64) {
        self.rate_hz = rate_hz;
        self.recalculate_increment();
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Return `sin(phase)` then advance the phase by one sample.
    ///
    /// The wrap is a single subtraction: the increment is always far below
    /// 2π for sub-audio rates, so the phase never exceeds `2·2π`.
    #[inline]
    pub fn step(&mut self) -> f32 {
        let value = sin(self.phase);

        self.phase += self.phase_inc;
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        value as f32
    }

    fn recalculate_increment(&mut self) {
        self.phase_inc = if self.sample_rate > 0.0 {
            TAU * self.rate_hz / self.sample_rate
        } else {
            0.0
        };
    }
}
