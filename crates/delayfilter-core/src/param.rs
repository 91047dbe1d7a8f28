//! Constant-rate parameter ramps.
//!
//! The engine ramps filter cutoff and resonance toward their set points so a
//! per-block coefficient redesign never jumps.
//!
//! ```rust
//! use delayfilter_core::LinearSmoothedParam;
//!
//! let mut cutoff = LinearSmoothedParam::with_config(1000.0, 48000.0, 50.0);
//! cutoff.set_target(2000.0);
//!
//! for _ in 0..2400 {
//!     cutoff.advance();
//! }
//! assert_eq!(cutoff.get(), 2000.0);
//! ```

use libm::roundf;

use crate::math::ms_to_samples;

/// Linear ramp toward a target over a fixed number of samples.
///
/// Each value is `start + step * elapsed`, clamped at the target, so long
/// ramps do not collect rounding error and never pass the target.
/// Retargeting restarts from the current value, so a ramp interrupted
/// halfway keeps its position. Sending the target it is already heading for
/// is a no-op, which lets a caller retarget once per block without
/// stretching the ramp.
#[derive(Debug, Clone)]
pub struct LinearSmoothedParam {
    value: f32,
    start: f32,
    goal: f32,
    step: f32,
    remaining: u32,
    ramp_len: u32,
}

impl LinearSmoothedParam {
    /// Settled at `initial`, ramping over `ramp_ms` at `sample_rate`.
    pub fn with_config(initial: f32, sample_rate: f32, ramp_ms: f32) -> Self {
        Self {
            value: initial,
            start: initial,
            goal: initial,
            step: 0.0,
            remaining: 0,
            ramp_len: roundf(ms_to_samples(ramp_ms, sample_rate)).max(0.0) as u32,
        }
    }

    /// Length of a full ramp in samples.
    #[inline]
    pub fn ramp_samples(&self) -> u32 {
        self.ramp_len
    }

    /// Starts a ramp from the current value toward `target`.
    pub fn set_target(&mut self, target: f32) {
        if target == self.goal {
            return;
        }
        self.goal = target;
        if self.ramp_len == 0 {
            self.set_immediate(target);
        } else {
            self.start = self.value;
            self.step = (target - self.value) / self.ramp_len as f32;
            self.remaining = self.ramp_len;
        }
    }

    /// Jumps to `value` with no ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.value = value;
        self.start = value;
        self.goal = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    /// Moves one sample along the ramp and returns the new value. The last
    /// step lands exactly on the target.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.remaining {
            0 => {}
            1 => {
                self.value = self.goal;
                self.remaining = 0;
            }
            _ => {
                self.remaining -= 1;
                let elapsed = (self.ramp_len - self.remaining) as f32;
                let next = self.start + self.step * elapsed;
                self.value = if self.step > 0.0 {
                    next.min(self.goal)
                } else {
                    next.max(self.goal)
                };
            }
        }
        self.value
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.value
    }

    /// No ramp in progress.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.remaining == 0
    }
}
