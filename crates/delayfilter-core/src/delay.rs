//! Two-channel circular delay line with fractional reads.
//!
//! Both channels share a single write cursor so a stereo processor writes
//! left and right at the same position and advances once per frame.
//!
//! # Read Convention
//!
//! [`DelayLine::read_interpolated`] looks `delay_samples` behind the *current*
//! write position, before the current frame is written. A sample written at
//! cursor `p` is therefore read back exactly `N` frames later with
//! `delay_samples = N`.
//!
//! | Delay | Reads |
//! |-------|-------|
//! | `N` (integer) | the frame written `N` advances ago |
//! | `N + f` | linear blend of frames `N` and `N + 1` ago |

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;
use libm::{floorf, roundf};

/// Number of channels carried by a [`DelayLine`].
pub const CHANNELS: usize = 2;

/// Stereo ring buffer with linear interpolation and a shared write cursor.
///
/// # Memory
///
/// Storage is allocated once in [`new`](Self::new) and never resized.
/// Reads, writes and [`advance`](Self::advance) never allocate.
///
/// # Example
///
/// ```rust
/// use delayfilter_core::DelayLine;
///
/// let mut delay = DelayLine::new(16);
/// delay.write(0, 1.0);
/// for _ in 0..4 {
///     delay.advance();
/// }
/// assert_eq!(delay.read_interpolated(0, 4.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// Per-channel circular storage, all of length `capacity`.
    buffers: [Vec<f32>; CHANNELS],
    /// Write cursor, always `< capacity`.
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line holding `capacity` frames per channel.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Delay capacity must be > 0");

        #[cfg(feature = "tracing")]
        tracing::debug!(capacity, "delay line allocated");

        Self {
            buffers: [vec![0.0; capacity], vec![0.0; capacity]],
            write_pos: 0,
        }
    }

    /// Creates a delay line holding `round(sample_rate * max_seconds)` frames.
    ///
    /// At least one frame is always allocated.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        let frames = roundf(sample_rate * max_seconds).max(1.0) as usize;
        Self::new(frames)
    }

    /// Stores `sample` on `channel` at the current write position.
    ///
    /// Does not advance the cursor; call [`advance`](Self::advance) once per frame.
    /// Writes to channels `>= CHANNELS` are ignored.
    #[inline]
    pub fn write(&mut self, channel: usize, sample: f32) {
        if let Some(buffer) = self.buffers.get_mut(channel) {
            buffer[self.write_pos] = sample;
        }
    }

    /// Reads `channel` at `write_position - delay_samples` with linear interpolation.
    ///
    /// `delay_samples` is clamped into `[0, capacity - 1]`. Reads from channels
    /// `>= CHANNELS` return silence.
    #[inline]
    pub fn read_interpolated(&self, channel: usize, delay_samples: f32) -> f32 {
        let Some(buffer) = self.buffers.get(channel) else {
            return 0.0;
        };

        let len = buffer.len();
        let len_f = len as f32;
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);

        let mut read_pos = self.write_pos as f32 - delay;
        if read_pos < 0.0 {
            read_pos += len_f;
        }

        let floor = floorf(read_pos);
        let frac = read_pos - floor;
        // f32 rounding can land exactly on len when read_pos is a hair below it
        let idx0 = (floor as usize) % len;
        let idx1 = (idx0 + 1) % len;

        let a = buffer[idx0];
        let b = buffer[idx1];
        (1.0 - frac) * a + frac * b
    }

    /// Advances the shared write cursor by one frame, wrapping at capacity.
    #[inline]
    pub fn advance(&mut self) {
        self.write_pos += 1;
        if self.write_pos == self.capacity() {
            self.write_pos = 0;
        }
    }

    /// Current write cursor, in `[0, capacity)`.
    #[inline]
    pub fn write_position(&self) -> usize {
        self.write_pos
    }

    /// Zeroes all channels and rewinds the cursor. Never reallocates.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        self.write_pos = 0;
    }

    /// Capacity in frames per channel.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffers[0].len()
    }
}
