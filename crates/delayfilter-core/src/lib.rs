//! Delayfilter Core - DSP primitives for the delayfilter engine
//!
//! Building blocks for a block-based stereo delay/filter processor, designed
//! for real-time audio with zero allocation in the audio path.
//!
//! # Primitives
//!
//! - [`DelayLine`] - Two-channel ring buffer with linear fractional reads
//! - [`Lfo`] - Sine phase accumulator in radians
//! - [`LinearSmoothedParam`] - Constant-rate parameter ramps
//! - [`Biquad`] - Second-order IIR section with RBJ cookbook coefficients
//! - [`FirstOrderAllpass`] - Phase-shift stage for phasers
//! - [`ParamDescriptor`] - Parameter metadata (range, default, scale, labels)
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build for embedded targets:
//!
//! ```toml
//! [dependencies]
//! delayfilter-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: buffers are sized once, never during processing
//! - **No dependencies on std**: `libm` for math
//! - **Structurally bounded**: indices wrap, coefficients clamp

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod delay;
pub mod lfo;
pub mod math;
pub mod param;
pub mod param_info;

pub use allpass::{FirstOrderAllpass, allpass_coefficient};
pub use biquad::{
    Biquad, BiquadCoefficients, RawCoefficients, bandpass_coefficients, highpass_coefficients,
    lowpass_coefficients,
};
pub use delay::{CHANNELS, DelayLine};
pub use lfo::Lfo;
pub use math::{flush_denormal, ms_to_samples, wet_dry_mix};
pub use param::LinearSmoothedParam;
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit};
