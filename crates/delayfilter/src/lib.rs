//! Delayfilter - real-time stereo delay/filter engine
//!
//! Five switchable algorithms share one delay line, one LFO and one
//! parameter table:
//!
//! | Mode | Algorithm |
//! |------|-----------|
//! | Comb | Feedback comb tuned to `filterFreq` |
//! | FIR | Up to 16 Hann-windowed taps spaced one period apart |
//! | IIR | RBJ low/high/band-pass with 50 ms coefficient smoothing |
//! | Phaser | Two first-order allpass stages swept by the LFO |
//! | Flanger | Comb with LFO-modulated delay |
//!
//! # Example
//!
//! ```rust
//! use delayfilter::{DelayFilter, FilterType, IirType};
//!
//! let mut engine = DelayFilter::new();
//! let params = engine.params().clone();
//! params.set_filter_type(FilterType::Iir);
//! params.set_iir_type(IirType::HighPass);
//! params.set_by_name("mix", 1.0);
//!
//! engine.prepare(44100.0, 128);
//! let mut left = [0.5f32; 128];
//! let mut right = [0.5f32; 128];
//! engine.process_block(&mut left, &mut right);
//!
//! // A high-pass removes DC
//! assert!(left[127].abs() < 0.5);
//!
//! let blob = engine.get_state().unwrap();
//! let restored = DelayFilter::new();
//! restored.set_state(&blob);
//! assert_eq!(restored.params().snapshot(), params.snapshot());
//! ```
//!
//! # Real-time Safety
//!
//! Only [`DelayFilter::prepare`] allocates. The process calls take no locks,
//! never allocate and never log.

pub mod engine;
pub mod error;
pub mod modes;
pub mod params;
pub mod state;

pub use engine::{DelayFilter, MAX_DELAY_SECONDS, SMOOTHING_MS};
pub use error::StateError;
pub use modes::phaser_coefficient;
pub use params::{DESCRIPTORS, FilterType, IirType, PARAM_COUNT, ParamSnapshot, ParameterSet};
pub use state::{STATE_TYPE, STATE_VERSION};
