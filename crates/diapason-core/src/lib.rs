//! Diapason Core - block DSP primitives for the fretboard synth
//!
//! The render path of the instrument ends in a handful of per-block stages
//! that run on interleaved PCM16 audio. This crate holds the pieces those
//! stages are built from, with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Block Effects
//!
//! - [`BlockEffect`] - In-place processor for interleaved PCM16 blocks
//! - [`Serial`] - Two block effects run back to back
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR section (Direct Form I)
//! - [`lowpass_coefficients`] - RBJ low-pass design from a normalized cutoff
//!
//! ## Utilities
//!
//! - Conversions: [`i16_to_unit`], [`unit_to_i16`], [`saturate_i16`], [`peak_abs`]
//! - Waveshaping: [`hard_clip`], [`cubic_shape`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! diapason-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use diapason_core::{Biquad, lowpass_coefficients, i16_to_unit, unit_to_i16};
//!
//! let mut lpf = Biquad::new();
//! lpf.set_coefficients(lowpass_coefficients(2000.0 / 44100.0, 0.7));
//!
//! let mut block = [1000i16, -1000, 1000, -1000];
//! for s in block.iter_mut() {
//!     *s = unit_to_i16(lpf.process(i16_to_unit(*s)));
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod biquad;
pub mod block;
pub mod math;

pub use biquad::{Biquad, Coefficients, MAX_CUTOFF_RATIO, MIN_CUTOFF_RATIO, lowpass_coefficients};
pub use block::{BlockEffect, Serial};
pub use math::{
    PCM16_MAX, PCM16_MIN, cubic_shape, hard_clip, i16_to_unit, peak_abs, saturate_i16, unit_to_i16,
};
