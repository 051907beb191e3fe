//! Diapason Effects - global per-block stages
//!
//! Both stages run in place on the mixed, interleaved PCM16 block, in this
//! order, once per audio period:
//!
//! - [`GlobalDistortion`] - Cubic waveshaper with drive-dependent clip and level mix
//! - [`GlobalFilter`] - Resonant 24 dB/oct low-pass built from cascaded [`Lpf24`] sections
//!
//! Each stage leaves the block byte-identical while disabled.
//!
//! ## Example
//!
//! ```rust
//! use diapason_core::{BlockEffect, Serial};
//! use diapason_effects::{GlobalDistortion, GlobalFilter};
//!
//! let mut stages = Serial::new(GlobalDistortion::new(), GlobalFilter::new(44100.0));
//! stages.first.set_enabled(true);
//! stages.second.set_enabled(true);
//!
//! let mut block = [0i16; 512];
//! stages.process_block(&mut block, 2);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod distortion;
pub mod filter;

pub use distortion::GlobalDistortion;
pub use filter::{GlobalFilter, Lpf24, channel_peak};
