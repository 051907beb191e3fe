//! Audio rendering and output for the Diapason fretboard controller.
//!
//! This crate turns [`SynthEvent`](diapason_synth::SynthEvent)s into PCM16
//! blocks and moves them to a sink.
//!
//! # Core Abstractions
//!
//! ## BufferPool
//!
//! [`BufferPool`] holds a fixed set of [`AudioBuffer`]s cycling between a
//! free list (LIFO) and a prepared queue (FIFO). Producers acquire free,
//! fill, release filled; consumers do the reverse.
//!
//! ## RenderCoordinator
//!
//! [`RenderCoordinator`] splits each block between the calling thread
//! (strings 0 and 1) and a render worker (strings 2 and 3). A worker that
//! misses the deadline costs its half of one block, never the whole block.
//!
//! ## AudioEngine
//!
//! [`AudioEngine`] runs the per-block chain: voices, master volume, PCM16,
//! distortion, filter, pool.
//!
//! ## Sinks
//!
//! [`OutputDevice`] plays the pool through cpal; [`WavRecorder`] writes it
//! to a file.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use diapason_audio::{AudioEngine, EngineConfig, EngineParams, WavRecorder};
//! use diapason_synth::SynthEvent;
//!
//! let mut engine = AudioEngine::new(EngineConfig::default(), Arc::new(EngineParams::default()))?;
//! let recorder = WavRecorder::spawn("out.wav", Arc::clone(engine.pool()))?;
//! engine.event_sender().send(SynthEvent::note_on(0, 55)).ok();
//! engine.delay_ms(500);
//! recorder.finish()?;
//! # Ok::<(), diapason_audio::Error>(())
//! ```

pub mod convert;
pub mod coordinator;
pub mod engine;
pub mod params;
pub mod pool;
pub mod stream;
pub mod wav;

pub use convert::ChannelConverter;
pub use coordinator::{
    CoordinatorConfig, CoordinatorState, CoordinatorStats, READY_TIMEOUT, RENDER_TIMEOUT,
    RenderCoordinator, RenderOutcome,
};
pub use engine::{
    AudioEngine, CHANNELS, DEFAULT_BLOCK_FRAMES, DEFAULT_SAMPLE_RATE, EngineConfig, POOL_BUFFERS,
    SampleClock,
};
pub use params::{AtomicParam, EngineParams, ParamSnapshot};
pub use pool::{AudioBuffer, BufferFormat, BufferPool};
pub use stream::{AudioDevice, OutputDevice, OutputStream, list_output_devices};
pub use wav::WavRecorder;

/// Error types for rendering and output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error, including thread spawn failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
