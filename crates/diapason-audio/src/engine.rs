//! Block producer: voices → PCM16 → global effects → buffer pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use diapason_core::{BlockEffect, unit_to_i16};
use diapason_effects::{GlobalDistortion, GlobalFilter};
use diapason_synth::{Patch, SynthEvent, master_gain, ui_volume_to_synth};
use diapason_touch::Clock;

use crate::Result;
use crate::coordinator::{CoordinatorConfig, CoordinatorStats, RenderCoordinator, RenderOutcome};
use crate::params::EngineParams;
use crate::pool::{BufferFormat, BufferPool};

/// Default sample rate when no device dictates one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Frames per rendered block.
pub const DEFAULT_BLOCK_FRAMES: usize = 256;
/// Buffers in the output pool.
pub const POOL_BUFFERS: usize = 3;
/// The render path is always stereo.
pub const CHANNELS: u16 = 2;

/// Engine geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per block.
    pub block_frames: usize,
    /// Pool size.
    pub pool_buffers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_frames: DEFAULT_BLOCK_FRAMES,
            pool_buffers: POOL_BUFFERS,
        }
    }
}

/// Milliseconds of audio rendered so far.
///
/// Control timing runs on this clock rather than wall time, so a script
/// rendered to a file plays out exactly as it would live.
#[derive(Debug, Clone)]
pub struct SampleClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl SampleClock {
    fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1),
        }
    }

    /// Frames rendered.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::AcqRel);
    }
}

impl Clock for SampleClock {
    fn now_ms(&self) -> u64 {
        self.frames() * 1000 / u64::from(self.sample_rate)
    }
}

/// Renders blocks into the pool.
///
/// Each block: drain pending synth events, render both halves through the
/// [`RenderCoordinator`], scale by master volume, convert to PCM16, run
/// distortion then filter, and hand the block to the pool.
#[derive(Debug)]
pub struct AudioEngine {
    config: EngineConfig,
    coordinator: RenderCoordinator,
    events: Receiver<SynthEvent>,
    sender: Sender<SynthEvent>,
    params: Arc<EngineParams>,
    distortion: GlobalDistortion,
    filter: GlobalFilter,
    pool: Arc<BufferPool>,
    mix: Vec<f32>,
    block: Vec<i16>,
    clock: SampleClock,
    patch: Option<u8>,
    dropped_blocks: u64,
}

impl AudioEngine {
    /// Builds the pool and starts the render worker.
    pub fn new(config: EngineConfig, params: Arc<EngineParams>) -> Result<Self> {
        let sample_rate = config.sample_rate as f32;
        let coordinator =
            RenderCoordinator::spawn(CoordinatorConfig::new(sample_rate, config.block_frames))?;
        let pool = Arc::new(BufferPool::new(
            BufferFormat::pcm16(config.sample_rate, CHANNELS),
            config.pool_buffers,
            config.block_frames,
        ));
        let (sender, events) = unbounded();
        let samples = config.block_frames * usize::from(CHANNELS);

        tracing::info!(
            sample_rate = config.sample_rate,
            block_frames = config.block_frames,
            buffers = config.pool_buffers,
            "audio engine started"
        );

        Ok(Self {
            config,
            coordinator,
            events,
            sender,
            params,
            distortion: GlobalDistortion::new(),
            filter: GlobalFilter::new(sample_rate),
            pool,
            mix: vec![0.0; samples],
            block: vec![0; samples],
            clock: SampleClock::new(config.sample_rate),
            patch: None,
            dropped_blocks: 0,
        })
    }

    /// Engine geometry.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Queue end for a [`NoteDispatcher`](diapason_synth::NoteDispatcher).
    pub fn event_sender(&self) -> Sender<SynthEvent> {
        self.sender.clone()
    }

    /// Shared parameters.
    pub fn params(&self) -> &Arc<EngineParams> {
        &self.params
    }

    /// Output pool, for sinks.
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Rendered-time clock.
    pub fn clock(&self) -> SampleClock {
        self.clock.clone()
    }

    /// Render split counters.
    pub fn render_stats(&self) -> CoordinatorStats {
        self.coordinator.stats()
    }

    /// Blocks rendered with no free buffer to land in.
    pub fn dropped_blocks(&self) -> u64 {
        self.dropped_blocks
    }

    /// Halts the render worker; all strings render on this thread.
    pub fn suspend(&mut self) {
        self.coordinator.suspend();
    }

    /// Restarts the render worker.
    pub fn resume(&mut self) -> Result<()> {
        self.coordinator.resume()
    }

    /// Renders one block, waiting for a free buffer if the pool is full.
    pub fn fill_block(&mut self) -> RenderOutcome {
        self.fill(true).0
    }

    /// Renders one block. If no buffer is free the block is dropped and
    /// `false` returned.
    pub fn try_fill_block(&mut self) -> bool {
        self.fill(false).1
    }

    /// Keeps rendering until `ms` of audio has been produced.
    pub fn delay_ms(&mut self, ms: u64) {
        let start = self.clock.now_ms();
        while self.clock.now_ms() - start < ms {
            self.fill_block();
        }
    }

    fn fill(&mut self, block: bool) -> (RenderOutcome, bool) {
        let params = self.params.snapshot();
        if self.patch != Some(params.patch) {
            let patch = Patch::lookup(params.patch);
            tracing::debug!(patch = params.patch, name = patch.name, "patch loaded");
            self.coordinator.set_patch(patch);
            self.patch = Some(params.patch);
        }

        let outcome = self.coordinator.render(self.events.try_iter(), &mut self.mix);

        let gain = master_gain(ui_volume_to_synth(params.volume));
        for (dst, &src) in self.block.iter_mut().zip(&self.mix) {
            *dst = unit_to_i16(src * gain);
        }

        if self.distortion.enabled() != params.distortion_enabled {
            self.distortion.set_enabled(params.distortion_enabled);
        }
        self.distortion
            .configure(params.distortion_level, params.distortion_gain);
        if self.filter.enabled() != params.filter_enabled {
            self.filter.set_enabled(params.filter_enabled);
        }
        self.filter
            .configure(params.filter_cutoff_hz, params.filter_resonance);

        let channels = usize::from(CHANNELS);
        self.distortion.process_block(&mut self.block, channels);
        self.filter.process_block(&mut self.block, channels);

        let frames = self.config.block_frames;
        self.clock.advance(frames);

        let Some(mut buf) = self.pool.acquire_free(block) else {
            self.dropped_blocks += 1;
            return (outcome, false);
        };
        buf.storage_mut()[..self.block.len()].copy_from_slice(&self.block);
        buf.set_sample_count(frames);
        // the buffer came from this pool, so it cannot be rejected
        let _ = self.pool.release_filled(buf);
        (outcome, true)
    }
}
