//! Fixed pool of PCM16 audio buffers shared by producer and consumer.
//!
//! Every buffer is allocated when the pool is built and then cycles
//! free → filled by the producer → prepared → drained by the consumer →
//! free, forever. The free list is LIFO (the most recently released
//! buffer is still warm in cache); the prepared list is FIFO so blocks are
//! played in the order they were rendered.
//!
//! Buffers move by value: a buffer is in the free list, in the prepared
//! list, or in exactly one caller's hands, never two at once. Each list has
//! its own lock and condition variable, so producer and consumer only
//! contend when they touch the same list.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Layout of the samples in every buffer of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFormat {
    /// Sample rate in Hz.
    pub sample_freq: u32,
    /// Interleaved channels per frame.
    pub channel_count: u16,
    /// Bytes per frame.
    pub sample_stride: u16,
}

impl BufferFormat {
    /// Interleaved PCM16 at `sample_freq` with `channel_count` channels.
    pub fn pcm16(sample_freq: u32, channel_count: u16) -> Self {
        Self {
            sample_freq,
            channel_count,
            sample_stride: channel_count * 2,
        }
    }
}

/// One block of interleaved PCM16 frames.
#[derive(Debug)]
pub struct AudioBuffer {
    pool_id: u64,
    slot: usize,
    format: BufferFormat,
    samples: Box<[i16]>,
    sample_count: usize,
    /// Free word for the holder; cleared on every hand-over.
    pub user_data: u64,
}

impl AudioBuffer {
    /// Sample layout.
    pub fn format(&self) -> BufferFormat {
        self.format
    }

    /// Index of this buffer within its pool.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Valid frames.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Sets the number of valid frames, capped at capacity.
    pub fn set_sample_count(&mut self, frames: usize) {
        self.sample_count = frames.min(self.max_sample_count());
    }

    /// Capacity in frames.
    pub fn max_sample_count(&self) -> usize {
        self.samples.len() / usize::from(self.format.channel_count.max(1))
    }

    /// Valid interleaved samples.
    pub fn samples(&self) -> &[i16] {
        let len = self.sample_count * usize::from(self.format.channel_count);
        &self.samples[..len]
    }

    /// The whole interleaved storage, for filling.
    pub fn storage_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }
}

/// Producer/consumer buffer pool.
///
/// ```rust
/// use diapason_audio::{BufferFormat, BufferPool};
///
/// let pool = BufferPool::new(BufferFormat::pcm16(44100, 2), 3, 256);
/// let mut buf = pool.acquire_free(false).unwrap();
/// buf.storage_mut().fill(100);
/// buf.set_sample_count(256);
/// pool.release_filled(buf).unwrap();
///
/// let played = pool.acquire_filled(false).unwrap();
/// assert_eq!(played.samples().len(), 512);
/// pool.release_free(played).unwrap();
/// assert_eq!(pool.free_len(), 3);
/// ```
#[derive(Debug)]
pub struct BufferPool {
    id: u64,
    format: BufferFormat,
    capacity: usize,
    max_sample_count: usize,
    free: Mutex<Vec<AudioBuffer>>,
    free_ready: Condvar,
    prepared: Mutex<VecDeque<AudioBuffer>>,
    prepared_ready: Condvar,
}

impl BufferPool {
    /// Allocates `count` buffers of `max_sample_count` frames each.
    pub fn new(format: BufferFormat, count: usize, max_sample_count: usize) -> Self {
        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        let len = max_sample_count * usize::from(format.channel_count);
        let free = (0..count)
            .map(|slot| AudioBuffer {
                pool_id: id,
                slot,
                format,
                samples: vec![0; len].into_boxed_slice(),
                sample_count: 0,
                user_data: 0,
            })
            .collect();

        Self {
            id,
            format,
            capacity: count,
            max_sample_count,
            free: Mutex::new(free),
            free_ready: Condvar::new(),
            prepared: Mutex::new(VecDeque::with_capacity(count)),
            prepared_ready: Condvar::new(),
        }
    }

    /// Sample layout shared by every buffer.
    pub fn format(&self) -> BufferFormat {
        self.format
    }

    /// Buffers owned by the pool in total.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames per buffer.
    pub fn max_sample_count(&self) -> usize {
        self.max_sample_count
    }

    /// Buffers waiting in the free list.
    pub fn free_len(&self) -> usize {
        self.free.lock().len()
    }

    /// Buffers waiting in the prepared list.
    pub fn prepared_len(&self) -> usize {
        self.prepared.lock().len()
    }

    /// True when `buf` was allocated by this pool.
    pub fn owns(&self, buf: &AudioBuffer) -> bool {
        buf.pool_id == self.id
    }

    /// Takes a buffer to fill. With `block`, waits for one to be released.
    pub fn acquire_free(&self, block: bool) -> Option<AudioBuffer> {
        let mut free = self.free.lock();
        loop {
            if let Some(buf) = free.pop() {
                return Some(handed_over(buf));
            }
            if !block {
                return None;
            }
            self.free_ready.wait(&mut free);
        }
    }

    /// Returns a buffer to the free list head. A foreign buffer is handed
    /// back untouched.
    pub fn release_free(&self, buf: AudioBuffer) -> Result<(), AudioBuffer> {
        if !self.owns(&buf) {
            return Err(buf);
        }
        self.free.lock().push(handed_over(buf));
        self.free_ready.notify_one();
        Ok(())
    }

    /// Takes the oldest prepared buffer. With `block`, waits for one.
    pub fn acquire_filled(&self, block: bool) -> Option<AudioBuffer> {
        let mut prepared = self.prepared.lock();
        loop {
            if let Some(buf) = prepared.pop_front() {
                return Some(handed_over(buf));
            }
            if !block {
                return None;
            }
            self.prepared_ready.wait(&mut prepared);
        }
    }

    /// Like [`acquire_filled`](Self::acquire_filled) but gives up after
    /// `timeout`.
    pub fn acquire_filled_timeout(&self, timeout: Duration) -> Option<AudioBuffer> {
        let deadline = Instant::now() + timeout;
        let mut prepared = self.prepared.lock();
        loop {
            if let Some(buf) = prepared.pop_front() {
                return Some(handed_over(buf));
            }
            if self.prepared_ready.wait_until(&mut prepared, deadline).timed_out() {
                return prepared.pop_front().map(handed_over);
            }
        }
    }

    /// Queues a filled buffer for the consumer. A foreign buffer is handed
    /// back untouched.
    pub fn release_filled(&self, buf: AudioBuffer) -> Result<(), AudioBuffer> {
        if !self.owns(&buf) {
            return Err(buf);
        }
        self.prepared.lock().push_back(handed_over(buf));
        self.prepared_ready.notify_one();
        Ok(())
    }
}

fn handed_over(mut buf: AudioBuffer) -> AudioBuffer {
    buf.user_data = 0;
    buf
}
