//! Consumer-side channel conversion.
//!
//! Output devices ask for arbitrary period sizes and channel counts; the
//! pool hands out fixed PCM16 blocks. [`ChannelConverter`] bridges the two,
//! holding on to a partly consumed producer buffer between calls.

use diapason_core::i16_to_unit;

use crate::pool::{AudioBuffer, BufferPool};

/// Copies producer frames from a pool into consumer frames.
#[derive(Debug)]
pub struct ChannelConverter {
    consumer_channels: usize,
    current: Option<AudioBuffer>,
    offset: usize,
    underruns: u64,
}

impl ChannelConverter {
    /// Converter writing `consumer_channels` interleaved channels.
    pub fn new(consumer_channels: u16) -> Self {
        Self {
            consumer_channels: usize::from(consumer_channels.max(1)),
            current: None,
            offset: 0,
            underruns: 0,
        }
    }

    /// Periods that ran out of prepared audio.
    pub fn underruns(&self) -> u64 {
        self.underruns
    }

    /// Fills `out` from prepared buffers without blocking. Frames the pool
    /// cannot supply are silence. Returns the frames taken from the pool.
    pub fn fill(&mut self, pool: &BufferPool, out: &mut [f32]) -> usize {
        let channels = self.consumer_channels;
        let frames = out.len() / channels;
        let mut written = 0;

        while written < frames {
            if self.current.is_none() {
                self.current = pool.acquire_filled(false);
                self.offset = 0;
            }
            let Some(buf) = self.current.as_ref() else {
                self.underruns += 1;
                break;
            };

            let producer_channels = usize::from(buf.format().channel_count.max(1));
            let available = buf.sample_count() - self.offset;
            let take = available.min(frames - written);
            let src = &buf.samples()[self.offset * producer_channels..];
            let dst = &mut out[written * channels..(written + take) * channels];
            convert_frames(src, producer_channels, dst, channels);

            written += take;
            self.offset += take;
            if self.offset >= buf.sample_count() {
                if let Some(done) = self.current.take() {
                    // only our own pool's buffers are ever held here
                    let _ = pool.release_free(done);
                }
            }
        }

        out[written * channels..].fill(0.0);
        written
    }

    /// Returns any partly consumed buffer to the pool.
    pub fn release(&mut self, pool: &BufferPool) {
        if let Some(buf) = self.current.take() {
            let _ = pool.release_free(buf);
        }
        self.offset = 0;
    }
}

/// Copies `dst.len() / dst_channels` frames.
///
/// Mono is duplicated into stereo; stereo into mono is averaged; extra
/// consumer channels beyond the second are silent.
fn convert_frames(src: &[i16], src_channels: usize, dst: &mut [f32], dst_channels: usize) {
    for (frame_in, frame_out) in src
        .chunks_exact(src_channels)
        .zip(dst.chunks_exact_mut(dst_channels))
    {
        let left = i16_to_unit(frame_in[0]);
        let right = frame_in.get(1).map_or(left, |&s| i16_to_unit(s));
        match frame_out {
            [mono] => *mono = if src_channels == 1 { left } else { (left + right) * 0.5 },
            [l, r, rest @ ..] => {
                *l = left;
                *r = right;
                rest.fill(0.0);
            }
            [] => {}
        }
    }
}
