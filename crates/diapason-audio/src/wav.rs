//! Offline output: drain the pool into a 16-bit WAV file.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::pool::BufferPool;
use crate::{Error, Result};

const POLL: Duration = Duration::from_millis(20);

/// Background writer consuming prepared buffers.
///
/// The writer keeps returning buffers to the pool even after a write
/// error, so the producer never stalls; the error is reported by
/// [`finish`](Self::finish).
#[derive(Debug)]
pub struct WavRecorder {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Result<u64>>,
}

impl WavRecorder {
    /// Creates the file and starts draining `pool` into it.
    pub fn spawn<P: AsRef<Path>>(path: P, pool: Arc<BufferPool>) -> Result<Self> {
        let format = pool.format();
        let spec = WavSpec {
            channels: format.channel_count,
            sample_rate: format.sample_freq,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path.as_ref(), spec)?;
        tracing::info!(path = %path.as_ref().display(), "recording to wav");

        let stop = Arc::new(AtomicBool::new(false));
        let stopping = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("diapason-wav".into())
            .spawn(move || {
                let mut frames = 0u64;
                let mut failure = None;
                loop {
                    match pool.acquire_filled_timeout(POLL) {
                        Some(buf) => {
                            if failure.is_none() {
                                let written = buf
                                    .samples()
                                    .iter()
                                    .try_for_each(|&s| writer.write_sample(s));
                                match written {
                                    Ok(()) => frames += buf.sample_count() as u64,
                                    Err(err) => {
                                        tracing::error!(%err, "wav write failed");
                                        failure = Some(err);
                                    }
                                }
                            }
                            let _ = pool.release_free(buf);
                        }
                        None if stopping.load(Ordering::Acquire) => break,
                        None => {}
                    }
                }
                if let Some(err) = failure {
                    return Err(err.into());
                }
                writer.finalize()?;
                Ok(frames)
            })?;

        Ok(Self { stop, handle })
    }

    /// Writes whatever is still prepared, closes the file and returns the
    /// frame count.
    pub fn finish(self) -> Result<u64> {
        self.stop.store(true, Ordering::Release);
        self.handle
            .join()
            .map_err(|_| Error::Stream("wav writer thread panicked".into()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::BufferFormat;

    #[test]
    fn test_records_prepared_buffers() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let pool = Arc::new(BufferPool::new(BufferFormat::pcm16(44100, 2), 3, 8));

        let recorder = WavRecorder::spawn(file.path(), Arc::clone(&pool)).unwrap();
        for value in [100i16, 200, 300, 400] {
            let mut buf = pool.acquire_free(true).unwrap();
            buf.storage_mut().fill(value);
            buf.set_sample_count(8);
            pool.release_filled(buf).unwrap();
        }
        assert_eq!(recorder.finish().unwrap(), 32);
        assert_eq!(pool.free_len(), 3);

        let mut reader = hound::WavReader::open(file.path()).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 64);
        assert_eq!(samples[0], 100);
        assert_eq!(samples[63], 400);
    }
}
