//! Live output through cpal.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream};

use crate::convert::ChannelConverter;
use crate::pool::BufferPool;
use crate::{Error, Result};

/// Device name via `description()` (cpal 0.17+).
fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device summary.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
    /// True for the host's default output.
    pub is_default: bool,
}

/// Lists output devices on the default host.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .filter_map(|device| {
            let name = device_name(&device).ok()?;
            let config = device.default_output_config().ok();
            Some(AudioDevice {
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                default_sample_rate: config.as_ref().map_or(44_100, |c| c.sample_rate()),
                channels: config.as_ref().map_or(2, |c| c.channels()),
            })
        })
        .collect();
    Ok(devices)
}

/// Picks a device by index, exact name, or case-insensitive substring.
fn find_device_from_list(devices: Vec<Device>, name_or_index: &str) -> Result<Device> {
    if let Ok(index) = name_or_index.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {index} (only {count} devices available)"
            ))
        });
    }

    let named: Vec<(Device, String)> = devices
        .into_iter()
        .filter_map(|d| device_name(&d).ok().map(|n| (d, n)))
        .collect();

    if let Some((device, _)) = named.iter().find(|(_, n)| n == name_or_index) {
        return Ok(device.clone());
    }

    let search = name_or_index.to_lowercase();
    let mut matches = named
        .into_iter()
        .filter(|(_, n)| n.to_lowercase().contains(&search));
    let Some((device, name)) = matches.next() else {
        return Err(Error::DeviceNotFound(format!(
            "no output device matching '{name_or_index}'"
        )));
    };
    let others: Vec<String> = matches.map(|(_, n)| n).collect();
    if !others.is_empty() {
        tracing::warn!(chosen = %name, ?others, "device name is ambiguous, using first match");
    }
    Ok(device)
}

/// An opened output device with its negotiated format.
pub struct OutputDevice {
    device: Device,
    config: cpal::StreamConfig,
    name: String,
}

impl std::fmt::Debug for OutputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDevice")
            .field("name", &self.name)
            .field("sample_rate", &self.sample_rate())
            .field("channels", &self.channels())
            .finish()
    }
}

impl OutputDevice {
    /// Opens the named device, or the default output when `None`.
    pub fn open(name_or_index: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match name_or_index {
            Some(name) => {
                let devices = host
                    .output_devices()
                    .map_err(|e| Error::Stream(e.to_string()))?
                    .collect();
                find_device_from_list(devices, name)?
            }
            None => host.default_output_device().ok_or(Error::NoDevice)?,
        };
        let config = device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?
            .into();
        let name = device_name(&device).unwrap_or_else(|_| "unknown".into());
        Ok(Self {
            device,
            config,
            name,
        })
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample rate the engine must run at.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Device channel count.
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Starts draining `pool` into the device. Periods the pool cannot
    /// cover play silence.
    pub fn play(self, pool: Arc<BufferPool>) -> Result<OutputStream> {
        let underruns = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&underruns);
        let mut converter = ChannelConverter::new(self.config.channels);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    converter.fill(&pool, data);
                    counter.store(converter.underruns(), Ordering::Relaxed);
                },
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;
        stream.play().map_err(|e| Error::Stream(e.to_string()))?;

        tracing::info!(
            device = %self.name,
            sample_rate = self.sample_rate(),
            channels = self.channels(),
            "output stream playing"
        );
        Ok(OutputStream {
            _stream: stream,
            underruns,
        })
    }
}

/// A running output stream. Dropping it stops playback.
pub struct OutputStream {
    _stream: Stream,
    underruns: Arc<AtomicU64>,
}

impl OutputStream {
    /// Device periods that found no prepared audio.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}
