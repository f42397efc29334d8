//! System microphone capture via CPAL.
//!
//! Opens the input device in its native format and hands every callback
//! buffer to the [`LevelSampler`]; integer formats are normalized to f32 first.

use super::microphone::{Microphone, MicrophoneError};
use super::sampler::LevelSampler;
use crate::log_debug;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BackendSpecificError, BuildStreamError, DefaultStreamConfigError, PlayStreamError,
    SampleFormat, StreamConfig,
};

/// Input device wrapper that opens one metering stream at a time.
pub struct CpalMicrophone {
    preferred_device: Option<String>,
}

/// Open CPAL stream plus the name of the device backing it.
pub struct CpalStream {
    stream: cpal::Stream,
    device_name: String,
}

impl CpalStream {
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl CpalMicrophone {
    /// List microphone names so the CLI can expose a human-friendly selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Optionally pin a device by name; otherwise the host default is used.
    pub fn new(preferred_device: Option<&str>) -> Self {
        Self {
            preferred_device: preferred_device.map(str::to_string),
        }
    }

    fn device(&self) -> Result<cpal::Device, MicrophoneError> {
        let host = cpal::default_host();
        match self.preferred_device.as_deref() {
            Some(name) => {
                let mut devices = host
                    .input_devices()
                    .map_err(|err| MicrophoneError::Backend(err.to_string()))?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| MicrophoneError::DeviceNotFound(name.to_string()))
            }
            None => host.default_input_device().ok_or(MicrophoneError::NoDevice),
        }
    }
}

impl Microphone for CpalMicrophone {
    type Stream = CpalStream;

    fn acquire(&mut self, sampler: LevelSampler) -> Result<CpalStream, MicrophoneError> {
        let device = self.device()?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string());
        let default_config = device.default_input_config().map_err(map_config_error)?;
        let format = default_config.sample_format();
        let device_config: StreamConfig = default_config.into();
        let channels = usize::from(device_config.channels.max(1));

        log_debug(&format!(
            "Microphone config: device={device_name} format={format:?} sample_rate={}Hz channels={channels} block={}",
            device_config.sample_rate.0,
            sampler.block_len()
        ));

        // Keep stream errors out of the terminal and mirror them into the log.
        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));

        let stream = match format {
            SampleFormat::F32 => {
                let mut sampler = sampler;
                device.build_input_stream(
                    &device_config,
                    move |data: &[f32], _| sampler.push_interleaved(data, channels, |s| s),
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let mut sampler = sampler;
                device.build_input_stream(
                    &device_config,
                    move |data: &[i16], _| {
                        sampler.push_interleaved(data, channels, |s| s as f32 / 32_768.0)
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let mut sampler = sampler;
                device.build_input_stream(
                    &device_config,
                    move |data: &[u16], _| {
                        sampler.push_interleaved(data, channels, |s| {
                            (s as f32 - 32_768.0) / 32_768.0
                        })
                    },
                    err_fn,
                    None,
                )
            }
            other => return Err(MicrophoneError::UnsupportedFormat(format!("{other:?}"))),
        }
        .map_err(map_build_error)?;

        // A stream that fails to start is dropped here, so nothing stays open.
        stream.play().map_err(map_play_error)?;

        Ok(CpalStream {
            stream,
            device_name,
        })
    }

    fn release(&mut self, stream: CpalStream) -> Result<()> {
        let CpalStream {
            stream,
            device_name,
        } = stream;
        let paused = stream.pause();
        drop(stream);
        log_debug(&format!("Microphone released: {device_name}"));
        paused.map_err(|err| anyhow!("failed to pause audio stream: {err}"))
    }
}

fn map_config_error(err: DefaultStreamConfigError) -> MicrophoneError {
    match err {
        DefaultStreamConfigError::DeviceNotAvailable => {
            MicrophoneError::DeviceUnavailable("device is no longer available".to_string())
        }
        DefaultStreamConfigError::StreamTypeNotSupported => {
            MicrophoneError::UnsupportedFormat("device does not support input".to_string())
        }
        DefaultStreamConfigError::BackendSpecific { err } => classify_backend(err),
    }
}

fn map_build_error(err: BuildStreamError) -> MicrophoneError {
    match err {
        BuildStreamError::DeviceNotAvailable => {
            MicrophoneError::DeviceUnavailable("device is no longer available".to_string())
        }
        BuildStreamError::StreamConfigNotSupported => {
            MicrophoneError::UnsupportedFormat("stream config not supported".to_string())
        }
        BuildStreamError::BackendSpecific { err } => classify_backend(err),
        other => MicrophoneError::Backend(other.to_string()),
    }
}

fn map_play_error(err: PlayStreamError) -> MicrophoneError {
    match err {
        PlayStreamError::DeviceNotAvailable => {
            MicrophoneError::DeviceUnavailable("device is no longer available".to_string())
        }
        PlayStreamError::BackendSpecific { err } => classify_backend(err),
    }
}

fn classify_backend(err: BackendSpecificError) -> MicrophoneError {
    classify_backend_description(&err.description)
}

/// Hosts report permission and busy failures only through free-form text.
pub(super) fn classify_backend_description(description: &str) -> MicrophoneError {
    let lowered = description.to_ascii_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") {
        MicrophoneError::PermissionDenied
    } else if lowered.contains("busy") || lowered.contains("in use") {
        MicrophoneError::DeviceUnavailable(description.to_string())
    } else {
        MicrophoneError::Backend(description.to_string())
    }
}

/// Platform hint printed alongside acquisition failures.
pub fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}
