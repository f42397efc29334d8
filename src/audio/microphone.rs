//! Microphone collaborator interface.

use super::sampler::LevelSampler;
use anyhow::Result;
use thiserror::Error;

/// Why the microphone could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MicrophoneError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no audio input device available")]
    NoDevice,
    #[error("input device '{0}' not found")]
    DeviceNotFound(String),
    #[error("input device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Source of live audio that feeds a [`LevelSampler`].
///
/// `acquire` either returns a running stream or leaves nothing allocated.
/// `release` must tear the stream down before returning.
pub trait Microphone {
    type Stream;

    fn acquire(&mut self, sampler: LevelSampler) -> Result<Self::Stream, MicrophoneError>;

    fn release(&mut self, stream: Self::Stream) -> Result<()>;
}
