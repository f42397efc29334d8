//! Real-time side of the meter.
//!
//! A CPAL input stream feeds the [`LevelSampler`] on the audio callback thread,
//! which reduces each fixed-size block to one decibel reading and hands it to
//! the aggregator through the overwrite-on-full [`sample_channel`].

mod channel;
mod microphone;
mod recorder;
mod sampler;

pub use channel::{sample_channel, SampleReceiver, SampleSender};
pub use microphone::{Microphone, MicrophoneError};
pub use recorder::{mic_permission_hint, CpalMicrophone, CpalStream};
pub use sampler::{
    block_level_db, level_from_mean_square, LevelSampler, DEFAULT_BLOCK_LEN, REFERENCE_GAIN_DB,
};
