//! Block RMS to decibel reduction, run on the audio callback thread.

use super::channel::SampleSender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fixed gain that lifts typical microphone RMS onto a 0 dB floor.
pub const REFERENCE_GAIN_DB: f64 = 94.0;

/// Samples per block, one render quantum.
pub const DEFAULT_BLOCK_LEN: usize = 128;

/// Decibel level for a block's mean square. Silence maps to negative infinity.
#[inline]
pub fn level_from_mean_square(mean_square: f64) -> f64 {
    let rms = mean_square.sqrt();
    20.0 * rms.log10() + REFERENCE_GAIN_DB
}

/// Reduce one block to a decibel level, or `None` for an empty block.
pub fn block_level_db(block: &[f32]) -> Option<f64> {
    if block.is_empty() {
        return None;
    }
    let energy: f64 = block.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    Some(level_from_mean_square(energy / block.len() as f64))
}

/// Audio-callback half of the metering pipeline.
///
/// Owned by the stream callback. It keeps a running sum of squares for the
/// first channel and pushes one reading per completed block. Nothing here
/// allocates, locks or logs; an empty buffer only raises `empty_input`, which
/// the session controller reports from its own thread.
pub struct LevelSampler {
    block_len: usize,
    sum_squares: f64,
    filled: usize,
    sender: SampleSender,
    empty_input: Arc<AtomicBool>,
}

impl LevelSampler {
    pub fn new(block_len: usize, sender: SampleSender) -> Self {
        Self {
            block_len: block_len.max(1),
            sum_squares: 0.0,
            filled: 0,
            sender,
            empty_input: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Flag raised the first time the callback sees no audio data.
    pub fn empty_input_flag(&self) -> Arc<AtomicBool> {
        self.empty_input.clone()
    }

    /// Process one whole block of mono samples.
    pub fn process_block(&mut self, block: &[f32]) {
        match block_level_db(block) {
            Some(db) => {
                self.sender.push(db);
            }
            None => self.mark_empty(),
        }
    }

    /// Feed an interleaved device buffer, keeping only the first channel.
    ///
    /// Readings are emitted every `block_len` frames regardless of how the
    /// device sizes its buffers.
    pub fn push_interleaved<T, F>(&mut self, data: &[T], channels: usize, mut convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        if data.is_empty() {
            self.mark_empty();
            return;
        }
        for sample in data.iter().copied().step_by(channels.max(1)) {
            let value = f64::from(convert(sample));
            self.sum_squares += value * value;
            self.filled += 1;
            if self.filled == self.block_len {
                let db = level_from_mean_square(self.sum_squares / self.block_len as f64);
                self.sender.push(db);
                self.sum_squares = 0.0;
                self.filled = 0;
            }
        }
    }

    fn mark_empty(&self) {
        self.empty_input.store(true, Ordering::Relaxed);
    }
}
