//! Single-producer/single-consumer handoff of decibel readings.
//!
//! The producer half lives inside the audio callback and must never block, so a
//! full channel evicts its oldest value instead of waiting for the consumer.
//!
//! The consumer only polls. Nothing ever parks on either end, so `try_send`
//! never finds a waiter to lock or unpark.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Create a bounded channel of decibel readings with overwrite-on-full semantics.
pub fn sample_channel(capacity: usize) -> (SampleSender, SampleReceiver) {
    let (tx, rx) = bounded::<f64>(capacity.max(1));
    let overwritten = Arc::new(AtomicUsize::new(0));
    (
        SampleSender {
            tx,
            evict: rx.clone(),
            overwritten: overwritten.clone(),
        },
        SampleReceiver { rx, overwritten },
    )
}

/// Real-time side of the channel.
pub struct SampleSender {
    tx: Sender<f64>,
    // Only used to pop the oldest reading when the buffer is full.
    evict: Receiver<f64>,
    overwritten: Arc<AtomicUsize>,
}

impl SampleSender {
    /// Push one reading without blocking. Returns `false` if the reading was not queued.
    pub fn push(&self, db: f64) -> bool {
        let mut value = db;
        for _ in 0..2 {
            match self.tx.try_send(value) {
                Ok(()) => return true,
                Err(TrySendError::Full(rejected)) => {
                    value = rejected;
                    if self.evict.try_recv().is_ok() {
                        self.overwritten.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
        // Still full after one eviction: the new reading is the one we lose.
        self.overwritten.fetch_add(1, Ordering::Relaxed);
        false
    }
}

/// Aggregator side of the channel. Polling only.
pub struct SampleReceiver {
    rx: Receiver<f64>,
    overwritten: Arc<AtomicUsize>,
}

impl SampleReceiver {
    /// Oldest queued reading. `Disconnected` only once the queue is empty and
    /// the sender is gone.
    pub fn try_recv(&self) -> Result<f64, TryRecvError> {
        self.rx.try_recv()
    }

    /// Number of readings currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Readings dropped because the consumer fell behind.
    pub fn overwritten(&self) -> usize {
        self.overwritten.load(Ordering::Relaxed)
    }
}
