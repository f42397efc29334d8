//! Session lifecycle: owns the microphone stream, the aggregator and both timers.
//!
//! Everything here runs on the thread that calls [`SessionController::pump`].
//! The audio callback only ever talks to the controller through the sample
//! channel and the empty-input flag.

mod timers;

pub use timers::{Clock, IntervalTimer, Stopwatch, SystemClock};

use crate::audio::{
    sample_channel, LevelSampler, Microphone, MicrophoneError, SampleReceiver, DEFAULT_BLOCK_LEN,
};
use crate::config::{MeterSettings, DEFAULT_CHANNEL_CAPACITY};
use crate::log_debug;
use crate::meter::{
    DisplayRange, DisplaySink, ExposurePolicy, ExposureStatus, FlushMode, LevelAggregator,
    MeterStats,
};
use crossbeam_channel::TryRecvError;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

/// Engine knobs fixed for the lifetime of a controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub range: DisplayRange,
    pub policy: ExposurePolicy,
    pub block_len: usize,
    pub channel_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            range: DisplayRange::default(),
            policy: ExposurePolicy::default(),
            block_len: DEFAULT_BLOCK_LEN,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Paused,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Paused => "paused",
        }
    }
}

/// Resources that exist only while Running.
struct ActiveRun<S> {
    stream: S,
    samples: SampleReceiver,
    empty_input: Arc<AtomicBool>,
    empty_reported: bool,
    disconnected: bool,
}

impl<S> ActiveRun<S> {
    /// Fold every queued reading. Reports a vanished producer once.
    fn drain_into(&mut self, aggregator: &mut LevelAggregator) -> usize {
        let mut folded = 0;
        loop {
            match self.samples.try_recv() {
                Ok(db) => {
                    if aggregator.update(db) {
                        folded += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        self.disconnected = true;
                        tracing::warn!("audio stream stopped delivering samples");
                        log_debug("sample channel disconnected; audio callback is gone");
                    }
                    break;
                }
            }
        }
        folded
    }
}

pub struct SessionController<M, S, D>
where
    M: Microphone,
    S: MeterSettings,
    D: DisplaySink,
{
    microphone: M,
    settings: S,
    display: D,
    clock: Box<dyn Clock>,
    aggregator: LevelAggregator,
    flush_timer: IntervalTimer,
    stopwatch: Stopwatch,
    state: SessionState,
    active: Option<ActiveRun<M::Stream>>,
    block_len: usize,
    channel_capacity: usize,
    last_exposure: ExposureStatus,
    empty_input_seen: bool,
}

impl<M, S, D> SessionController<M, S, D>
where
    M: Microphone,
    S: MeterSettings,
    D: DisplaySink,
{
    pub fn new(microphone: M, settings: S, display: D, options: SessionOptions) -> Self {
        Self {
            microphone,
            settings,
            display,
            clock: Box::new(SystemClock),
            aggregator: LevelAggregator::new(options.range, options.policy),
            flush_timer: IntervalTimer::new(),
            stopwatch: Stopwatch::new(),
            state: SessionState::Idle,
            active: None,
            block_len: options.block_len.max(1),
            channel_capacity: options.channel_capacity.max(1),
            last_exposure: ExposureStatus::Ok,
            empty_input_seen: false,
        }
    }

    /// Swap the time source. Intended for use before the first `start`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> MeterStats {
        self.aggregator.stats()
    }

    pub fn range(&self) -> DisplayRange {
        self.aggregator.range()
    }

    /// Calibration offset of the current (or last) run.
    pub fn calibration_db(&self) -> f64 {
        self.aggregator.calibration_db()
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed(self.clock.now())
    }

    pub fn exposure(&self) -> ExposureStatus {
        self.last_exposure
    }

    /// Whether the device has delivered an empty buffer since the last reset.
    pub fn empty_input_seen(&self) -> bool {
        self.empty_input_seen
    }

    /// Readings evicted from a full channel during the current run.
    pub fn overwritten_readings(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |run| run.samples.overwritten())
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn microphone(&self) -> &M {
        &self.microphone
    }

    pub fn microphone_mut(&mut self) -> &mut M {
        &mut self.microphone
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Settings changes take effect on the next `start`.
    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    /// Period of the running flush timer.
    pub fn flush_interval(&self) -> Option<Duration> {
        self.flush_timer
            .is_running()
            .then(|| self.flush_timer.period())
    }

    /// Open the microphone and begin (or continue) metering.
    ///
    /// A failed acquire leaves the session exactly as it was.
    pub fn start(&mut self) -> Result<(), MicrophoneError> {
        if self.state == SessionState::Running {
            return Ok(());
        }

        let calibration_db = self.settings.calibration_db();
        let interval = self.settings.flush_interval();

        let (sender, samples) = sample_channel(self.channel_capacity);
        let sampler = LevelSampler::new(self.block_len, sender);
        let empty_input = sampler.empty_input_flag();
        let stream = match self.microphone.acquire(sampler) {
            Ok(stream) => stream,
            Err(err) => {
                log_debug(&format!("session start failed: {err}"));
                tracing::warn!(error = %err, "microphone acquire failed");
                return Err(err);
            }
        };

        self.active = Some(ActiveRun {
            stream,
            samples,
            empty_input,
            empty_reported: false,
            disconnected: false,
        });
        self.aggregator.set_calibration(calibration_db);
        self.aggregator.resume();

        let now = self.clock.now();
        self.flush_timer.start(interval, now);
        self.stopwatch.start(now);
        let resumed = self.state == SessionState::Paused;
        self.state = SessionState::Running;

        tracing::info!(
            calibration_db,
            flush_interval_ms = interval.as_millis() as u64,
            resumed,
            "session running"
        );
        log_debug(&format!(
            "session running (calibration {calibration_db:+.1} dB, flush {} ms, resumed {resumed})",
            interval.as_millis()
        ));

        self.publish(FlushMode::Peak);
        Ok(())
    }

    /// Release the microphone and freeze statistics and elapsed time.
    pub fn pause(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        self.aggregator.halt();
        self.release_active();
        self.flush_timer.stop();
        self.publish(FlushMode::Instantaneous);
        self.stopwatch.pause(self.clock.now());
        self.state = SessionState::Paused;
        tracing::info!(elapsed_secs = self.elapsed().as_secs_f64(), "session paused");
        log_debug("session paused");
    }

    /// Drop every statistic and return to Idle with a floor frame on the display.
    pub fn reset(&mut self) {
        match self.state {
            SessionState::Idle => return,
            SessionState::Running => self.pause(),
            SessionState::Paused => {}
        }
        self.aggregator.reset();
        self.stopwatch.reset();
        self.last_exposure = ExposureStatus::Ok;
        self.empty_input_seen = false;
        self.state = SessionState::Idle;
        self.publish(FlushMode::Instantaneous);
        tracing::info!("session reset");
        log_debug("session reset");
    }

    /// Drive the aggregator context once.
    ///
    /// Drains queued readings. When nothing was queued it sleeps up to
    /// `max_wait` (bounded by the next flush) and drains again, then fires the
    /// flush timer if due. Returns the number of readings folded into the
    /// statistics.
    pub fn pump(&mut self, max_wait: Duration) -> usize {
        if self.state != SessionState::Running {
            return 0;
        }
        let Some(run) = self.active.as_mut() else {
            return 0;
        };

        let mut folded = run.drain_into(&mut self.aggregator);

        let now = self.clock.now();
        if folded == 0 && !self.flush_timer.is_due(now) {
            let wait = self
                .flush_timer
                .remaining(now)
                .map_or(max_wait, |left| left.min(max_wait));
            if !wait.is_zero() {
                // Never park on the channel; the callback must not find a waiter.
                thread::sleep(wait);
                folded += run.drain_into(&mut self.aggregator);
            }
        }

        if !run.empty_reported && run.empty_input.load(Ordering::Relaxed) {
            run.empty_reported = true;
            self.empty_input_seen = true;
            tracing::warn!("audio device delivered an empty buffer");
            log_debug("audio callback received an empty buffer");
        }

        if self.flush_timer.poll(self.clock.now()) {
            self.publish(FlushMode::Peak);
        }
        folded
    }

    fn publish(&mut self, mode: FlushMode) {
        let elapsed_secs = self.elapsed().as_secs_f64();
        let frame = self.aggregator.flush(mode, elapsed_secs);
        self.surface_exposure(frame.exposure, frame.average_db);
        self.display.show(&frame);
    }

    fn surface_exposure(&mut self, status: ExposureStatus, average_db: f64) {
        if status == self.last_exposure {
            return;
        }
        let previous = self.last_exposure;
        self.last_exposure = status;
        match status {
            ExposureStatus::AboveLimit => tracing::error!(
                average_db,
                previous = previous.label(),
                "running average above the exposure limit"
            ),
            ExposureStatus::AboveThreshold => tracing::warn!(
                average_db,
                previous = previous.label(),
                "running average above the exposure threshold"
            ),
            ExposureStatus::Ok => tracing::info!(
                average_db,
                previous = previous.label(),
                "exposure back within limits"
            ),
        }
        log_debug(&format!(
            "exposure {} -> {} (average {average_db:.1} dB)",
            previous.label(),
            status.label()
        ));
    }

    fn release_active(&mut self) {
        let Some(run) = self.active.take() else {
            return;
        };
        let overwritten = run.samples.overwritten();
        if overwritten > 0 {
            log_debug(&format!(
                "sample channel overwrote {overwritten} readings this run"
            ));
        }
        // Readings still queued belong to the released run and are dropped here.
        drop(run.samples);
        if let Err(err) = self.microphone.release(run.stream) {
            log_debug(&format!("microphone release failed: {err:#}"));
            tracing::warn!(error = %err, "microphone release failed");
        }
    }
}

impl<M, S, D> Drop for SessionController<M, S, D>
where
    M: Microphone,
    S: MeterSettings,
    D: DisplaySink,
{
    fn drop(&mut self) {
        self.release_active();
    }
}
