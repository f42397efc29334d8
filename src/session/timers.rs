//! Start/stop controlled timers for the aggregator context.
//!
//! Both timers are driven by explicit instants from a [`Clock`], so the owning
//! loop decides when they are polled and tests can move time by hand.

use std::time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Source of "now" for the session.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fixed-period timer polled by the owner.
#[derive(Debug, Clone, Default)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, period: Duration, now: Instant) {
        self.period = period.max(MIN_PERIOD);
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Time left before the next tick, `None` when stopped.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Returns `true` once per elapsed period. Missed ticks collapse into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.period;
        if next <= now {
            next = now + self.period;
        }
        self.next_due = Some(next);
        true
    }
}

/// Elapsed exposure time that freezes while paused.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = None;
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_timer_fires_once_per_period() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new();
        assert!(!timer.poll(t0));
        timer.start(Duration::from_millis(200), t0);
        assert!(!timer.poll(t0 + Duration::from_millis(199)));
        assert!(timer.poll(t0 + Duration::from_millis(200)));
        assert!(!timer.poll(t0 + Duration::from_millis(250)));
        assert!(timer.poll(t0 + Duration::from_millis(400)));
    }

    #[test]
    fn interval_timer_collapses_missed_ticks() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new();
        timer.start(Duration::from_millis(100), t0);
        let late = t0 + Duration::from_millis(1_050);
        assert!(timer.poll(late));
        assert!(!timer.poll(late));
        assert_eq!(timer.remaining(late), Some(Duration::from_millis(100)));
    }

    #[test]
    fn interval_timer_stops() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new();
        timer.start(Duration::from_millis(10), t0);
        timer.stop();
        assert!(!timer.is_running());
        assert!(!timer.poll(t0 + Duration::from_secs(1)));
        assert_eq!(timer.remaining(t0), None);
    }

    #[test]
    fn zero_period_is_clamped() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new();
        timer.start(Duration::ZERO, t0);
        assert_eq!(timer.period(), MIN_PERIOD);
    }

    #[test]
    fn stopwatch_freezes_while_paused() {
        let t0 = Instant::now();
        let mut watch = Stopwatch::new();
        watch.start(t0);
        watch.pause(t0 + Duration::from_secs(10));
        assert_eq!(watch.elapsed(t0 + Duration::from_secs(60)), Duration::from_secs(10));
        watch.start(t0 + Duration::from_secs(60));
        assert_eq!(watch.elapsed(t0 + Duration::from_secs(65)), Duration::from_secs(15));
    }

    #[test]
    fn stopwatch_start_is_idempotent() {
        let t0 = Instant::now();
        let mut watch = Stopwatch::new();
        watch.start(t0);
        watch.start(t0 + Duration::from_secs(5));
        assert_eq!(watch.elapsed(t0 + Duration::from_secs(6)), Duration::from_secs(6));
    }

    #[test]
    fn stopwatch_reset_returns_to_zero() {
        let t0 = Instant::now();
        let mut watch = Stopwatch::new();
        watch.start(t0);
        watch.pause(t0 + Duration::from_secs(3));
        watch.reset();
        assert_eq!(watch.elapsed(t0 + Duration::from_secs(9)), Duration::ZERO);
        assert!(!watch.is_running());
    }
}
