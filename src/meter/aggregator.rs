//! Running session statistics.
//!
//! Levels are averaged in the energy domain (Leq): decibels are a log power
//! ratio, so each reading is converted back to power, averaged, and converted
//! again. Every published value is clamped into the display range.

use super::display::{format_elapsed, DisplayFrame, DisplayRange};
use super::exposure::ExposurePolicy;

/// Lowest calibrated level; calibration never drives a reading negative.
pub const CALIBRATED_FLOOR_DB: f64 = 0.0;

/// Which value a flush publishes as the headline level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Loudest reading since the previous flush; the window restarts afterwards.
    #[default]
    Peak,
    /// The latest reading as-is, leaving the local peak untouched.
    Instantaneous,
}

/// Unclamped statistics since the last reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterStats {
    pub current_db: f64,
    pub local_peak_db: f64,
    pub running_average_db: f64,
    pub sample_count: u64,
    pub global_peak_db: f64,
}

impl Default for MeterStats {
    /// Every level at [`CALIBRATED_FLOOR_DB`], whatever the display range.
    fn default() -> Self {
        Self {
            current_db: CALIBRATED_FLOOR_DB,
            local_peak_db: CALIBRATED_FLOOR_DB,
            running_average_db: CALIBRATED_FLOOR_DB,
            sample_count: 0,
            global_peak_db: CALIBRATED_FLOOR_DB,
        }
    }
}

pub struct LevelAggregator {
    range: DisplayRange,
    policy: ExposurePolicy,
    calibration_db: f64,
    accepting: bool,
    stats: MeterStats,
}

impl LevelAggregator {
    pub fn new(range: DisplayRange, policy: ExposurePolicy) -> Self {
        Self {
            range,
            policy,
            calibration_db: 0.0,
            accepting: false,
            stats: MeterStats::default(),
        }
    }

    pub fn stats(&self) -> MeterStats {
        self.stats
    }

    pub fn range(&self) -> DisplayRange {
        self.range
    }

    pub fn policy(&self) -> &ExposurePolicy {
        &self.policy
    }

    pub fn calibration_db(&self) -> f64 {
        self.calibration_db
    }

    /// Offset applied to readings from now on; past readings keep theirs.
    pub fn set_calibration(&mut self, offset_db: f64) {
        self.calibration_db = offset_db;
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Start folding readings into the statistics.
    pub fn resume(&mut self) {
        self.accepting = true;
    }

    /// Ignore further readings, e.g. ones still in flight after a pause.
    pub fn halt(&mut self) {
        self.accepting = false;
    }

    /// Fold one raw reading. Returns `false` when the reading was discarded.
    pub fn update(&mut self, raw_db: f64) -> bool {
        if !self.accepting {
            return false;
        }
        // Silence arrives as -inf and lands on the floor; NaN and +inf are noise.
        if raw_db.is_nan() || raw_db == f64::INFINITY {
            return false;
        }
        let db = (raw_db + self.calibration_db).max(CALIBRATED_FLOOR_DB);
        if !db.is_finite() {
            return false;
        }

        let stats = &mut self.stats;
        stats.current_db = db;
        stats.local_peak_db = stats.local_peak_db.max(db);

        let energy = stats.sample_count as f64 * power_ratio(stats.running_average_db)
            + power_ratio(db);
        stats.sample_count += 1;
        stats.running_average_db = 10.0 * (energy / stats.sample_count as f64).log10();

        stats.global_peak_db = stats.global_peak_db.max(db);
        true
    }

    /// Build the frame to publish and, in peak mode, restart the local window.
    pub fn flush(&mut self, mode: FlushMode, elapsed_secs: f64) -> DisplayFrame {
        let headline = match mode {
            FlushMode::Peak => self.stats.local_peak_db,
            FlushMode::Instantaneous => self.stats.current_db,
        };
        let average = if self.stats.sample_count == 0 {
            self.range.floor_db
        } else {
            self.stats.running_average_db
        };

        let current_db = self.range.clamp(headline);
        let average_db = self.range.clamp(average);
        let peak_db = self.range.clamp(self.stats.global_peak_db);
        let exposure = self.policy.evaluate(average, elapsed_secs);

        if mode == FlushMode::Peak {
            self.stats.local_peak_db = CALIBRATED_FLOOR_DB;
        }

        DisplayFrame {
            current_db,
            average_db,
            peak_db,
            elapsed_secs,
            elapsed: format_elapsed(elapsed_secs),
            band: self.range.band(current_db),
            exposure,
        }
    }

    /// Forget every reading. The gate and calibration are left as they are.
    pub fn reset(&mut self) {
        self.stats = MeterStats::default();
    }
}

#[inline]
fn power_ratio(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}
