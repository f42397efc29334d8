//! Noise exposure evaluation with a 3 dB exchange rate.
//!
//! The permissible average rises by 3 dB every time the exposure duration
//! halves relative to the reference period (equal energy).

use serde::Serialize;

/// Regulatory level over a reference period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureLimit {
    pub level_db: f64,
    pub period_secs: f64,
}

/// 80 dB sustained over an 8 hour day.
pub const DAILY_THRESHOLD: ExposureLimit = ExposureLimit {
    level_db: 80.0,
    period_secs: 8.0 * 3600.0,
};

/// Absolute ceiling associated with a 15 minute window.
pub const PEAK_LIMIT: ExposureLimit = ExposureLimit {
    level_db: 102.0,
    period_secs: 15.0 * 60.0,
};

/// Outcome of one exposure check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureStatus {
    Ok,
    AboveThreshold,
    AboveLimit,
}

impl ExposureStatus {
    pub fn label(self) -> &'static str {
        match self {
            ExposureStatus::Ok => "ok",
            ExposureStatus::AboveThreshold => "above_threshold",
            ExposureStatus::AboveLimit => "above_limit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposurePolicy {
    /// Time-tolerant threshold.
    pub threshold: ExposureLimit,
    /// Fixed hard limit, never time-adjusted.
    pub limit: ExposureLimit,
}

impl Default for ExposurePolicy {
    fn default() -> Self {
        Self {
            threshold: DAILY_THRESHOLD,
            limit: PEAK_LIMIT,
        }
    }
}

impl ExposurePolicy {
    /// Threshold adjusted for the time already elapsed, `None` before any exposure.
    pub fn adjusted_threshold(&self, elapsed_secs: f64) -> Option<f64> {
        if !(elapsed_secs.is_finite() && elapsed_secs > 0.0) {
            return None;
        }
        let tolerance = -3.0 * (elapsed_secs / self.threshold.period_secs).log2();
        Some(self.threshold.level_db + tolerance)
    }

    pub fn evaluate(&self, running_average_db: f64, elapsed_secs: f64) -> ExposureStatus {
        let Some(threshold) = self.adjusted_threshold(elapsed_secs) else {
            return ExposureStatus::Ok;
        };
        if running_average_db > self.limit.level_db {
            ExposureStatus::AboveLimit
        } else if running_average_db > threshold {
            ExposureStatus::AboveThreshold
        } else {
            ExposureStatus::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_period_adds_three_db() {
        let policy = ExposurePolicy::default();
        let threshold = policy.adjusted_threshold(14_400.0).unwrap();
        assert!((threshold - 83.0).abs() < 1e-9);
    }

    #[test]
    fn full_period_is_base_threshold() {
        let policy = ExposurePolicy::default();
        let threshold = policy.adjusted_threshold(28_800.0).unwrap();
        assert!((threshold - 80.0).abs() < 1e-9);
    }

    #[test]
    fn double_period_lowers_threshold() {
        let policy = ExposurePolicy::default();
        let threshold = policy.adjusted_threshold(57_600.0).unwrap();
        assert!((threshold - 77.0).abs() < 1e-9);
    }

    #[test]
    fn no_elapsed_time_is_ok() {
        let policy = ExposurePolicy::default();
        assert_eq!(policy.adjusted_threshold(0.0), None);
        assert_eq!(policy.adjusted_threshold(-5.0), None);
        assert_eq!(policy.evaluate(130.0, 0.0), ExposureStatus::Ok);
        assert_eq!(policy.evaluate(130.0, -1.0), ExposureStatus::Ok);
        assert_eq!(policy.evaluate(130.0, f64::NAN), ExposureStatus::Ok);
    }

    #[test]
    fn above_adjusted_threshold() {
        let policy = ExposurePolicy::default();
        assert_eq!(policy.evaluate(84.0, 14_400.0), ExposureStatus::AboveThreshold);
        assert_eq!(policy.evaluate(82.0, 14_400.0), ExposureStatus::Ok);
    }

    #[test]
    fn limit_takes_precedence_over_threshold() {
        let policy = ExposurePolicy::default();
        assert_eq!(policy.evaluate(105.0, 28_800.0), ExposureStatus::AboveLimit);
    }

    #[test]
    fn short_exposure_still_hits_hard_limit() {
        let policy = ExposurePolicy::default();
        // One second in, the adjusted threshold sits far above the hard limit.
        assert!(policy.adjusted_threshold(1.0).unwrap() > PEAK_LIMIT.level_db);
        assert_eq!(policy.evaluate(103.0, 1.0), ExposureStatus::AboveLimit);
        assert_eq!(policy.evaluate(101.0, 1.0), ExposureStatus::Ok);
    }
}
