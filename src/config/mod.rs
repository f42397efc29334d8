//! Command-line parsing, validation, and the narrow settings view the engine reads.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::Parser;
use std::time::Duration;

pub use defaults::{
    DEFAULT_BLOCK_SIZE, DEFAULT_CALIBRATION_DB, DEFAULT_CHANNEL_CAPACITY, DEFAULT_DANGER_ZONE_DB,
    DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_GAUGE_MAX_DB, DEFAULT_GAUGE_MIN_DB, MAX_BLOCK_SIZE,
    MAX_CALIBRATION_MAGNITUDE_DB, MAX_CHANNEL_CAPACITY, MAX_FLUSH_INTERVAL_MS, MIN_BLOCK_SIZE,
    MIN_CHANNEL_CAPACITY, MIN_FLUSH_INTERVAL_MS,
};

/// CLI options for the sonometer. Validated values keep the meter in range.
#[derive(Debug, Parser, Clone)]
#[command(about = "Sonometer: live sound level meter", author, version)]
pub struct AppConfig {
    /// Calibration offset added to every reading (decibels, may be negative)
    #[arg(
        long = "calibration-db",
        env = "SONOMETER_CALIBRATION_DB",
        allow_negative_numbers = true,
        default_value_t = DEFAULT_CALIBRATION_DB
    )]
    pub calibration_db: f64,

    /// Display refresh interval (milliseconds)
    #[arg(long = "flush-interval-ms", default_value_t = DEFAULT_FLUSH_INTERVAL_MS)]
    pub flush_interval_ms: u64,

    /// Lowest value shown on the gauge (decibels)
    #[arg(long = "gauge-min-db", default_value_t = DEFAULT_GAUGE_MIN_DB)]
    pub gauge_min_db: f64,

    /// Highest value shown on the gauge (decibels)
    #[arg(long = "gauge-max-db", default_value_t = DEFAULT_GAUGE_MAX_DB)]
    pub gauge_max_db: f64,

    /// Level where the gauge switches to its danger color (decibels)
    #[arg(long = "danger-zone-db", default_value_t = DEFAULT_DANGER_ZONE_DB)]
    pub danger_zone_db: f64,

    /// Samples per metering block
    #[arg(long = "block-size", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Readings buffered between the audio callback and the meter
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Stop after this many seconds and print a summary
    #[arg(long = "duration-secs")]
    pub duration_secs: Option<u64>,

    /// Emit every display frame as a JSON line
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,

    /// Hide the elapsed exposure time in the status line
    #[arg(long = "hide-timestamp", default_value_t = false)]
    pub hide_timestamp: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SONOMETER_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SONOMETER_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

/// Read-only view of the settings the metering engine consumes.
pub trait MeterSettings {
    fn calibration_db(&self) -> f64;
    fn flush_interval(&self) -> Duration;
}

impl MeterSettings for AppConfig {
    fn calibration_db(&self) -> f64 {
        self.calibration_db
    }

    fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

/// Fixed settings for embedding the engine without a CLI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticSettings {
    pub calibration_db: f64,
    pub flush_interval: Duration,
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self {
            calibration_db: DEFAULT_CALIBRATION_DB,
            flush_interval: Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS),
        }
    }
}

impl MeterSettings for StaticSettings {
    fn calibration_db(&self) -> f64 {
        self.calibration_db
    }

    fn flush_interval(&self) -> Duration {
        self.flush_interval
    }
}
