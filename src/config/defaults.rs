//! Default values and bounds for CLI options.

pub const DEFAULT_CALIBRATION_DB: f64 = 0.0;
pub const MAX_CALIBRATION_MAGNITUDE_DB: f64 = 50.0;

pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 200;
pub const MIN_FLUSH_INTERVAL_MS: u64 = 20;
pub const MAX_FLUSH_INTERVAL_MS: u64 = 5_000;

pub const DEFAULT_GAUGE_MIN_DB: f64 = 0.0;
pub const DEFAULT_GAUGE_MAX_DB: f64 = 130.0;
pub const DEFAULT_DANGER_ZONE_DB: f64 = 85.0;
/// Upper bound for the gauge ceiling.
pub(super) const MAX_GAUGE_DB: f64 = 200.0;

pub const DEFAULT_BLOCK_SIZE: usize = crate::audio::DEFAULT_BLOCK_LEN;
pub const MIN_BLOCK_SIZE: usize = 16;
pub const MAX_BLOCK_SIZE: usize = 8_192;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
pub const MIN_CHANNEL_CAPACITY: usize = 8;
pub const MAX_CHANNEL_CAPACITY: usize = 1_024;

/// Longest unattended run accepted by `--duration-secs` (24 hours).
pub(super) const MAX_DURATION_SECS: u64 = 24 * 3600;

/// Characters that make a device name unreadable in the status line or log.
pub(super) const FORBIDDEN_DEVICE_CHARS: &[char] = &['\n', '\r', '\t', '\u{1b}'];
