use super::defaults::{
    FORBIDDEN_DEVICE_CHARS, MAX_BLOCK_SIZE, MAX_CALIBRATION_MAGNITUDE_DB, MAX_CHANNEL_CAPACITY,
    MAX_DURATION_SECS, MAX_FLUSH_INTERVAL_MS, MAX_GAUGE_DB, MIN_BLOCK_SIZE, MIN_CHANNEL_CAPACITY,
    MIN_FLUSH_INTERVAL_MS,
};
use super::AppConfig;
use crate::meter::{DisplayRange, ExposurePolicy};
use crate::session::SessionOptions;
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the device name.
    pub fn validate(&mut self) -> Result<()> {
        if !self.calibration_db.is_finite()
            || self.calibration_db.abs() > MAX_CALIBRATION_MAGNITUDE_DB
        {
            bail!(
                "--calibration-db must be between -{MAX_CALIBRATION_MAGNITUDE_DB} and {MAX_CALIBRATION_MAGNITUDE_DB} dB, got {}",
                self.calibration_db
            );
        }
        if !(MIN_FLUSH_INTERVAL_MS..=MAX_FLUSH_INTERVAL_MS).contains(&self.flush_interval_ms) {
            bail!(
                "--flush-interval-ms must be between {MIN_FLUSH_INTERVAL_MS} and {MAX_FLUSH_INTERVAL_MS}, got {}",
                self.flush_interval_ms
            );
        }
        if !self.gauge_min_db.is_finite() || self.gauge_min_db < 0.0 {
            bail!(
                "--gauge-min-db must be a non-negative number, got {}",
                self.gauge_min_db
            );
        }
        if !self.gauge_max_db.is_finite()
            || self.gauge_max_db <= self.gauge_min_db
            || self.gauge_max_db > MAX_GAUGE_DB
        {
            bail!(
                "--gauge-max-db must be above --gauge-min-db ({}) and at most {MAX_GAUGE_DB}, got {}",
                self.gauge_min_db,
                self.gauge_max_db
            );
        }
        if !(self.gauge_min_db..=self.gauge_max_db).contains(&self.danger_zone_db) {
            bail!(
                "--danger-zone-db must lie within the gauge range ({}..={}), got {}",
                self.gauge_min_db,
                self.gauge_max_db,
                self.danger_zone_db
            );
        }
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&self.block_size) {
            bail!(
                "--block-size must be between {MIN_BLOCK_SIZE} and {MAX_BLOCK_SIZE}, got {}",
                self.block_size
            );
        }
        if !(MIN_CHANNEL_CAPACITY..=MAX_CHANNEL_CAPACITY).contains(&self.channel_capacity) {
            bail!(
                "--channel-capacity must be between {MIN_CHANNEL_CAPACITY} and {MAX_CHANNEL_CAPACITY}, got {}",
                self.channel_capacity
            );
        }
        if let Some(secs) = self.duration_secs {
            if secs == 0 || secs > MAX_DURATION_SECS {
                bail!("--duration-secs must be between 1 and {MAX_DURATION_SECS}, got {secs}");
            }
        }

        if let Some(device) = self.input_device.take() {
            let trimmed = device.trim();
            if trimmed.is_empty() {
                bail!("--input-device must not be empty");
            }
            if trimmed.len() > 256 || trimmed.chars().any(|ch| FORBIDDEN_DEVICE_CHARS.contains(&ch))
            {
                bail!("--input-device must be <=256 characters with no control characters");
            }
            self.input_device = Some(trimmed.to_string());
        }

        Ok(())
    }

    /// Gauge bounds the meter clamps into.
    pub fn display_range(&self) -> DisplayRange {
        DisplayRange::new(self.gauge_min_db, self.gauge_max_db)
    }

    /// Snapshot the CLI-controlled engine options for the session controller.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            range: self.display_range(),
            policy: ExposurePolicy::default(),
            block_len: self.block_size,
            channel_capacity: self.channel_capacity,
        }
    }
}
