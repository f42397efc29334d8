//! What the meter hands to the display and how readouts are formatted.

use super::exposure::ExposureStatus;
use serde::Serialize;

/// Gauge bounds every published value is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub floor_db: f64,
    pub ceiling_db: f64,
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self {
            floor_db: 0.0,
            ceiling_db: 130.0,
        }
    }
}

impl DisplayRange {
    pub fn new(floor_db: f64, ceiling_db: f64) -> Self {
        Self {
            floor_db,
            ceiling_db,
        }
    }

    #[inline]
    pub fn clamp(&self, db: f64) -> f64 {
        db.clamp(self.floor_db, self.ceiling_db)
    }

    pub fn midpoint(&self) -> f64 {
        (self.floor_db + self.ceiling_db) / 2.0
    }

    /// Icon bucket for the headline value.
    pub fn band(&self, db: f64) -> LevelBand {
        if db <= self.floor_db {
            LevelBand::Low
        } else if db < self.midpoint() {
            LevelBand::Normal
        } else {
            LevelBand::Loud
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelBand {
    Low,
    Normal,
    Loud,
}

/// One published snapshot of the session, already clamped to the display range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFrame {
    pub current_db: f64,
    pub average_db: f64,
    pub peak_db: f64,
    pub elapsed_secs: f64,
    pub elapsed: String,
    pub band: LevelBand,
    pub exposure: ExposureStatus,
}

/// Display collaborator. Receives every flushed frame.
pub trait DisplaySink {
    fn show(&mut self, frame: &DisplayFrame);
}

/// Records frames, handy for headless runs and tests.
impl DisplaySink for Vec<DisplayFrame> {
    fn show(&mut self, frame: &DisplayFrame) {
        self.push(frame.clone());
    }
}

/// Elapsed time as `h:mm:ss`, truncated to whole seconds.
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let total = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
        elapsed_secs.trunc() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Two-digit integral part and one truncated decimal, e.g. `07.3`.
pub fn format_readout(db: f64) -> String {
    let integral = db.trunc();
    let decimal = ((db - integral).abs() * 10.0).trunc() as u8;
    format!("{:02}.{}", integral as i64, decimal.min(9))
}

/// Short label used for tab titles, e.g. `64 dB`.
pub fn tab_label(db: f64) -> String {
    format!("{} dB", db.trunc() as i64)
}

/// Signed calibration offset, hidden when no offset applies.
pub fn calibration_label(offset_db: f64) -> Option<String> {
    if offset_db == 0.0 {
        return None;
    }
    let magnitude = format!("{:.1}", offset_db.abs());
    if offset_db < 0.0 {
        Some(format!("\u{2212}{magnitude} dB"))
    } else {
        Some(format!("+{magnitude} dB"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_bounds() {
        let range = DisplayRange::new(20.0, 120.0);
        assert_eq!(range.clamp(5.0), 20.0);
        assert_eq!(range.clamp(150.0), 120.0);
        assert_eq!(range.clamp(64.5), 64.5);
    }

    #[test]
    fn band_follows_midpoint() {
        let range = DisplayRange::new(0.0, 100.0);
        assert_eq!(range.band(0.0), LevelBand::Low);
        assert_eq!(range.band(49.9), LevelBand::Normal);
        assert_eq!(range.band(50.0), LevelBand::Loud);
    }

    #[test]
    fn elapsed_formats_hours_minutes_seconds() {
        assert_eq!(format_elapsed(0.0), "0:00:00");
        assert_eq!(format_elapsed(59.9), "0:00:59");
        assert_eq!(format_elapsed(3725.0), "1:02:05");
        assert_eq!(format_elapsed(36_000.0), "10:00:00");
        assert_eq!(format_elapsed(-3.0), "0:00:00");
    }

    #[test]
    fn readout_pads_and_truncates() {
        assert_eq!(format_readout(7.35), "07.3");
        assert_eq!(format_readout(64.0), "64.0");
        assert_eq!(format_readout(101.99), "101.9");
    }

    #[test]
    fn tab_label_truncates() {
        assert_eq!(tab_label(64.9), "64 dB");
    }

    #[test]
    fn calibration_label_signs() {
        assert_eq!(calibration_label(0.0), None);
        assert_eq!(calibration_label(3.0).as_deref(), Some("+3.0 dB"));
        assert_eq!(calibration_label(-2.5).as_deref(), Some("\u{2212}2.5 dB"));
    }

    #[test]
    fn vec_sink_records_frames() {
        let mut sink: Vec<DisplayFrame> = Vec::new();
        let frame = DisplayFrame {
            current_db: 40.0,
            average_db: 38.0,
            peak_db: 45.0,
            elapsed_secs: 1.0,
            elapsed: format_elapsed(1.0),
            band: LevelBand::Normal,
            exposure: ExposureStatus::Ok,
        };
        sink.show(&frame);
        assert_eq!(sink, vec![frame]);
    }
}
