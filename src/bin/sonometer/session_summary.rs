//! Exit summary of a metering session.

use sonometer::meter::{
    calibration_label, format_elapsed, DisplayRange, ExposureStatus, MeterStats,
};
use std::time::Duration;

use crate::render::Palette;

#[derive(Debug, Clone)]
pub(crate) struct SessionSummary {
    pub stats: MeterStats,
    pub range: DisplayRange,
    pub elapsed: Duration,
    pub exposure: ExposureStatus,
    pub calibration_db: f64,
    pub overwritten: usize,
    pub empty_input: bool,
}

impl SessionSummary {
    pub(crate) fn has_activity(&self) -> bool {
        self.stats.sample_count > 0
    }
}

/// Format the summary for display on exit; empty when nothing was measured.
pub(crate) fn format_session_summary(summary: &SessionSummary, palette: Palette) -> String {
    if !summary.has_activity() {
        return String::new();
    }

    let range = summary.range;
    let mut lines = vec![
        String::new(),
        format!("{}Session Summary{}", palette.info, palette.reset),
        "───────────────".to_string(),
        format_stat_line(
            palette,
            "Leq",
            &format!("{:.1} dB", range.clamp(summary.stats.running_average_db)),
            palette.success,
        ),
        format_stat_line(
            palette,
            "Peak",
            &format!("{:.1} dB", range.clamp(summary.stats.global_peak_db)),
            "",
        ),
        format_stat_line(
            palette,
            "Duration",
            &format_elapsed(summary.elapsed.as_secs_f64()),
            "",
        ),
        format_stat_line(
            palette,
            "Readings",
            &summary.stats.sample_count.to_string(),
            "",
        ),
    ];

    match summary.exposure {
        ExposureStatus::Ok => {}
        ExposureStatus::AboveThreshold => lines.push(format_stat_line(
            palette,
            "Exposure",
            "above threshold",
            palette.warning,
        )),
        ExposureStatus::AboveLimit => lines.push(format_stat_line(
            palette,
            "Exposure",
            "above limit",
            palette.error,
        )),
    }

    if let Some(label) = calibration_label(summary.calibration_db) {
        lines.push(format_stat_line(palette, "Calibration", &label, ""));
    }
    if summary.overwritten > 0 {
        lines.push(format_stat_line(
            palette,
            "Overwritten",
            &summary.overwritten.to_string(),
            palette.warning,
        ));
    }
    if summary.empty_input {
        lines.push(format_stat_line(
            palette,
            "Input",
            "device sent empty buffers",
            palette.warning,
        ));
    }

    lines.push(String::new());
    lines.join("\n")
}

fn format_stat_line(palette: Palette, label: &str, value: &str, value_color: &str) -> String {
    let value_display = if value_color.is_empty() {
        value.to_string()
    } else {
        format!("{}{}{}", value_color, value, palette.reset)
    };
    format!("{:<12} {}", label, value_display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PLAIN;

    fn summary(sample_count: u64) -> SessionSummary {
        SessionSummary {
            stats: MeterStats {
                current_db: 55.0,
                local_peak_db: 60.0,
                running_average_db: 58.44,
                sample_count,
                global_peak_db: 140.0,
            },
            range: DisplayRange::default(),
            elapsed: Duration::from_secs(3725),
            exposure: ExposureStatus::Ok,
            calibration_db: 0.0,
            overwritten: 0,
            empty_input: false,
        }
    }

    #[test]
    fn empty_session_prints_nothing() {
        assert!(format_session_summary(&summary(0), PLAIN).is_empty());
    }

    #[test]
    fn summary_lists_clamped_levels_and_duration() {
        let output = format_session_summary(&summary(12), PLAIN);
        assert!(output.contains("Session Summary"));
        assert!(output.contains("58.4 dB"));
        assert!(output.contains("130.0 dB"));
        assert!(output.contains("1:02:05"));
        assert!(output.contains("12"));
        assert!(!output.contains("Exposure"));
    }

    #[test]
    fn summary_flags_exposure_and_diagnostics() {
        let mut data = summary(3);
        data.exposure = ExposureStatus::AboveLimit;
        data.calibration_db = 2.0;
        data.overwritten = 7;
        data.empty_input = true;
        let output = format_session_summary(&data, PLAIN);
        assert!(output.contains("above limit"));
        assert!(output.contains("+2.0 dB"));
        assert!(output.contains("Overwritten  7"));
        assert!(output.contains("empty buffers"));
    }
}
