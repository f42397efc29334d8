//! Terminal and JSON-lines rendering of display frames.

use sonometer::meter::{
    calibration_label, format_readout, tab_label, DisplayFrame, DisplayRange, DisplaySink,
    ExposureStatus, LevelBand,
};
use std::io::{self, Write};

const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';
const BAR_WIDTH: usize = 32;

/// ANSI escapes for the status line; all empty when color is off.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub info: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

pub(crate) const ANSI: Palette = Palette {
    success: "\x1b[92m",
    warning: "\x1b[93m",
    error: "\x1b[91m",
    info: "\x1b[94m",
    dim: "\x1b[90m",
    reset: "\x1b[0m",
};

pub(crate) const PLAIN: Palette = Palette {
    success: "",
    warning: "",
    error: "",
    info: "",
    dim: "",
    reset: "",
};

impl Palette {
    pub(crate) fn detect() -> Self {
        if std::env::var("NO_COLOR").is_ok() {
            PLAIN
        } else {
            ANSI
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RenderOptions {
    pub range: DisplayRange,
    pub danger_zone_db: f64,
    pub calibration_db: f64,
    pub hide_timestamp: bool,
    /// Mirror the headline level into the terminal window title.
    pub window_title: bool,
    pub palette: Palette,
}

/// Horizontal gauge; cells at or past the danger zone turn red.
pub(crate) fn format_bar(db: f64, options: &RenderOptions) -> String {
    let range = options.range;
    let span = range.ceiling_db - range.floor_db;
    let ratio = if span > 0.0 {
        ((db - range.floor_db) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    let palette = options.palette;

    let mut bar = String::new();
    for cell in 0..BAR_WIDTH {
        if cell < filled {
            let cell_db = range.floor_db + span * (cell as f64 + 0.5) / BAR_WIDTH as f64;
            let color = if cell_db >= options.danger_zone_db {
                palette.error
            } else if cell_db >= range.midpoint() {
                palette.warning
            } else {
                palette.success
            };
            bar.push_str(color);
            bar.push(BAR_FULL);
            bar.push_str(palette.reset);
        } else {
            bar.push(BAR_EMPTY);
        }
    }
    bar
}

fn band_icon(band: LevelBand) -> &'static str {
    match band {
        LevelBand::Low => "\u{00b7}",
        LevelBand::Normal => "\u{266a}",
        LevelBand::Loud => "\u{266b}",
    }
}

fn exposure_text(status: ExposureStatus, palette: Palette) -> String {
    match status {
        ExposureStatus::Ok => String::new(),
        ExposureStatus::AboveThreshold => {
            format!("  {}above threshold{}", palette.warning, palette.reset)
        }
        ExposureStatus::AboveLimit => format!("  {}ABOVE LIMIT{}", palette.error, palette.reset),
    }
}

/// One status line: icon, readout, gauge, average, peak, elapsed and calibration.
pub(crate) fn format_status_line(frame: &DisplayFrame, options: &RenderOptions) -> String {
    let palette = options.palette;
    let mut line = format!(
        "{} {}{} dB{} {}  avg {} dB  max {} dB",
        band_icon(frame.band),
        palette.info,
        format_readout(frame.current_db),
        palette.reset,
        format_bar(frame.current_db, options),
        format_readout(frame.average_db),
        format_readout(frame.peak_db),
    );
    if !options.hide_timestamp {
        line.push_str(&format!("  {}{}{}", palette.dim, frame.elapsed, palette.reset));
    }
    if let Some(label) = calibration_label(options.calibration_db) {
        line.push_str(&format!("  {}cal {label}{}", palette.dim, palette.reset));
    }
    line.push_str(&exposure_text(frame.exposure, palette));
    line
}

pub(crate) fn window_title(frame: &DisplayFrame) -> String {
    format!("Sonometer {}", tab_label(frame.current_db))
}

/// Display sink writing to stdout, either as a redrawn line or JSON lines.
pub(crate) struct TerminalSink {
    options: RenderOptions,
    json: bool,
    line_open: bool,
}

impl TerminalSink {
    pub(crate) fn new(options: RenderOptions, json: bool) -> Self {
        Self {
            options,
            json,
            line_open: false,
        }
    }

    /// Print a one-off message without clobbering the live line.
    pub(crate) fn note(&mut self, message: &str) {
        self.finish_line();
        if !self.json {
            eprintln!("{message}");
        }
    }

    /// Move past the live line so later output starts on a fresh row.
    pub(crate) fn finish_line(&mut self) {
        if self.line_open {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(b"\n");
            let _ = stdout.flush();
            self.line_open = false;
        }
    }
}

impl DisplaySink for TerminalSink {
    fn show(&mut self, frame: &DisplayFrame) {
        let mut stdout = io::stdout();
        if self.json {
            match serde_json::to_string(frame) {
                Ok(line) => {
                    let _ = writeln!(stdout, "{line}");
                }
                Err(err) => sonometer::log_debug(&format!("frame serialization failed: {err}")),
            }
        } else {
            if self.options.window_title {
                let _ = write!(stdout, "\x1b]0;{}\x07", window_title(frame));
            }
            let line = format_status_line(frame, &self.options);
            let _ = write!(stdout, "\r\x1b[2K{line}");
            self.line_open = true;
        }
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RenderOptions {
        RenderOptions {
            range: DisplayRange::default(),
            danger_zone_db: 85.0,
            calibration_db: 0.0,
            hide_timestamp: false,
            window_title: false,
            palette: PLAIN,
        }
    }

    fn frame(current_db: f64, exposure: ExposureStatus) -> DisplayFrame {
        DisplayFrame {
            current_db,
            average_db: 61.25,
            peak_db: 88.0,
            elapsed_secs: 75.0,
            elapsed: "0:01:15".to_string(),
            band: DisplayRange::default().band(current_db),
            exposure,
        }
    }

    #[test]
    fn bar_fill_tracks_level() {
        let opts = options();
        assert_eq!(format_bar(0.0, &opts), BAR_EMPTY.to_string().repeat(BAR_WIDTH));
        assert_eq!(format_bar(130.0, &opts), BAR_FULL.to_string().repeat(BAR_WIDTH));
        let half = format_bar(65.0, &opts);
        assert_eq!(half.chars().filter(|ch| *ch == BAR_FULL).count(), BAR_WIDTH / 2);
    }

    #[test]
    fn bar_colors_danger_zone() {
        let opts = RenderOptions {
            palette: ANSI,
            ..options()
        };
        assert!(!format_bar(60.0, &opts).contains(ANSI.error));
        assert!(format_bar(120.0, &opts).contains(ANSI.error));
    }

    #[test]
    fn status_line_shows_readouts_and_time() {
        let line = format_status_line(&frame(64.37, ExposureStatus::Ok), &options());
        assert!(line.contains("64.3 dB"));
        assert!(line.contains("avg 61.2 dB"));
        assert!(line.contains("max 88.0 dB"));
        assert!(line.contains("0:01:15"));
        assert!(!line.contains("cal"));
    }

    #[test]
    fn status_line_hides_timestamp_and_shows_calibration() {
        let opts = RenderOptions {
            hide_timestamp: true,
            calibration_db: -2.5,
            ..options()
        };
        let line = format_status_line(&frame(40.0, ExposureStatus::Ok), &opts);
        assert!(!line.contains("0:01:15"));
        assert!(line.contains("cal \u{2212}2.5 dB"));
    }

    #[test]
    fn status_line_flags_exposure() {
        let line = format_status_line(&frame(90.0, ExposureStatus::AboveLimit), &options());
        assert!(line.contains("ABOVE LIMIT"));
        let line = format_status_line(&frame(90.0, ExposureStatus::AboveThreshold), &options());
        assert!(line.contains("above threshold"));
    }

    #[test]
    fn window_title_uses_whole_decibels() {
        assert_eq!(window_title(&frame(64.9, ExposureStatus::Ok)), "Sonometer 64 dB");
    }

    #[test]
    fn frames_serialize_as_json_lines() {
        let json = serde_json::to_value(frame(70.0, ExposureStatus::AboveThreshold))
            .expect("serialize frame");
        assert_eq!(json["current_db"], 70.0);
        assert_eq!(json["elapsed"], "0:01:15");
        assert_eq!(json["band"], "loud");
        assert_eq!(json["exposure"], "above_threshold");
    }
}
