//! Aggregator-side statistics: calibration, Leq averaging, peaks, and
//! exposure checks, plus the frame handed to the display.

mod aggregator;
mod display;
mod exposure;

pub use aggregator::{FlushMode, LevelAggregator, MeterStats, CALIBRATED_FLOOR_DB};
pub use display::{
    calibration_label, format_elapsed, format_readout, tab_label, DisplayFrame, DisplayRange,
    DisplaySink, LevelBand,
};
pub use exposure::{ExposureLimit, ExposurePolicy, ExposureStatus, DAILY_THRESHOLD, PEAK_LIMIT};
