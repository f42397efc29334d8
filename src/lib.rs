//! Live sound level metering: microphone blocks in, calibrated Leq readings
//! and exposure status out.

pub mod app;
pub mod audio;
pub mod config;
pub mod meter;
pub mod session;
mod telemetry;

pub use app::{
    crash_log_path, init_logging, install_panic_hook, log_debug, log_file_path, log_panic,
};
pub use session::{SessionController, SessionOptions, SessionState};
