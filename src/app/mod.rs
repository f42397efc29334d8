//! Process-level plumbing for the sonometer binary: file logging and crash logs.

mod logging;
mod panic_hook;

#[cfg(test)]
pub(crate) use logging::set_logging_for_tests;
pub(crate) use logging::logging_enabled;
pub use logging::{crash_log_path, init_logging, log_debug, log_file_path, log_panic};
pub use panic_hook::install_panic_hook;
