//! Structured JSON trace of meter sessions, one file per input device.

use crate::app::logging_enabled;
use crate::config::AppConfig;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

const TRACE_LOG_ENV: &str = "SONOMETER_TRACE_LOG";
const TRACE_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const DEVICE_SLUG_MAX_LEN: usize = 32;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Lowercase ASCII slug of a device name, empty when nothing usable is left.
fn device_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.truncate(DEVICE_SLUG_MAX_LEN);
    slug.trim_end_matches('-').to_string()
}

fn trace_file_name(device: Option<&str>) -> String {
    match device.map(device_slug).filter(|slug| !slug.is_empty()) {
        Some(slug) => format!("sonometer_trace-{slug}.jsonl"),
        None => "sonometer_trace.jsonl".to_string(),
    }
}

/// `SONOMETER_TRACE_LOG` if set, else a per-device file in the temp dir.
pub(crate) fn tracing_log_path(device: Option<&str>) -> PathBuf {
    env::var_os(TRACE_LOG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join(trace_file_name(device)))
}

/// Install a JSON subscriber writing session events to the trace log.
///
/// The first event records the meter configuration so each run in the file
/// can be read on its own.
pub(crate) fn init_tracing(config: &AppConfig) {
    if !logging_enabled(config) {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let path = tracing_log_path(config.input_device.as_deref());
        if fs::metadata(&path).is_ok_and(|meta| meta.len() > TRACE_LOG_MAX_BYTES) {
            let _ = fs::remove_file(&path);
        }
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(_) => return,
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_thread_names(true)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return;
        }
        tracing::info!(
            input_device = config.input_device.as_deref().unwrap_or("default"),
            calibration_db = config.calibration_db,
            flush_interval_ms = config.flush_interval_ms,
            block_size = config.block_size,
            channel_capacity = config.channel_capacity,
            gauge_min_db = config.gauge_min_db,
            gauge_max_db = config.gauge_max_db,
            "meter configured"
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_slug_keeps_ascii_words() {
        let cases = [
            ("MacBook Pro Microphone", "macbook-pro-microphone"),
            ("  USB Audio (hw:1,0)  ", "usb-audio-hw-1-0"),
            ("!!!", ""),
        ];
        for (name, expected) in cases {
            assert_eq!(device_slug(name), expected, "device {name:?}");
        }
    }

    #[test]
    fn device_slug_is_capped() {
        let slug = device_slug(&"a".repeat(100));
        assert_eq!(slug.len(), DEVICE_SLUG_MAX_LEN);
    }

    #[test]
    fn trace_file_is_named_after_the_device() {
        assert_eq!(trace_file_name(None), "sonometer_trace.jsonl");
        assert_eq!(trace_file_name(Some("***")), "sonometer_trace.jsonl");
        let named = trace_file_name(Some("Studio Mic 2"));
        assert_eq!(named, "sonometer_trace-studio-mic-2.jsonl");
    }
}
