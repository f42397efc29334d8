use super::{AppConfig, MeterSettings, StaticSettings};
use clap::Parser;
use std::time::Duration;

fn parse(args: &[&str]) -> AppConfig {
    let mut argv = vec!["test-app"];
    argv.extend_from_slice(args);
    AppConfig::parse_from(argv)
}

#[test]
fn defaults_validate() {
    let mut cfg = parse(&[]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.calibration_db, 0.0);
    assert_eq!(cfg.flush_interval_ms, 200);
    assert_eq!(cfg.block_size, 128);
    assert_eq!(cfg.gauge_min_db, 0.0);
    assert_eq!(cfg.gauge_max_db, 130.0);
}

#[test]
fn accepts_negative_calibration() {
    let mut cfg = parse(&["--calibration-db", "-4.5"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.calibration_db(), -4.5);
}

#[test]
fn rejects_calibration_out_of_bounds() {
    let mut cfg = parse(&["--calibration-db", "51"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--calibration-db", "-50.5"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_flush_interval_out_of_bounds() {
    let mut cfg = parse(&["--flush-interval-ms", "0"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--flush-interval-ms", "5001"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_flush_interval_bounds() {
    let mut cfg = parse(&["--flush-interval-ms", "20"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.flush_interval(), Duration::from_millis(20));

    let mut cfg = parse(&["--flush-interval-ms", "5000"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_inverted_gauge_range() {
    let mut cfg = parse(&["--gauge-min-db", "90", "--gauge-max-db", "80"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--gauge-min-db", "80", "--gauge-max-db", "80"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_negative_gauge_floor() {
    let mut cfg = parse(&["--gauge-min-db=-10"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_danger_zone_outside_gauge() {
    let mut cfg = parse(&["--gauge-max-db", "100", "--danger-zone-db", "110"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_block_size_out_of_bounds() {
    let mut cfg = parse(&["--block-size", "8"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--block-size", "16384"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_channel_capacity_out_of_bounds() {
    let mut cfg = parse(&["--channel-capacity", "4"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--channel-capacity", "2048"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_zero_duration() {
    let mut cfg = parse(&["--duration-secs", "0"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--duration-secs", "30"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn trims_input_device_name() {
    let mut cfg = parse(&["--input-device", "  USB Mic  "]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.input_device.as_deref(), Some("USB Mic"));
}

#[test]
fn rejects_blank_or_control_device_names() {
    let mut cfg = parse(&["--input-device", "   "]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--input-device", "mic\u{1b}[2J"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn session_options_follow_cli() {
    let mut cfg = parse(&[
        "--gauge-min-db",
        "20",
        "--gauge-max-db",
        "110",
        "--block-size",
        "256",
        "--channel-capacity",
        "32",
    ]);
    assert!(cfg.validate().is_ok());
    let options = cfg.session_options();
    assert_eq!(options.range.floor_db, 20.0);
    assert_eq!(options.range.ceiling_db, 110.0);
    assert_eq!(options.block_len, 256);
    assert_eq!(options.channel_capacity, 32);
}

#[test]
fn static_settings_defaults() {
    let settings = StaticSettings::default();
    assert_eq!(settings.calibration_db(), 0.0);
    assert_eq!(settings.flush_interval(), Duration::from_millis(200));
}
