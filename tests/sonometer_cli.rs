use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn sonometer_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_sonometer").expect("sonometer test binary not built")
}

#[test]
fn sonometer_help_mentions_name() {
    let output = Command::new(sonometer_bin())
        .arg("--help")
        .output()
        .expect("run sonometer --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Sonometer"));
    assert!(combined.contains("--calibration-db"));
}

#[test]
fn sonometer_list_input_devices_uses_override() {
    let output = Command::new(sonometer_bin())
        .arg("--list-input-devices")
        .env("SONOMETER_TEST_DEVICES", "Built-in Mic, USB Mic")
        .output()
        .expect("run sonometer --list-input-devices");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Available audio input devices:"));
    assert!(combined.contains("  - Built-in Mic"));
    assert!(combined.contains("  - USB Mic"));
}

#[test]
fn sonometer_list_input_devices_reports_empty_override() {
    let output = Command::new(sonometer_bin())
        .arg("--list-input-devices")
        .env("SONOMETER_TEST_DEVICES", "")
        .output()
        .expect("run sonometer --list-input-devices");
    assert!(output.status.success());
    assert!(combined_output(&output).contains("No audio input devices detected."));
}

#[test]
fn sonometer_rejects_zero_flush_interval() {
    let output = Command::new(sonometer_bin())
        .args(["--flush-interval-ms", "0"])
        .env("SONOMETER_NO_LOGS", "true")
        .output()
        .expect("run sonometer --flush-interval-ms 0");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--flush-interval-ms"));
}

#[test]
fn sonometer_rejects_inverted_gauge() {
    let output = Command::new(sonometer_bin())
        .args(["--gauge-min-db", "90", "--gauge-max-db", "80"])
        .env("SONOMETER_NO_LOGS", "true")
        .output()
        .expect("run sonometer with inverted gauge");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--gauge-max-db"));
}
