//! Sonometer entrypoint: opens the microphone and redraws a live level line.
//!
//! # Architecture
//!
//! - Audio callback: turns blocks into decibel readings (lock-free)
//! - Control thread: reads s/p/r/q commands from stdin
//! - Main loop: owns the session, pumps readings and flushes frames

mod cli_utils;
mod controls;
mod render;
mod session_summary;

use anyhow::Result;
use clap::Parser;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use sonometer::audio::{mic_permission_hint, CpalMicrophone, MicrophoneError};
use sonometer::config::AppConfig;
use sonometer::{
    init_logging, install_panic_hook, log_debug, log_file_path, SessionController, SessionState,
};
use std::io::{self, Write};
use std::time::Duration;

use crate::cli_utils::list_input_devices;
use crate::controls::{spawn_control_thread, Command, CONTROLS_HELP};
use crate::render::{Palette, RenderOptions, TerminalSink};
use crate::session_summary::{format_session_summary, SessionSummary};

/// Max pending control commands before the reader blocks.
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Upper bound on a single wait inside the main loop, keeps controls responsive.
const LOOP_WAIT: Duration = Duration::from_millis(50);

type Session = SessionController<CpalMicrophone, AppConfig, TerminalSink>;

fn main() -> Result<()> {
    let mut config = AppConfig::parse();
    if config.list_input_devices {
        list_input_devices()?;
        return Ok(());
    }

    config.validate()?;
    init_logging(&config);
    install_panic_hook();
    log_debug("=== Sonometer Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let palette = Palette::detect();
    let render_options = RenderOptions {
        range: config.display_range(),
        danger_zone_db: config.danger_zone_db,
        calibration_db: config.calibration_db,
        hide_timestamp: config.hide_timestamp,
        window_title: !config.json && std::env::var("NO_COLOR").is_err(),
        palette,
    };
    let sink = TerminalSink::new(render_options, config.json);
    let microphone = CpalMicrophone::new(config.input_device.as_deref());
    let duration = config.duration_secs.map(Duration::from_secs);
    let json = config.json;
    let options = config.session_options();
    let mut session = SessionController::new(microphone, config, sink, options);

    let (command_tx, command_rx) = bounded(COMMAND_CHANNEL_CAPACITY);
    let _control_handle = spawn_control_thread(command_tx);

    if !json {
        eprintln!("{CONTROLS_HELP}");
    }
    if let Err(err) = session.start() {
        report_start_error(&err);
        return Err(err.into());
    }

    run_loop(&mut session, &command_rx, duration);

    let summary = SessionSummary {
        stats: session.stats(),
        range: session.range(),
        elapsed: session.elapsed(),
        exposure: session.exposure(),
        calibration_db: session.calibration_db(),
        overwritten: session.overwritten_readings(),
        empty_input: session.empty_input_seen(),
    };
    session.pause();
    session.display_mut().finish_line();
    drop(session);

    if !json {
        let output = format_session_summary(&summary, palette);
        if !output.is_empty() {
            print!("{output}");
            let _ = io::stdout().flush();
        }
    }
    log_debug("=== Sonometer Exiting ===");
    Ok(())
}

fn run_loop(session: &mut Session, commands: &Receiver<Command>, duration: Option<Duration>) {
    let mut stdin_open = true;
    loop {
        if let Some(limit) = duration {
            if session.elapsed() >= limit {
                log_debug("duration limit reached");
                return;
            }
        }

        let next = if session.state() == SessionState::Running {
            session.pump(LOOP_WAIT);
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    stdin_open = false;
                    None
                }
            }
        } else if stdin_open {
            match commands.recv_timeout(LOOP_WAIT) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => {
                    stdin_open = false;
                    None
                }
            }
        } else {
            // Stopped with no way to resume.
            return;
        };

        let Some(command) = next else {
            continue;
        };
        log_debug(&format!("command: {command:?}"));
        match command {
            Command::Start => {
                if let Err(err) = session.start() {
                    report_start_error(&err);
                    session
                        .display_mut()
                        .note(&format!("Could not start: {err}"));
                }
            }
            Command::Pause => {
                session.pause();
                session.display_mut().note("Paused (s to resume, r to reset)");
            }
            Command::Reset => {
                session.reset();
                session.display_mut().note("Reset");
            }
            Command::Quit => return,
        }
    }
}

fn report_start_error(err: &MicrophoneError) {
    log_debug(&format!("microphone start failed: {err}"));
    if matches!(err, MicrophoneError::PermissionDenied) {
        eprintln!("{}", mic_permission_hint());
    }
}
