mod args;
mod config;
mod demo;
mod logging;
mod session;

use std::process::ExitCode;

use clap::Parser;

use crate::args::EditorArgs;
use crate::config::{ConfigSource, DEFAULT_CONFIG_FILE, EditorConfig};

fn main() -> ExitCode {
    let args = EditorArgs::parse();

    // The logger is not installed yet, so configuration errors go to stderr.
    let (mut config, source) = match EditorConfig::resolve(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("sseditor: {err}");
            return ExitCode::FAILURE;
        }
    };
    args.apply(&mut config);
    if let Err(err) = config.validate() {
        eprintln!("sseditor: {err}");
        return ExitCode::FAILURE;
    }

    let captured = match logging::install(&config.logging.filter, config.logging.capture) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("sseditor: failed to install logger: {err}");
            return ExitCode::FAILURE;
        }
    };

    match &source {
        ConfigSource::File(path) => log::info!("Loaded config from {}", path.display()),
        ConfigSource::Defaults => {
            log::info!("No {DEFAULT_CONFIG_FILE} found, using defaults");
        }
    }

    let summary = match session::run(&config) {
        Ok(summary) => summary,
        Err(err) => {
            log::error!("Session failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "Session finished after {} frames: {} step(s), {} undo / {} redo, {} failure(s), {}",
        summary.frames,
        summary.steps,
        summary.undo.len(),
        summary.redo_count,
        summary.failures,
        if summary.dirty { "unsaved changes" } else { "saved" }
    );
    for (depth, description) in summary.undo.iter().enumerate() {
        log::debug!("  undo[{depth}] {description}");
    }

    // Copy out first: logging while holding the buffer lock would deadlock.
    let (entries, errors) = {
        let buffer = captured.lock();
        let entries: Vec<logging::LogEntry> = buffer.entries().iter().cloned().collect();
        (entries, buffer.count_at_least(log::Level::Error))
    };
    if !entries.is_empty() {
        log::info!(
            "{} warning(s) and {errors} error(s) during the session:",
            entries.len() - errors
        );
        for entry in &entries {
            log::info!(
                "  {:<5} [{}] {} ({:.1?} ago)",
                entry.level,
                entry.target,
                entry.message,
                entry.timestamp.elapsed()
            );
        }
    }

    if summary.failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
