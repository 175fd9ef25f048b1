//! Setup for the probe logging.
//!
//! Logs are written to the standard error so they never mix with the status
//! line the monitoring supervisor reads from the standard output.
//!
//! - `Off` (default)
//! - `Error`
//! - `Warn`
//! - `Info`
//! - `Debug`
//! - `Trace`
use std::sync::Once;

use clap::ValueEnum;
use tracing::debug;
use tracing::level_filters::LevelFilter;

static INIT: Once = Once::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceStyle {
    #[default]
    Default,
    Pretty,
    Compact,
    Json,
}

impl std::fmt::Display for TraceStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let style = match self {
            TraceStyle::Default => "Default Style",
            TraceStyle::Pretty => "Pretty Style",
            TraceStyle::Compact => "Compact Style",
            TraceStyle::Json => "Json Format",
        };

        f.write_str(style)
    }
}

/// It redirects the log info to the standard error with the given level.
///
/// Only the first call installs a subscriber.
pub fn setup(log_level: LogLevel, style: TraceStyle) {
    let tracing_level = map_to_tracing_level_filter(log_level);

    if tracing_level == LevelFilter::OFF {
        return;
    }

    INIT.call_once(|| {
        tracing_stderr_init(tracing_level, style);
    });
}

fn map_to_tracing_level_filter(log_level: LogLevel) -> LevelFilter {
    match log_level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

fn tracing_stderr_init(filter: LevelFilter, style: TraceStyle) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed by the embedding program.
    let _ = match style {
        TraceStyle::Default => builder.try_init(),
        TraceStyle::Pretty => builder.pretty().try_init(),
        TraceStyle::Compact => builder.compact().try_init(),
        TraceStyle::Json => builder.json().try_init(),
    };

    debug!("Logging initialized: {style}");
}
