//! Program to check the health of an Agora instance.
//!
//! Run providing the instance and the probe credentials:
//!
//! ```text
//! cargo run -- --url agora.example.org --username probe --password secret
//! AGORA_PROBE_USERNAME=probe AGORA_PROBE_PASSWORD=secret cargo run -- -U agora.example.org
//! ```
//!
//! Options:
//!
//! - `-U, --url`: Agora's URL. A bare host name is reached over `https`.
//! - `-u, --username` and `-p, --password`: probe credentials.
//! - `-t, --timeout`: timeout for each request in seconds (default 180).
//! - `-i, --insecure`: do not verify the server certificate.
//! - `-v, --verbose`: append the raw response body to failure messages.
//! - `--log-level` and `--log-style`: logging on the standard error.
//!
//! It prints one status line and exits with the matching code:
//!
//! ```text
//! OK - Agora is up.
//! ```
use std::ffi::OsString;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;

use super::config::{Configuration, PlainConfiguration, DEFAULT_TIMEOUT_SEC};
use super::console::Console;
use super::nagios::{NagiosResponse, Status};
use super::printer::Printer;
use super::service::{Service, OK_MESSAGE};
use crate::logging::{self, LogLevel, TraceStyle};

#[derive(Parser, Debug)]
#[command(author, version, about = "Nagios probe for Agora", long_about = None)]
struct Args {
    /// Agora's URL.
    #[arg(short = 'U', long)]
    url: String,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Timeout for requests, in seconds.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SEC, allow_negative_numbers = true)]
    timeout: i64,

    /// Username.
    #[arg(short, long, env = "AGORA_PROBE_USERNAME")]
    username: Option<String>,

    /// Password.
    #[arg(short, long, env = "AGORA_PROBE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Ignore SSL errors.
    #[arg(short, long)]
    insecure: bool,

    /// Log level for the standard error.
    #[arg(long, value_enum, env = "AGORA_PROBE_LOG_LEVEL", default_value_t = LogLevel::Off)]
    log_level: LogLevel,

    /// Log format.
    #[arg(long, value_enum, default_value_t = TraceStyle::Default)]
    log_style: TraceStyle,
}

/// Runs the probe with the process arguments and prints to the console.
pub async fn run() -> Status {
    run_with(std::env::args_os(), &Console::new()).await
}

/// Runs the probe with the given arguments (the first one is the program name).
///
/// Invalid arguments are reported as `UNKNOWN`, like any other problem
/// preventing the probe from running.
pub async fn run_with<I, T>(args: I, printer: &impl Printer) -> Status
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(args) {
        Ok(args) => args,
        Err(err) => return usage_error(&err, printer),
    };

    logging::setup(args.log_level, args.log_style);

    let config = match setup_config(args) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{err:?}");

            let mut response = NagiosResponse::new(OK_MESSAGE);
            response.write_unknown_message(&format!("{err:#}"));
            return response.print(printer);
        }
    };

    tracing::debug!("Probe configuration: {config:?}");

    let service = Service::new(Arc::new(config));

    service.run_checks(printer).await
}

fn setup_config(args: Args) -> Result<Configuration> {
    let plain_config = PlainConfiguration {
        url: args.url,
        username: args.username,
        password: args.password,
        timeout: args.timeout,
        verbose: args.verbose,
        insecure: args.insecure,
    };

    Configuration::try_from(plain_config).context("invalid probe configuration")
}

fn usage_error(err: &clap::Error, printer: &impl Printer) -> Status {
    let rendered = err.to_string();

    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        printer.print(&rendered);
        return Status::Ok;
    }

    printer.eprintln(rendered.trim_end());

    // The first paragraph of the clap error, on a single line.
    let summary = rendered
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
        .trim_start_matches("error: ")
        .to_owned();

    let mut response = NagiosResponse::new(OK_MESSAGE);
    response.write_unknown_message(&summary);
    response.print(printer)
}
