//! Nagios plugin result.
//!
//! A [`NagiosResponse`] collects the messages written by the checks and keeps
//! the most severe [`Status`] seen so far. It is rendered as the one-line
//! output monitoring supervisors expect:
//!
//! ```text
//! OK - Agora is up.
//! WARNING - No resources available.
//! CRITICAL - Cannot login.
//! ```
pub use nagiosplugin::ServiceState as Status;

use super::printer::Printer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NagiosResponse {
    status: Status,
    ok_message: String,
    unknown: Vec<String>,
    critical: Vec<String>,
    warning: Vec<String>,
}

impl NagiosResponse {
    #[must_use]
    pub fn new(ok_message: &str) -> Self {
        Self {
            status: Status::Ok,
            ok_message: ok_message.to_owned(),
            unknown: Vec::default(),
            critical: Vec::default(),
            warning: Vec::default(),
        }
    }

    pub fn write_warning_message(&mut self, message: &str) {
        self.raise(Status::Warning);
        self.warning.push(message.to_owned());
    }

    pub fn write_critical_message(&mut self, message: &str) {
        self.raise(Status::Critical);
        self.critical.push(message.to_owned());
    }

    pub fn write_unknown_message(&mut self, message: &str) {
        self.raise(Status::Unknown);
        self.unknown.push(message.to_owned());
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// The rendered status line, without a trailing new line.
    #[must_use]
    pub fn message(&self) -> String {
        if self.status == Status::Ok {
            return format!("{} - {}", self.status, self.ok_message);
        }

        let details = self
            .unknown
            .iter()
            .chain(self.critical.iter())
            .chain(self.warning.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        if details.is_empty() {
            self.status.to_string()
        } else {
            format!("{} - {details}", self.status)
        }
    }

    /// Prints the status line and returns the status to exit with.
    pub fn print(&self, printer: &impl Printer) -> Status {
        printer.println(&self.message());
        self.status
    }

    /// `ServiceState` orders `Unknown` below `Warning`; here the exit code
    /// decides, so `UNKNOWN` outranks every other status.
    fn raise(&mut self, status: Status) {
        if status.exit_code() > self.status.exit_code() {
            self.status = status;
        }
    }
}
