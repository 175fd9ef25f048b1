use std::cell::RefCell;

use super::printer::Printer;

/// A [`Printer`] that keeps the output in memory instead of printing it.
///
/// Standard output and standard error are captured separately.
pub struct Logger {
    output: RefCell<String>,
    error_output: RefCell<String>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: RefCell::new(String::new()),
            error_output: RefCell::new(String::new()),
        }
    }

    #[must_use]
    pub fn log(&self) -> String {
        self.output.borrow().clone()
    }

    #[must_use]
    pub fn error_log(&self) -> String {
        self.error_output.borrow().clone()
    }
}

impl Printer for Logger {
    fn print(&self, output: &str) {
        self.output.borrow_mut().push_str(output);
    }

    fn eprint(&self, output: &str) {
        self.error_output.borrow_mut().push_str(output);
    }

    fn println(&self, output: &str) {
        self.print(&format!("{output}\n"));
    }

    fn eprintln(&self, output: &str) {
        self.eprint(&format!("{output}\n"));
    }
}
