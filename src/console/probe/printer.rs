/// Sink for everything the probe shows to the monitoring supervisor.
pub trait Printer {
    fn print(&self, output: &str);
    fn eprint(&self, output: &str);
    fn println(&self, output: &str);
    fn eprintln(&self, output: &str);
}
