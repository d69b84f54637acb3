/// Where the shell sends user-facing output.
///
/// `alert` is the blocking notification of the page (errors, convergence,
/// reset confirmation); `info` is ordinary command feedback.
pub trait AlertSink {
    fn alert(&mut self, message: &str);
    fn info(&mut self, message: &str);
}

/// Alerts on stderr, feedback on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl AlertSink for ConsoleSink {
    fn alert(&mut self, message: &str) {
        eprintln!("[alert] {message}");
    }

    fn info(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Keeps everything in memory; used by tests and embedders.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub alerts: Vec<String>,
    pub infos: Vec<String>,
}

impl AlertSink for RecordingSink {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }
}
