//! User-facing progress output.

use std::io::Write;

use parking_lot::Mutex;

/// Line printer shared by pipeline workers.
///
/// Each line is written while holding the lock, so output from concurrent
/// workers never interleaves.
pub struct Console {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Discard all output. Handy in tests.
    pub fn sink() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self { sink: Mutex::new(sink) }
    }

    pub fn line(&self, message: impl AsRef<str>) {
        let mut out = self.sink.lock();
        // Console output is best-effort; a closed stdout must not fail the run.
        let _ = writeln!(out, "{}", message.as_ref());
        let _ = out.flush();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

