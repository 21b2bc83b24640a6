//! Status reporting for pipeline phases

use tracing::{error, info};

/// Receives the start and end of each named phase of work
pub trait StatusReporter: Send + Sync {
    /// Begin a named phase
    fn start(&self, label: &str);

    /// End the current phase
    fn end(&self, success: bool);
}

/// A started status phase that ends as failed unless marked successful
///
/// Dropping the guard on any exit path (early return, `?`, panic) ends the
/// phase with `end(false)`. Calling [`StatusPhase::succeed`] ends it with
/// `end(true)` instead. Exactly one `end` is reported per phase.
#[must_use = "dropping the phase immediately marks it failed"]
pub struct StatusPhase<'a> {
    reporter: &'a dyn StatusReporter,
    ended: bool,
}

impl<'a> StatusPhase<'a> {
    pub fn start(reporter: &'a dyn StatusReporter, label: &str) -> Self {
        reporter.start(label);
        Self {
            reporter,
            ended: false,
        }
    }

    /// Mark the phase successful
    pub fn succeed(mut self) {
        self.ended = true;
        self.reporter.end(true);
    }
}

impl Drop for StatusPhase<'_> {
    fn drop(&mut self) {
        if !self.ended {
            self.reporter.end(false);
        }
    }
}

/// Reporter that writes phases to the log
#[derive(Debug, Default)]
pub struct LogStatus {
    current: std::sync::Mutex<Option<String>>,
}

impl LogStatus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusReporter for LogStatus {
    fn start(&self, label: &str) {
        info!("{}", label);
        if let Ok(mut current) = self.current.lock() {
            *current = Some(label.to_string());
        }
    }

    fn end(&self, success: bool) {
        let label = match self.current.lock() {
            Ok(mut current) => current.take(),
            Err(_) => None,
        };
        // End without a started phase is a no-op
        let Some(label) = label else { return };

        if success {
            info!("✓ {}", label);
        } else {
            error!("✗ {}", label);
        }
    }
}
