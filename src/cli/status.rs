//! Terminal status reporter
//!
//! Shows each phase as a spinner while it runs, then replaces it with a
//! check mark or a cross once the phase ends. With spinners disabled the
//! same lines are printed without animation, for logs and CI output.

use crate::cli::output::{CHECK, CROSS, SPINNER};
use crate::core::StatusReporter;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

/// How phases are shown on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    /// Animated spinner per phase
    Spinner,
    /// One terminal line per phase event
    Lines,
    /// Phases go to the log, for output that is not a terminal
    Log,
}

impl StatusMode {
    pub fn select(plain: bool, is_terminal: bool) -> Self {
        match (plain, is_terminal) {
            (_, false) => StatusMode::Log,
            (true, true) => StatusMode::Lines,
            (false, true) => StatusMode::Spinner,
        }
    }

    /// Terminal reporter for this mode, `None` when phases are logged
    pub fn terminal(self) -> Option<TerminalStatus> {
        match self {
            StatusMode::Spinner => Some(TerminalStatus::new()),
            StatusMode::Lines => Some(TerminalStatus::plain()),
            StatusMode::Log => None,
        }
    }
}

/// Status reporter that draws phases to the terminal
pub struct TerminalStatus {
    spinner: bool,
    current: Mutex<Option<Phase>>,
}

struct Phase {
    label: String,
    bar: Option<ProgressBar>,
}

impl TerminalStatus {
    /// Animated spinner output
    pub fn new() -> Self {
        Self {
            spinner: true,
            current: Mutex::new(None),
        }
    }

    /// One line per phase event, no animation
    pub fn plain() -> Self {
        Self {
            spinner: false,
            current: Mutex::new(None),
        }
    }

    fn spinner_bar(label: &str) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(template);
        }
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    /// Run `f` with the active spinner hidden, so it can print to the terminal
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        let current = match self.current.lock() {
            Ok(current) => current,
            Err(_) => return f(),
        };
        match current.as_ref().and_then(|phase| phase.bar.as_ref()) {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    /// Print a line without tearing the active spinner
    pub fn println(&self, line: &str) {
        self.suspend(|| {
            println!("{}", line);
            self.flush_stdout();
        });
    }

    fn flush_stdout(&self) {
        let _ = io::stdout().flush();
    }
}

impl Default for TerminalStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for TerminalStatus {
    fn start(&self, label: &str) {
        let bar = if self.spinner {
            Some(Self::spinner_bar(label))
        } else {
            println!("{} {}", SPINNER, style(label).cyan());
            self.flush_stdout();
            None
        };

        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(Phase {
                label: label.to_string(),
                bar,
            }) {
                if let Some(bar) = previous.bar {
                    bar.finish_and_clear();
                }
            }
        }
    }

    fn end(&self, success: bool) {
        let phase = match self.current.lock() {
            Ok(mut current) => current.take(),
            Err(_) => None,
        };
        let Some(phase) = phase else {
            return;
        };

        let line = if success {
            format!("{}{}", CHECK, style(&phase.label).green())
        } else {
            format!("{}{}", CROSS, style(&phase.label).red())
        };

        match phase.bar {
            Some(bar) => bar.finish_with_message(line),
            None => {
                println!("{}", line);
                self.flush_stdout();
            }
        }
    }
}
