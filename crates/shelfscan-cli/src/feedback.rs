//! User-facing notices (the kiosk's toasts).

use std::fmt;

use tracing::debug;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "ok",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Sink for short notices shown to the person at the kiosk.
pub trait Notifier {
    fn notify(&self, level: Level, message: &str);

    fn success(&self, message: &str) {
        self.notify(Level::Success, message);
    }

    fn info(&self, message: &str) {
        self.notify(Level::Info, message);
    }

    fn warning(&self, message: &str) {
        self.notify(Level::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(Level::Error, message);
    }
}

/// Writes notices to stderr and mirrors them into the debug log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    #[allow(clippy::print_stderr)]
    fn notify(&self, level: Level, message: &str) {
        let marker = match level {
            Level::Success => "✔",
            Level::Info => "ℹ",
            Level::Warning => "!",
            Level::Error => "✖",
        };
        eprintln!("{marker} {message}");
        debug!(%level, message, "notice");
    }
}

/// Collects notices for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    notices: std::cell::RefCell<Vec<(Level, String)>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub(crate) fn notices(&self) -> Vec<(Level, String)> {
        self.notices.borrow().clone()
    }

    pub(crate) fn count(&self, level: Level) -> usize {
        self.notices.borrow().iter().filter(|(l, _)| *l == level).count()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|(_, m)| m.clone()).collect()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, level: Level, message: &str) {
        self.notices.borrow_mut().push((level, message.to_string()));
    }
}
