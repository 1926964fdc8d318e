//! Pipeline logging with severity levels and colored terminal output.
//!
//! Every subsystem reports recoverable failures through a [`Logger`]. The
//! core never decides what is user-visible; it emits a [`LogRecord`] carrying
//! the subsystem tag, a numeric severity and a message, and the caller's
//! logger decides what to do with it.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use owo_colors::OwoColorize;
use strum_macros::{Display, EnumString};

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    /// Diagnostic detail, e.g. a skipped declaration.
    Debug = 0,
    /// Noteworthy but expected behavior.
    Info = 1,
    /// Unsupported input that was ignored.
    Warn = 2,
    /// A failure that triggered a fallback.
    Error = 3,
}

impl Severity {
    /// Numeric level of this severity.
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }
}

/// A single structured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// How serious the condition is.
    pub severity: Severity,
    /// Subsystem that produced the record (`"CSS"`, `"HTML"`, ...).
    pub tag: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl LogRecord {
    /// Create a new record.
    pub fn new(severity: Severity, tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            tag,
            message: message.into(),
        }
    }

    /// Templated remark, e.g. `[HTML] ERROR(3): unclosed tag <span>`.
    #[must_use]
    pub fn remark(&self) -> String {
        format!(
            "[{}] {}({}): {}",
            self.tag,
            self.severity.to_string().to_ascii_uppercase(),
            self.severity.level(),
            self.message
        )
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.remark())
    }
}

/// Receiver of pipeline log records.
pub trait Logger: Send + Sync {
    /// Record a log entry.
    fn log(&self, record: LogRecord);

    /// Record at [`Severity::Debug`].
    fn debug(&self, tag: &'static str, message: &str) {
        self.log(LogRecord::new(Severity::Debug, tag, message));
    }

    /// Record at [`Severity::Info`].
    fn info(&self, tag: &'static str, message: &str) {
        self.log(LogRecord::new(Severity::Info, tag, message));
    }

    /// Record at [`Severity::Warn`].
    fn warn(&self, tag: &'static str, message: &str) {
        self.log(LogRecord::new(Severity::Warn, tag, message));
    }

    /// Record at [`Severity::Error`].
    fn error(&self, tag: &'static str, message: &str) {
        self.log(LogRecord::new(Severity::Error, tag, message));
    }
}

impl<T: Logger + ?Sized> Logger for Arc<T> {
    fn log(&self, record: LogRecord) {
        (**self).log(record);
    }
}

/// Logs to stderr with color, printing each unique message once.
///
/// # Example
/// ```ignore
/// let logger = TerminalLogger::new(Severity::Warn);
/// logger.warn("CSS", "unsupported at-rule '@media'");
/// ```
#[derive(Debug)]
pub struct TerminalLogger {
    min_severity: Severity,
    /// Messages already printed (to deduplicate)
    seen: Mutex<HashSet<String>>,
}

impl TerminalLogger {
    /// Create a logger that prints records at or above `min_severity`.
    #[must_use]
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Forget every message printed so far.
    pub fn clear(&self) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.clear();
        }
    }
}

impl Default for TerminalLogger {
    fn default() -> Self {
        Self::new(Severity::Warn)
    }
}

impl Logger for TerminalLogger {
    fn log(&self, record: LogRecord) {
        if record.severity < self.min_severity {
            return;
        }
        // A poisoned set only loses deduplication, never the message.
        let first_time = self
            .seen
            .lock()
            .map_or(true, |mut seen| seen.insert(record.remark()));
        if !first_time {
            return;
        }

        let line = format!("[Tincture {}] {}", record.tag, record.message);
        match record.severity {
            Severity::Debug => eprintln!("{}", line.dimmed()),
            Severity::Info => eprintln!("{}", line.cyan()),
            Severity::Warn => eprintln!("{} {}", "⚠".yellow(), line.yellow()),
            Severity::Error => eprintln!("{} {}", "✖".red(), line.red().bold()),
        }
    }
}

/// Collects records in memory, for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    /// Create an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record logged so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Whether any record at `severity` or above was logged under `tag`.
    #[must_use]
    pub fn has(&self, severity: Severity, tag: &str) -> bool {
        self.records()
            .iter()
            .any(|r| r.severity >= severity && r.tag == tag)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, record: LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _record: LogRecord) {}
}
