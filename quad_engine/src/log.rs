//! Internal logging system for the Quad engine
//!
//! - Replaceable logger via the `Logger` trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored, timestamped console output by default
//! - File and line information on detailed ERROR logs

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use quad_engine::quad::log::{Logger, LogEntry};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, entry: &LogEntry) {
///         eprintln!("{} {}", entry.source, entry.message);
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "quad::ShaderProgram", "quad::diagnostics")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// Fixed-width label used in console lines
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colored_label(self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }
}

/// Console logger: `[timestamp] [SEVERITY] [source] message`, with
/// ` (file:line)` appended when the entry carries a location.
///
/// Entries below `min_severity` are dropped. The default threshold is
/// `Debug`, so per-draw `Trace` lines stay quiet unless asked for.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLogger {
    min_severity: LogSeverity,
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new(LogSeverity::Debug)
    }
}

impl DefaultLogger {
    pub fn new(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }

    pub fn min_severity(&self) -> LogSeverity {
        self.min_severity
    }

    /// True if `severity` passes the threshold
    pub fn accepts(&self, severity: LogSeverity) -> bool {
        severity >= self.min_severity
    }

    /// Render an entry without colors (tests, non-tty sinks)
    pub fn format_plain(entry: &LogEntry) -> String {
        Self::compose(entry, entry.severity.label(), &entry.source)
    }

    fn compose(entry: &LogEntry, severity: impl std::fmt::Display, source: impl std::fmt::Display) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            datetime.format("%Y-%m-%d %H:%M:%S%.3f"),
            severity,
            source,
            entry.message
        );
        if let (Some(file), Some(line_number)) = (entry.file, entry.line) {
            line.push_str(&format!(" ({}:{})", file, line_number));
        }
        line
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if !self.accepts(entry.severity) {
            return;
        }
        println!(
            "{}",
            Self::compose(entry, entry.severity.colored_label(), entry.source.bright_blue())
        );
    }
}

// ===== LOGGING MACROS =====

/// Shared body of the `engine_*` macros
#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::quad::Engine::log(
            $crate::quad::log::LogSeverity::$severity,
            $source,
            format!($($arg)*),
        )
    };
}

/// Log a TRACE message (per-call detail, e.g. every draw)
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Trace, $source, $($arg)*) };
}

/// Log a DEBUG message
///
/// ```no_run
/// # use quad_engine::engine_debug;
/// engine_debug!("quad::VertexArray", "Enabled {} attributes", 2);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Debug, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Info, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Warn, $source, $($arg)*) };
}

/// Log an ERROR message tagged with the calling file and line
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::quad::Engine::log_detailed(
            $crate::quad::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!(),
        )
    };
}

/// Log an ERROR and evaluate to an engine `Error`
///
/// `source => error, ...` yields `error`; without it the message becomes an
/// `Error::BackendError`.
///
/// ```no_run
/// # use quad_engine::engine_err;
/// # use quad_engine::quad::Error;
/// # fn f() -> quad_engine::quad::Result<()> {
/// Err(engine_err!("quad::VertexBuffer" => Error::OutOfMemory, "device returned handle {}", 0))
/// # }
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr => $error:expr, $($arg:tt)*) => {{
        $crate::quad::Engine::log_detailed(
            $crate::quad::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!(),
        );
        $error
    }};
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::quad::Engine::log_detailed(
            $crate::quad::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!(),
        );
        $crate::quad::Error::BackendError(message)
    }};
}

/// `engine_err!` then return it from the enclosing function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr => $error:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source => $error, $($arg)*))
    };
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}
