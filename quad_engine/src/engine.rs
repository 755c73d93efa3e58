/// Quad Engine - process-wide logging entry point
///
/// Device state is not global here: every resource reaches the device through
/// the `GpuContext` it was created with. The only process-wide state is the
/// logger, which may be replaced at any time from any thread.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

type SharedLogger = RwLock<Box<dyn Logger>>;

/// Installed logger, `DefaultLogger` until replaced
static LOGGER: OnceLock<SharedLogger> = OnceLock::new();

fn logger() -> &'static SharedLogger {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

fn install(replacement: Box<dyn Logger>) {
    let mut slot = logger().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = replacement;
}

fn dispatch(entry: LogEntry) {
    let slot = logger().read().unwrap_or_else(|poisoned| poisoned.into_inner());
    slot.log(&entry);
}

/// Engine facade for process-wide services
pub struct Engine;

impl Engine {
    /// Replace the logger for the whole process
    ///
    /// ```no_run
    /// use quad_engine::quad::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct Silent;
    /// impl Logger for Silent {
    ///     fn log(&self, _entry: &LogEntry) {}
    /// }
    ///
    /// Engine::set_logger(Silent);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        install(Box::new(logger_impl));
    }

    /// Back to a `DefaultLogger` with the default threshold
    pub fn reset_logger() {
        install(Box::new(DefaultLogger::default()));
    }

    /// Log without a source location (engine_trace! .. engine_warn!)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Log with the caller's file and line (engine_error!, engine_err!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }
}
