//! Engine log records and the console sink
//!
//! Every message carries a severity, a dotted source tag such as
//! `quad::frame` and, for errors, the file and line of the call site.
//! Records go through [`Engine::log`](crate::quad::Engine::log) to whichever
//! [`Logger`] is installed; [`DefaultLogger`] prints one colored line each.

use chrono::{DateTime, Local};
use colored::*;
use std::time::SystemTime;

/// Sink for engine log records
///
/// Installed with [`Engine::set_logger`](crate::quad::Engine::set_logger).
/// Called from whichever thread logs, so implementations synchronize
/// their own state.
///
/// ```no_run
/// use quad_engine::quad::log::{Logger, LogEntry, LogSeverity};
///
/// struct ErrorsToStderr;
///
/// impl Logger for ErrorsToStderr {
///     fn log(&self, entry: &LogEntry) {
///         if entry.severity == LogSeverity::Error {
///             eprintln!("{}: {}", entry.source, entry.message);
///         }
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Dotted tag of the emitting subsystem (`quad::frame`, `quad::vulkan`, ...)
    pub source: String,
    pub message: String,
    /// Call site, filled in by `engine_error!`, `engine_err!` and `engine_bail!`
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

impl LogEntry {
    /// `file:line` of the call site, when recorded
    pub fn location(&self) -> Option<String> {
        match (self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        }
    }
}

/// Ordered from the most verbose to the most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-frame detail
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// Five-character label, padded so columns line up
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colorize(self) -> ColoredString {
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

/// Stdout sink: `[local time] [SEVERITY] [source] message (file:line)`
///
/// Records below `min_severity` are dropped; the default threshold is
/// `Debug`, which keeps per-frame trace lines out of the console.
pub struct DefaultLogger {
    pub min_severity: LogSeverity,
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self { min_severity: LogSeverity::Debug }
    }
}

impl DefaultLogger {
    /// Render `entry` as printed (with color codes when the terminal takes them)
    pub fn format(&self, entry: &LogEntry) -> String {
        let local: DateTime<Local> = entry.timestamp.into();
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            local.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.severity.colorize(),
            entry.source.bright_blue(),
            entry.message
        );
        if let Some(location) = entry.location() {
            line.push_str(&format!(" ({})", location));
        }
        line
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity >= self.min_severity {
            println!("{}", self.format(entry));
        }
    }
}

// ===== LOGGING MACROS =====

/// Shared expansion of the severity macros
#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::quad::Engine::log(
            $crate::quad::log::LogSeverity::$severity,
            $source,
            format!($($arg)*)
        )
    };
}

/// Per-frame detail, dropped by the default logger
///
/// ```no_run
/// quad_engine::engine_trace!("quad::frame", "Presented image {}", 2);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Trace, $source, $($arg)*) };
}

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

/// Error with the call site attached
///
/// ```no_run
/// quad_engine::engine_error!("quad::demo", "Window creation failed: {}", "no display");
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::quad::Engine::log_detailed(
            $crate::quad::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an error and evaluate to `Error::BackendError` carrying the same text
///
/// ```no_run
/// fn submit(code: i32) -> quad_engine::quad::Result<()> {
///     Err(quad_engine::engine_err!("quad::vulkan", "vkQueueSubmit returned {}", code))
/// }
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::quad::Engine::log_detailed(
            $crate::quad::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::quad::Error::BackendError(message)
    }};
}

/// `return Err(engine_err!(..))`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
