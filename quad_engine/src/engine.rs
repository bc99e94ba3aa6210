/// Process-wide logger slot behind the `engine_*!` macros
///
/// One boxed [`Logger`] lives in a lazily initialized `RwLock`, starting as
/// [`DefaultLogger`]. A poisoned lock drops the record instead of panicking.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

fn install(logger: Box<dyn Logger>) {
    if let Ok(mut current) = slot().write() {
        *current = logger;
    }
}

fn dispatch(severity: LogSeverity, source: &str, message: String, call_site: Option<(&'static str, u32)>) {
    let Ok(logger) = slot().read() else {
        return;
    };
    logger.log(&LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: source.to_string(),
        message,
        file: call_site.map(|(file, _)| file),
        line: call_site.map(|(_, line)| line),
    });
}

/// Static entry point; the frame loop and backend log through it
///
/// ```no_run
/// use quad_engine::quad::{Engine, log::{DefaultLogger, LogSeverity}};
///
/// // Show per-frame acquire/present traces while debugging a stall
/// Engine::set_logger(DefaultLogger { min_severity: LogSeverity::Trace });
/// ```
pub struct Engine;

impl Engine {
    /// Route all subsequent records to `logger`
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        install(Box::new(logger));
    }

    /// Go back to a [`DefaultLogger`] with its default threshold
    pub fn reset_logger() {
        install(Box::new(DefaultLogger::default()));
    }

    /// Record without a call site (`engine_trace!` .. `engine_warn!`)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        dispatch(severity, source, message, None);
    }

    /// Record with `file:line` (`engine_error!`, `engine_err!`, `engine_bail!`)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        dispatch(severity, source, message, Some((file, line)));
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
