//! Unit tests for the Engine logging API
//!
//! IMPORTANT: LOGGER is a global OnceLock shared across all tests.
//! All tests are marked with #[serial] to run sequentially, and only entries
//! from the "quad::test" source are inspected since other unit tests log too.

use crate::quad::Engine;
use crate::quad::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == "quad::test" {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_log_routes_to_custom_logger() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, "quad::test", "hello".to_string());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].source, "quad::test");
    assert_eq!(captured[0].message, "hello");
    assert!(captured[0].file.is_none());
    drop(captured);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_log_detailed_carries_location() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log_detailed(LogSeverity::Error, "quad::test", "boom".to_string(), "x.rs", 7);

    let captured = entries.lock().unwrap();
    assert_eq!(captured[0].file, Some("x.rs"));
    assert_eq!(captured[0].line, Some(7));
    drop(captured);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_macros_log_through_engine() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    crate::engine_trace!("quad::test", "trace {}", 1);
    crate::engine_debug!("quad::test", "debug {}", 2);
    crate::engine_info!("quad::test", "info {}", 3);
    crate::engine_warn!("quad::test", "warn {}", 4);
    crate::engine_error!("quad::test", "error {}", 5);
    let _ = crate::engine_err!("quad::test", "err {}", 6);

    let captured = entries.lock().unwrap();
    let severities: Vec<LogSeverity> = captured.iter().map(|e| e.severity).collect();
    assert_eq!(
        severities,
        vec![
            LogSeverity::Trace,
            LogSeverity::Debug,
            LogSeverity::Info,
            LogSeverity::Warn,
            LogSeverity::Error,
            LogSeverity::Error,
        ]
    );
    assert_eq!(captured[5].message, "err 6");
    assert!(captured[4].line.is_some());
    assert!(captured[5].file.unwrap().ends_with("engine_tests.rs"));
    drop(captured);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::reset_logger();

    Engine::log(LogSeverity::Warn, "quad::test", "not captured".to_string());

    assert!(entries.lock().unwrap().is_empty());
}
