//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the error macros.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "quad::test".to_string(),
        message: format!("{:?} message", severity),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_copy() {
    let sev1 = LogSeverity::Info;
    let sev2 = sev1;
    assert_eq!(sev1, sev2);
    assert_eq!(sev1, LogSeverity::Info);
}

#[test]
fn test_log_severity_labels_have_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Info.label().trim_end(), "INFO");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_without_file_line() {
    let e = entry(LogSeverity::Info, None, None);
    assert_eq!(e.severity, LogSeverity::Info);
    assert_eq!(e.source, "quad::test");
    assert!(e.file.is_none());
    assert!(e.line.is_none());
}

#[test]
fn test_log_entry_clone() {
    let e1 = entry(LogSeverity::Warn, Some("frame_loop.rs"), Some(10));
    let e2 = e1.clone();
    assert_eq!(e1.severity, e2.severity);
    assert_eq!(e1.message, e2.message);
    assert_eq!(e1.file, e2.file);
    assert_eq!(e1.line, e2.line);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_min_severity_is_debug() {
    let logger = DefaultLogger::default();
    assert_eq!(logger.min_severity, LogSeverity::Debug);
}

#[test]
fn test_default_logger_all_severities() {
    // Just verify nothing panics, filtered or not
    let logger = DefaultLogger { min_severity: LogSeverity::Trace };
    logger.log(&entry(LogSeverity::Trace, None, None));
    logger.log(&entry(LogSeverity::Debug, None, None));
    logger.log(&entry(LogSeverity::Info, None, None));
    logger.log(&entry(LogSeverity::Warn, None, None));
    logger.log(&entry(LogSeverity::Error, Some("vulkan_swapchain.rs"), Some(99)));
}

#[test]
fn test_log_entry_location() {
    assert_eq!(
        entry(LogSeverity::Error, Some("vulkan_buffer.rs"), Some(42)).location().as_deref(),
        Some("vulkan_buffer.rs:42")
    );
    assert_eq!(entry(LogSeverity::Error, Some("vulkan_buffer.rs"), None).location(), None);
}

#[test]
fn test_default_logger_format() {
    colored::control::set_override(false);
    let logger = DefaultLogger::default();

    let plain = logger.format(&entry(LogSeverity::Info, None, None));
    assert!(plain.ends_with("] [INFO ] [quad::test] Info message"));
    assert!(plain.starts_with('['));

    let detailed = logger.format(&entry(LogSeverity::Error, Some("frame_loop.rs"), Some(7)));
    assert!(detailed.ends_with("[ERROR] [quad::test] Error message (frame_loop.rs:7)"));
    colored::control::unset_override();
}

#[test]
fn test_default_logger_filters_below_min() {
    let logger = DefaultLogger { min_severity: LogSeverity::Error };
    logger.log(&entry(LogSeverity::Trace, None, None));
    logger.log(&entry(LogSeverity::Warn, None, None));
}

// ============================================================================
// ERROR MACROS
// ============================================================================

#[test]
fn test_engine_err_builds_backend_error() {
    let err = crate::engine_err!("quad::log_test", "Acquire failed: {}", -1000001004);
    match err {
        crate::quad::Error::BackendError(msg) => assert_eq!(msg, "Acquire failed: -1000001004"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_engine_bail_returns_early() {
    fn check(index: u32) -> crate::quad::Result<u32> {
        if index > 2 {
            crate::engine_bail!("quad::log_test", "Index {} out of range", index);
        }
        Ok(index)
    }
    assert_eq!(check(1).ok(), Some(1));
    assert!(matches!(check(5), Err(crate::quad::Error::BackendError(_))));
}
