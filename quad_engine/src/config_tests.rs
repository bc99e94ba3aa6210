//! Unit tests for config.rs

use crate::config::{Config, Payload, DebugSeverity, DebugOutput, ValidationStats};
use crate::error::Error;
use std::path::PathBuf;

// ============================================================================
// DEFAULTS
// ============================================================================

#[test]
fn test_default_config_values() {
    let config = Config::default();
    assert_eq!(config.window_width, 800);
    assert_eq!(config.window_height, 600);
    assert_eq!(config.frames_in_flight, 2);
    assert_eq!(config.enable_validation, cfg!(debug_assertions));
    assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(config.payload, Payload::TexturedQuad);
    assert_eq!(config.shader_dir, PathBuf::from("shaders"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_debug_config() {
    let config = Config::default();
    assert_eq!(config.debug.severity, DebugSeverity::ErrorsAndWarnings);
    assert_eq!(config.debug.output, DebugOutput::Console);
    assert!(!config.debug.break_on_error);
    assert!(config.debug.enable_stats);
}

#[test]
fn test_payload_properties() {
    assert_eq!(Payload::Triangle.shader_stem(), "triangle");
    assert_eq!(Payload::TexturedQuad.shader_stem(), "quad");
    assert!(!Payload::Triangle.binds_resources());
    assert!(Payload::TexturedQuad.binds_resources());
}

#[test]
fn test_validation_stats_total() {
    let stats = ValidationStats { errors: 1, warnings: 2, info: 3, verbose: 4 };
    assert_eq!(stats.total(), 10);
    assert_eq!(ValidationStats::default().total(), 0);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_validate_rejects_zero_frames_in_flight() {
    let config = Config { frames_in_flight: 0, ..Config::default() };
    assert!(matches!(config.validate(), Err(Error::InitializationFailed(_))));
}

#[test]
fn test_validate_rejects_zero_window() {
    let config = Config { window_height: 0, ..Config::default() };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_empty_name() {
    let config = Config { app_name: String::new(), ..Config::default() };
    assert!(config.validate().is_err());
}
