//! Unit tests for the demo's event-loop decisions

use super::*;

#[test]
fn test_control_flow_waits_while_minimized() {
    assert_eq!(control_flow_for(Extent2D::new(0, 0)), ControlFlow::Wait);
    assert_eq!(control_flow_for(Extent2D::new(800, 0)), ControlFlow::Wait);
    assert_eq!(control_flow_for(Extent2D::new(0, 600)), ControlFlow::Wait);
}

#[test]
fn test_control_flow_polls_when_visible() {
    assert_eq!(control_flow_for(Extent2D::new(800, 600)), ControlFlow::Poll);
    assert_eq!(control_flow_for(Extent2D::new(1, 1)), ControlFlow::Poll);
}

#[test]
fn test_resolve_shader_dir_keeps_unknown_relative_path() {
    let mut config = Config { shader_dir: PathBuf::from("no_such_shader_dir"), ..Config::default() };
    resolve_shader_dir(&mut config);
    assert_eq!(config.shader_dir, PathBuf::from("no_such_shader_dir"));
}

#[test]
fn test_resolve_shader_dir_keeps_absolute_path() {
    let mut config = Config { shader_dir: PathBuf::from("/nonexistent/spv"), ..Config::default() };
    resolve_shader_dir(&mut config);
    assert_eq!(config.shader_dir, PathBuf::from("/nonexistent/spv"));
}
