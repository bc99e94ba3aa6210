//! Quad demo - opens a window and draws a rotating textured quad (or a triangle)
//!
//! Usage: quad_demo [--triangle] [--validation | --no-validation] [--frames-in-flight N]
//!                  [--shader-dir PATH] [--size WIDTHxHEIGHT]
//!
//! Escape or closing the window exits. Exit code 0 on a clean exit, 1 on error.

mod args;

use quad_engine::quad::frame::{Extent2D, ResizeFlag, WindowSurface};
use quad_engine::quad::{Config, Error, Result};
use quad_engine::{engine_error, engine_info, engine_warn};
use quad_engine_renderer_vulkan::{create_frame_loop, VulkanFrameLoop};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

const SOURCE: &str = "quad::demo";

/// Window seen by the frame loop
///
/// `App::draw` never draws while the window is minimized and
/// `about_to_wait` blocks on events instead, so the frame loop's zero-extent
/// wait is not reached from this demo. If it were, `wait_events` could only
/// sleep: events are not dispatched inside a winit callback, and the loop
/// relies on `inner_size()` querying the platform rather than returning a
/// size cached from processed events.
struct DemoSurface<'a>(&'a Window);

impl WindowSurface for DemoSurface<'_> {
    fn framebuffer_extent(&self) -> Extent2D {
        Extent2D::from(self.0.inner_size())
    }

    fn wait_events(&self) {
        std::thread::sleep(Duration::from_millis(16));
    }
}

/// Demo application state
///
/// The frame loop is declared before the window so it is dropped first:
/// the surface must go before the window it was created from.
struct App {
    frame_loop: Option<VulkanFrameLoop>,
    window: Option<Window>,
    config: Config,
    resize: ResizeFlag,
    error: Option<Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            frame_loop: None,
            window: None,
            config,
            resize: ResizeFlag::new(),
            error: None,
        }
    }

    /// Keep the first error and stop the event loop (reported by `main`)
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn framebuffer_extent(&self) -> Option<Extent2D> {
        self.window.as_ref().map(|window| Extent2D::from(window.inner_size()))
    }

    /// Draw one frame unless an error is pending or the window is minimized
    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        if self.error.is_some() || self.framebuffer_extent().is_some_and(|e| e.is_zero()) {
            return;
        }
        let result = match (self.frame_loop.as_mut(), self.window.as_ref()) {
            (Some(frame_loop), Some(window)) => frame_loop.draw_frame(&DemoSurface(window)),
            _ => return,
        };
        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    /// Drain the device, report and release everything, then return the
    /// first error seen by the event loop
    fn shutdown(mut self) -> Result<()> {
        if let Some(frame_loop) = self.frame_loop.take() {
            if let Err(e) = frame_loop.wait_idle() {
                engine_warn!(SOURCE, "Device drain failed during shutdown: {}", e);
            }
            let stats = frame_loop.stats();
            engine_info!(
                SOURCE,
                "Presented {} frames, {} swapchain recreations",
                stats.frames_presented,
                stats.recreations
            );
        }
        self.window = None;

        #[cfg(feature = "vulkan-validation")]
        if self.config.enable_validation {
            quad_engine_renderer_vulkan::print_validation_stats_report();
        }

        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.config.app_name.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ))
            .with_resizable(true);

        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(e) => {
                self.fail(event_loop, Error::InitializationFailed(format!("Failed to create window: {}", e)));
                return;
            }
        };

        match create_frame_loop(&window, &self.config, self.resize.clone()) {
            Ok(frame_loop) => {
                engine_info!(SOURCE, "Initialization complete, entering main loop");
                self.frame_loop = Some(frame_loop);
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                engine_info!(SOURCE, "Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                engine_info!(SOURCE, "Escape pressed, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                self.resize.raise();
            }
            WindowEvent::RedrawRequested => self.draw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(extent) = self.framebuffer_extent() else {
            return;
        };
        let control_flow = control_flow_for(extent);
        event_loop.set_control_flow(control_flow);
        if control_flow == ControlFlow::Poll {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

/// Redraw continuously, or block on events while the framebuffer is empty
fn control_flow_for(extent: Extent2D) -> ControlFlow {
    if extent.is_zero() {
        ControlFlow::Wait
    } else {
        ControlFlow::Poll
    }
}

/// Fall back to the shaders shipped with the demo when the configured
/// relative directory does not exist (e.g. running from the workspace root)
fn resolve_shader_dir(config: &mut Config) {
    if config.shader_dir.is_relative() && !config.shader_dir.exists() {
        let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(&config.shader_dir);
        if bundled.exists() {
            config.shader_dir = bundled;
        }
    }
}

fn run(mut config: Config) -> Result<()> {
    resolve_shader_dir(&mut config);

    let event_loop = EventLoop::new()
        .map_err(|e| Error::InitializationFailed(format!("Failed to create event loop: {}", e)))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    let run_result = event_loop
        .run_app(&mut app)
        .map_err(|e| Error::BackendError(format!("Event loop failed: {}", e)));

    let shutdown_result = app.shutdown();
    run_result.and(shutdown_result)
}

fn main() -> ExitCode {
    let result = args::config_from_env().and_then(run);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            engine_error!(SOURCE, "Fatal: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
