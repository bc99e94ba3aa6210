/// Application configuration
///
/// Window size, in-flight depth, validation toggles and the draw payload are
/// gathered into one immutable [`Config`] value built at startup and handed
/// to the backend and the frame loop at construction.

use std::path::PathBuf;
use crate::error::{Error, Result};

/// Resource-binding variant drawn by the command recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Three vertices generated in the vertex shader, no buffers, no descriptors
    Triangle,
    /// Indexed quad with vertex/index buffers, a uniform buffer and a sampled texture
    TexturedQuad,
}

impl Payload {
    /// Base file name of the SPIR-V shader pair for this payload
    ///
    /// The backend appends `.vert.spv` / `.frag.spv`.
    pub fn shader_stem(self) -> &'static str {
        match self {
            Payload::Triangle => "triangle",
            Payload::TexturedQuad => "quad",
        }
    }

    /// Whether vertex, index and descriptor resources are bound
    pub fn binds_resources(self) -> bool {
        matches!(self, Payload::TexturedQuad)
    }
}

/// Validation message severity filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Where validation messages are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugOutput {
    Console,
    File(String),
    Both(String),
}

/// Validation message category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessageFilter {
    pub show_general: bool,
    pub show_validation: bool,
    pub show_performance: bool,
}

impl Default for DebugMessageFilter {
    fn default() -> Self {
        Self {
            show_general: true,
            show_validation: true,
            show_performance: true,
        }
    }
}

/// Validation messenger settings (used only when validation is enabled)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugConfig {
    pub severity: DebugSeverity,
    pub output: DebugOutput,
    pub message_filter: DebugMessageFilter,
    /// Abort the process on the first validation error (for debugger attachment)
    pub break_on_error: bool,
    /// Count messages per severity and group repeats
    pub enable_stats: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            severity: DebugSeverity::ErrorsAndWarnings,
            output: DebugOutput::Console,
            message_filter: DebugMessageFilter::default(),
            break_on_error: false,
            enable_stats: true,
        }
    }
}

/// Counters reported by the validation messenger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

/// Immutable application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name (window title, VkApplicationInfo)
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Initial window width in pixels
    pub window_width: u32,
    /// Initial window height in pixels
    pub window_height: u32,
    /// Number of frame slots (frames that may be submitted but not yet complete)
    pub frames_in_flight: usize,
    /// Request the Khronos validation layer and a debug messenger
    pub enable_validation: bool,
    /// Color the render pass clears to
    pub clear_color: [f32; 4],
    /// What the command recorder draws
    pub payload: Payload,
    /// Directory holding the precompiled SPIR-V shaders
    pub shader_dir: PathBuf,
    /// Validation messenger settings
    pub debug: DebugConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Quad".to_string(),
            app_version: (1, 0, 0),
            window_width: 800,
            window_height: 600,
            frames_in_flight: 2,
            enable_validation: cfg!(debug_assertions),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            payload: Payload::TexturedQuad,
            shader_dir: PathBuf::from("shaders"),
            debug: DebugConfig::default(),
        }
    }
}

impl Config {
    /// Check the values that would make setup or the frame loop meaningless
    ///
    /// # Errors
    ///
    /// Returns `Error::InitializationFailed` for an empty app name, a zero
    /// window size or zero frames in flight.
    pub fn validate(&self) -> Result<()> {
        if self.app_name.is_empty() {
            return Err(Error::InitializationFailed("Application name is empty".to_string()));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(Error::InitializationFailed(format!(
                "Window size must be nonzero, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        if self.frames_in_flight == 0 {
            return Err(Error::InitializationFailed(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
