/*!
# Quad Engine

Core types for a minimal explicit-API renderer that draws one textured quad
(or a triangle) in a window.

This crate holds everything that does not touch the GPU directly: the frame
protocol, the traits a backend implements for it, configuration, logging and
the static draw payload. The Vulkan backend lives in
`quad_engine_renderer_vulkan`.

## Architecture

- **FrameSync**: per-slot fence and signals bounding in-flight work
- **Swapchain**: presentable images and their recreation lifecycle
- **CommandRecorder**: per-image command sequences, recorded once per generation
- **WindowSurface**: framebuffer size and event wait for minimized windows
- **FrameLoop**: the wait / acquire / submit / present protocol over the three

Transient surface states are reported as `SurfaceStatus` values; everything
else that goes wrong is an `Error`.
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod frame;
pub mod payload;

// Main quad namespace module
pub mod quad {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine logging entry point
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{
        Config, Payload, DebugConfig, DebugSeverity, DebugOutput, DebugMessageFilter,
        ValidationStats,
    };

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Frame protocol sub-module
    pub mod frame {
        pub use crate::frame::*;
    }

    // Static draw payload sub-module
    pub mod payload {
        pub use crate::payload::*;
    }
}

// Re-export math library at crate root
pub use glam;
