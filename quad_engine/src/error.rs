//! Error types for the quad engine
//!
//! This module defines the error types used throughout the engine,
//! covering setup, resource creation and the per-frame protocol.
//!
//! Transient presentation states (suboptimal, out of date) are not errors:
//! they are reported as [`SurfaceStatus`](crate::frame::SurfaceStatus) values.

use std::fmt;

/// Result type for quad engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Quad engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (unexpected non-success status from a GPU call)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (shader bytecode, buffer, texture, argument)
    InvalidResource(String),

    /// Initialization failed (instance, device, window, swapchain, pipeline)
    InitializationFailed(String),

    /// Reading an asset from disk failed (precompiled shader binaries)
    AssetLoadFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::AssetLoadFailed(msg) => write!(f, "Asset load failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
