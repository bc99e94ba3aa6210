/// Window collaborator seam and the resize notification flag

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use crate::frame::Extent2D;

/// What the frame loop needs from the windowing system
pub trait WindowSurface {
    /// Current framebuffer size in pixels (zero while minimized)
    fn framebuffer_extent(&self) -> Extent2D;

    /// Block until at least one window event has been processed
    fn wait_events(&self);
}

/// Resize notification shared between the window and the frame loop
///
/// The window raises it from its event handler; the frame loop takes it
/// once per frame after presenting.
#[derive(Debug, Clone, Default)]
pub struct ResizeFlag {
    raised: Arc<AtomicBool>,
}

impl ResizeFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the window as resized
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Read and clear the flag
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
