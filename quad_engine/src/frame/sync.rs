/// Frame synchronization primitives - one fence and two signals per frame slot

use crate::error::Result;

/// Per-slot CPU and GPU synchronization objects
///
/// Slot `f` in `[0, frames_in_flight())` owns:
/// - a CPU-waitable fence, created signaled so the first wait returns at once
/// - an "image available" signal, raised by the presentation engine on acquire
/// - a "render finished" signal, raised by the queue when the slot's work completes
///
/// Signals are opaque handles used only as submission dependencies.
/// Implementations must not be dropped while the GPU still references them:
/// drain the device first.
pub trait FrameSync {
    /// GPU-side signal handle
    type Semaphore: Copy;
    /// CPU-waitable completion handle
    type Fence: Copy;

    /// Number of frame slots (N)
    fn frames_in_flight(&self) -> usize;

    /// Block until the fence of slot `frame` is signaled (no timeout)
    fn wait(&self, frame: usize) -> Result<()>;

    /// Return the fence of slot `frame` to the unsignaled state
    ///
    /// Only valid after a [`wait`](FrameSync::wait) on the same slot.
    fn reset(&self, frame: usize) -> Result<()>;

    /// Wait then reset the fence of slot `frame`
    ///
    /// The frame loop does not use this: it must keep the fence signaled
    /// when acquisition reports an out-of-date surface.
    fn wait_and_reset(&self, frame: usize) -> Result<()> {
        self.wait(frame)?;
        self.reset(frame)
    }

    /// Signal raised when the acquired image is ready to be rendered into
    fn image_available(&self, frame: usize) -> Self::Semaphore;

    /// Signal raised when the slot's submitted work has finished rendering
    fn render_finished(&self, frame: usize) -> Self::Semaphore;

    /// Fence signaled when the slot's submitted work has completed
    fn in_flight_fence(&self, frame: usize) -> Self::Fence;
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
