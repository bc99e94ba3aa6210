/// Command recorder trait - pre-recorded per-image command sequences

use std::time::Duration;
use crate::error::Result;
use crate::frame::Swapchain;

/// Builds, updates and submits one command sequence per presentable image
///
/// Sequences are recorded once per swapchain generation and resubmitted on
/// every use of their image, so they must allow resubmission while a
/// previous submission may still be pending.
pub trait CommandRecorder<S: Swapchain> {
    /// CPU-waitable completion handle shared with [`FrameSync`](crate::frame::FrameSync)
    type Fence: Copy;

    /// Record one sequence per image of the current `swapchain` generation
    ///
    /// Builds every generation-scoped resource the sequences reference
    /// (pipeline, per-image uniform buffers, descriptor sets).
    fn record_all(&mut self, swapchain: &S) -> Result<()>;

    /// Release everything built by [`record_all`](CommandRecorder::record_all)
    ///
    /// Called with the device idle, before the swapchain is recreated.
    fn release(&mut self);

    /// Refresh per-image data (uniforms) for `image_index` before it is submitted
    fn prepare(&mut self, image_index: u32, elapsed: Duration) -> Result<()>;

    /// Submit the sequence recorded for `image_index`
    ///
    /// The GPU waits on `wait` at the color attachment output stage, then
    /// raises `signal` and `fence` on completion.
    fn submit(
        &mut self,
        image_index: u32,
        wait: S::Semaphore,
        signal: S::Semaphore,
        fence: Self::Fence,
    ) -> Result<()>;

    /// Block until the device has no outstanding work
    fn wait_idle(&self) -> Result<()>;
}
