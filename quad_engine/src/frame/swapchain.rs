/// Swapchain trait - presentable images and their recreation lifecycle

use crate::error::Result;

/// Size of a surface or framebuffer in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (minimized window)
    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Extent2D {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self { width: size.width, height: size.height }
    }
}

/// Outcome of an acquire or present that did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    /// The swapchain matches the surface
    Optimal,
    /// Usable, but the swapchain should be recreated soon
    Suboptimal,
    /// Unusable: recreate before rendering again
    OutOfDate,
}

/// Owner of the presentable images (M) and everything built per generation
///
/// Images, views, framebuffers and the render pass belong to one swapchain
/// generation. [`recreate`](Swapchain::recreate) replaces all of them; the
/// image count may change, so callers re-read [`image_count`](Swapchain::image_count)
/// after every recreation.
pub trait Swapchain {
    /// GPU-side signal handle shared with [`FrameSync`](crate::frame::FrameSync)
    type Semaphore: Copy;

    /// Acquire the next presentable image, raising `signal` when it is ready
    ///
    /// Blocks without timeout. On [`SurfaceStatus::OutOfDate`] the returned
    /// index is meaningless and `signal` is not raised.
    ///
    /// # Errors
    ///
    /// Any failure other than the transient statuses is fatal.
    fn acquire_next_image(&mut self, signal: Self::Semaphore) -> Result<(u32, SurfaceStatus)>;

    /// Queue `image_index` for presentation once `wait` is raised
    ///
    /// # Errors
    ///
    /// Any failure other than the transient statuses is fatal.
    fn present(&mut self, image_index: u32, wait: Self::Semaphore) -> Result<SurfaceStatus>;

    /// Destroy and rebuild every generation-scoped object for `extent`
    ///
    /// The device must be idle and `extent` nonzero.
    fn recreate(&mut self, extent: Extent2D) -> Result<()>;

    /// Number of presentable images in the current generation (M)
    fn image_count(&self) -> usize;

    /// Extent of the current generation's images
    fn extent(&self) -> Extent2D;
}
