/// Frame loop controller - drives wait, acquire, submit, present and recreation
///
/// One call to [`FrameLoop::draw_frame`] runs the per-frame protocol:
///
/// 1. Wait on the fence of slot `f = current_frame mod N`.
/// 2. Acquire an image with slot `f`'s "image available" signal. An out-of-date
///    surface recreates the swapchain and ends the call here, leaving the fence
///    signaled and `current_frame` unchanged.
/// 3. Refresh the image's uniforms, then reset slot `f`'s fence.
/// 4. Submit the image's recorded sequence (wait "image available", raise
///    "render finished" and the fence).
/// 5. Present after "render finished". An out-of-date or suboptimal result,
///    or a raised resize flag, recreates the swapchain.
/// 6. Advance `current_frame`.
///
/// The slot count N bounds how many submissions may be outstanding; it is
/// unrelated to the swapchain image count M.

use std::time::Instant;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::{CommandRecorder, FrameSync, ResizeFlag, SurfaceStatus, Swapchain, WindowSurface};
use crate::{engine_debug, engine_error, engine_info, engine_trace, engine_warn};

const SOURCE: &str = "quad::FrameLoop";

/// Result of one [`FrameLoop::draw_frame`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// An image was submitted and presented
    Presented {
        frame_slot: usize,
        image_index: u32,
        /// The swapchain was recreated after presenting
        recreated: bool,
    },
    /// Acquisition reported an out-of-date surface; the swapchain was
    /// recreated and the same slot will be used by the next call
    Skipped,
}

/// Counters accumulated over the loop's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames_presented: u64,
    pub recreations: u64,
    pub out_of_date_acquires: u64,
    pub suboptimal_acquires: u64,
    pub suboptimal_presents: u64,
    pub out_of_date_presents: u64,
    pub resize_requests: u64,
}

/// Per-frame protocol over a sync set, a swapchain and a command recorder
///
/// Field order is the teardown order: recorded sequences and their
/// generation resources first, then the swapchain, then the frame slots.
/// Dropping the loop drains the device before any of them is released.
pub struct FrameLoop<Y, S, R>
where
    Y: FrameSync,
    S: Swapchain<Semaphore = Y::Semaphore>,
    R: CommandRecorder<S, Fence = Y::Fence>,
{
    recorder: R,
    swapchain: S,
    sync: Y,
    resize: ResizeFlag,
    current_frame: usize,
    generation: u64,
    stats: FrameStats,
    start: Instant,
}

impl<Y, S, R> FrameLoop<Y, S, R>
where
    Y: FrameSync,
    S: Swapchain<Semaphore = Y::Semaphore>,
    R: CommandRecorder<S, Fence = Y::Fence>,
{
    /// Build the loop and record the first swapchain generation
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration (`frames_in_flight` must match `sync`)
    /// * `sync` - Frame slots, fences created signaled
    /// * `swapchain` - First swapchain generation
    /// * `recorder` - Command recorder, nothing recorded yet
    /// * `resize` - Flag raised by the window on resize
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidResource` if `sync` has no slots or a slot count
    /// different from the configuration, and any error from recording.
    pub fn new(config: &Config, sync: Y, swapchain: S, mut recorder: R, resize: ResizeFlag) -> Result<Self> {
        let frames = sync.frames_in_flight();
        if frames == 0 {
            return Err(Error::InvalidResource("Frame sync has no frame slots".to_string()));
        }
        if frames != config.frames_in_flight {
            return Err(Error::InvalidResource(format!(
                "Frame sync has {} slots but the configuration asks for {}",
                frames, config.frames_in_flight
            )));
        }

        recorder.record_all(&swapchain)?;

        engine_info!(
            SOURCE,
            "Frame loop ready: {} frames in flight, {} swapchain images, {}x{}",
            frames,
            swapchain.image_count(),
            swapchain.extent().width,
            swapchain.extent().height
        );

        Ok(Self {
            recorder,
            swapchain,
            sync,
            resize,
            current_frame: 0,
            generation: 0,
            stats: FrameStats::default(),
            start: Instant::now(),
        })
    }

    /// Run one iteration of the frame protocol
    ///
    /// # Arguments
    ///
    /// * `window` - Queried for the framebuffer size if the swapchain must be recreated
    ///
    /// # Errors
    ///
    /// Any non-transient failure from wait, acquire, submit, present or
    /// recreation. Out-of-date and suboptimal statuses never surface here.
    pub fn draw_frame<W: WindowSurface + ?Sized>(&mut self, window: &W) -> Result<FrameOutcome> {
        let slot = self.frame_slot();

        self.sync.wait(slot)?;

        let image_available = self.sync.image_available(slot);
        let (image_index, acquire_status) = self.swapchain.acquire_next_image(image_available)?;

        match acquire_status {
            SurfaceStatus::OutOfDate => {
                self.stats.out_of_date_acquires += 1;
                engine_debug!(SOURCE, "Acquire reported an out-of-date surface on slot {}", slot);
                self.recreate_swapchain(window)?;
                return Ok(FrameOutcome::Skipped);
            }
            SurfaceStatus::Suboptimal => {
                self.stats.suboptimal_acquires += 1;
            }
            SurfaceStatus::Optimal => {}
        }

        self.recorder.prepare(image_index, self.start.elapsed())?;

        // The fence stays signaled until an image is actually in hand
        self.sync.reset(slot)?;

        let render_finished = self.sync.render_finished(slot);
        self.recorder.submit(
            image_index,
            image_available,
            render_finished,
            self.sync.in_flight_fence(slot),
        )?;

        let present_status = self.swapchain.present(image_index, render_finished)?;
        let resized = self.resize.take();

        let recreate = match present_status {
            SurfaceStatus::OutOfDate => {
                self.stats.out_of_date_presents += 1;
                true
            }
            SurfaceStatus::Suboptimal => {
                self.stats.suboptimal_presents += 1;
                true
            }
            SurfaceStatus::Optimal => resized,
        };
        if resized {
            self.stats.resize_requests += 1;
        }
        if recreate {
            engine_debug!(
                SOURCE,
                "Recreating after present (status {:?}, resized: {})",
                present_status,
                resized
            );
            self.recreate_swapchain(window)?;
        }

        self.stats.frames_presented += 1;
        engine_trace!(SOURCE, "Frame {} presented image {} on slot {}", self.current_frame, image_index, slot);

        self.current_frame += 1;

        Ok(FrameOutcome::Presented {
            frame_slot: slot,
            image_index,
            recreated: recreate,
        })
    }

    /// Rebuild the swapchain generation for the window's current size
    ///
    /// Blocks on window events while the framebuffer is zero-sized, then
    /// drains the device, releases the recorded generation, recreates the
    /// swapchain and records the new generation. Frame slots are kept.
    pub fn recreate_swapchain<W: WindowSurface + ?Sized>(&mut self, window: &W) -> Result<()> {
        let mut extent = window.framebuffer_extent();
        if extent.is_zero() {
            engine_debug!(SOURCE, "Framebuffer is zero-sized, waiting for the window to be restored");
        }
        while extent.is_zero() {
            window.wait_events();
            extent = window.framebuffer_extent();
        }

        self.recorder.wait_idle()?;

        let old_count = self.swapchain.image_count();
        self.recorder.release();
        if let Err(e) = self.swapchain.recreate(extent) {
            engine_error!(SOURCE, "Swapchain recreation failed: {}", e);
            return Err(e);
        }
        self.recorder.record_all(&self.swapchain)?;

        self.generation += 1;
        self.stats.recreations += 1;

        engine_info!(
            SOURCE,
            "Swapchain generation {}: {}x{}, {} -> {} images",
            self.generation,
            extent.width,
            extent.height,
            old_count,
            self.swapchain.image_count()
        );
        Ok(())
    }

    /// Block until the device has finished all submitted work
    pub fn wait_idle(&self) -> Result<()> {
        self.recorder.wait_idle()
    }

    /// Frames presented so far (monotonic, not wrapped)
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Slot the next frame will use
    pub fn frame_slot(&self) -> usize {
        self.current_frame % self.sync.frames_in_flight()
    }

    /// Number of swapchain recreations so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn swapchain(&self) -> &S {
        &self.swapchain
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn sync(&self) -> &Y {
        &self.sync
    }
}

impl<Y, S, R> Drop for FrameLoop<Y, S, R>
where
    Y: FrameSync,
    S: Swapchain<Semaphore = Y::Semaphore>,
    R: CommandRecorder<S, Fence = Y::Fence>,
{
    fn drop(&mut self) {
        // Nothing below may be destroyed while the GPU still references it
        if let Err(e) = self.recorder.wait_idle() {
            engine_warn!(SOURCE, "Device wait idle failed during shutdown: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "frame_loop_tests.rs"]
mod tests;
