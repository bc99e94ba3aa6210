/// Frame sync - per-slot fences and semaphores

use ash::vk;
use quad_engine::quad::frame::FrameSync;
use quad_engine::quad::{Error, Result};
use quad_engine::{engine_debug, engine_err, engine_error};
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;

/// N frame slots, each with an in-flight fence (created signaled), an
/// "image available" and a "render finished" semaphore
pub struct VulkanFrameSync {
    ctx: Arc<VulkanContext>,
    image_available: Vec<vk::Semaphore>,
    render_finished: Vec<vk::Semaphore>,
    in_flight: Vec<vk::Fence>,
}

impl VulkanFrameSync {
    /// Create `frames_in_flight` slots
    pub fn new(ctx: Arc<VulkanContext>, frames_in_flight: usize) -> Result<Self> {
        let mut sync = Self {
            ctx,
            image_available: Vec::with_capacity(frames_in_flight),
            render_finished: Vec::with_capacity(frames_in_flight),
            in_flight: Vec::with_capacity(frames_in_flight),
        };

        let semaphore_info = vk::SemaphoreCreateInfo::default();
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

        // Objects created before a failure are released by Drop
        for _ in 0..frames_in_flight {
            unsafe {
                let device = &sync.ctx.device;
                let image_available = device.create_semaphore(&semaphore_info, None).map_err(|e| {
                    engine_error!("quad::vulkan", "Failed to create image-available semaphore: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                })?;
                sync.image_available.push(image_available);

                let render_finished = device.create_semaphore(&semaphore_info, None).map_err(|e| {
                    engine_error!("quad::vulkan", "Failed to create render-finished semaphore: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                })?;
                sync.render_finished.push(render_finished);

                let fence = device.create_fence(&fence_info, None).map_err(|e| {
                    engine_error!("quad::vulkan", "Failed to create in-flight fence: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
                })?;
                sync.in_flight.push(fence);
            }
        }

        engine_debug!("quad::vulkan", "Created {} frame slots", frames_in_flight);
        Ok(sync)
    }
}

impl FrameSync for VulkanFrameSync {
    type Semaphore = vk::Semaphore;
    type Fence = vk::Fence;

    fn frames_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn wait(&self, frame: usize) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .wait_for_fences(&[self.in_flight[frame]], true, u64::MAX)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to wait for fence of slot {}: {:?}", frame, e))
        }
    }

    fn reset(&self, frame: usize) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .reset_fences(&[self.in_flight[frame]])
                .map_err(|e| engine_err!("quad::vulkan", "Failed to reset fence of slot {}: {:?}", frame, e))
        }
    }

    fn image_available(&self, frame: usize) -> vk::Semaphore {
        self.image_available[frame]
    }

    fn render_finished(&self, frame: usize) -> vk::Semaphore {
        self.render_finished[frame]
    }

    fn in_flight_fence(&self, frame: usize) -> vk::Fence {
        self.in_flight[frame]
    }
}

impl Drop for VulkanFrameSync {
    fn drop(&mut self) {
        unsafe {
            let device = &self.ctx.device;
            device.device_wait_idle().ok();

            for &semaphore in self.image_available.iter().chain(&self.render_finished) {
                device.destroy_semaphore(semaphore, None);
            }
            for &fence in &self.in_flight {
                device.destroy_fence(fence, None);
            }
        }
    }
}
