/// Renderer assembly - builds the Vulkan collaborators and hands them to a frame loop

use quad_engine::quad::frame::{Extent2D, FrameLoop, ResizeFlag};
use quad_engine::quad::{Config, Result};
use quad_engine::engine_info;
use std::sync::Arc;
use winit::window::Window;

use crate::vulkan_command_recorder::VulkanCommandRecorder;
use crate::vulkan_context::VulkanContext;
use crate::vulkan_frame_sync::VulkanFrameSync;
use crate::vulkan_swapchain::VulkanSwapchain;

/// Frame loop driving the Vulkan backend
pub type VulkanFrameLoop = FrameLoop<VulkanFrameSync, VulkanSwapchain, VulkanCommandRecorder>;

/// Create every Vulkan object for `window` and record the first generation
///
/// Setup order: context, frame slots, swapchain, recorder. Each collaborator
/// holds the context, so it is destroyed after the last of them when the
/// returned loop is dropped.
///
/// # Errors
///
/// Any setup failure (invalid config, missing capability, missing shader
/// file, creation failure) is returned before a frame is drawn.
pub fn create_frame_loop(window: &Window, config: &Config, resize: ResizeFlag) -> Result<VulkanFrameLoop> {
    config.validate()?;

    let ctx = VulkanContext::new(window, config)?;
    let sync = VulkanFrameSync::new(Arc::clone(&ctx), config.frames_in_flight)?;
    let swapchain = VulkanSwapchain::new(Arc::clone(&ctx), Extent2D::from(window.inner_size()))?;
    let recorder = VulkanCommandRecorder::new(Arc::clone(&ctx), config)?;

    engine_info!(
        "quad::vulkan",
        "Vulkan backend ready ({:?}, {} frames in flight)",
        config.payload,
        config.frames_in_flight
    );

    FrameLoop::new(config, sync, swapchain, recorder, resize)
}
