/// Swapchain - presentable images, their views, the render pass and framebuffers
///
/// Everything here belongs to one generation and is rebuilt by `recreate`.

use ash::prelude::VkResult;
use ash::vk;
use quad_engine::quad::frame::{Extent2D, SurfaceStatus, Swapchain};
use quad_engine::quad::{Error, Result};
use quad_engine::{engine_debug, engine_err, engine_error, engine_info};
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_render_pass::create_render_pass;

/// Pick the surface format: B8G8R8A8_UNORM / sRGB non-linear when offered,
/// otherwise the first format reported
///
/// A single UNDEFINED entry means the surface has no preference.
pub fn choose_surface_format(available: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    let preferred = vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };

    match available {
        [] => None,
        [only] if only.format == vk::Format::UNDEFINED => Some(preferred),
        _ => available
            .iter()
            .find(|f| f.format == preferred.format && f.color_space == preferred.color_space)
            .or(available.first())
            .copied(),
    }
}

/// Pick the present mode: MAILBOX, else IMMEDIATE, else FIFO (always supported)
pub fn choose_present_mode(available: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if available.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else if available.contains(&vk::PresentModeKHR::IMMEDIATE) {
        vk::PresentModeKHR::IMMEDIATE
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Use the surface's current extent when defined, otherwise clamp the
/// window framebuffer size into the supported range
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window: Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: window.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One more image than the minimum, capped by the maximum (0 = no maximum)
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let image_count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        image_count.min(capabilities.max_image_count)
    } else {
        image_count
    }
}

/// Map the raw acquire result to an image index and surface status
pub(crate) fn acquire_status(result: VkResult<(u32, bool)>) -> Result<(u32, SurfaceStatus)> {
    match result {
        Ok((image_index, false)) => Ok((image_index, SurfaceStatus::Optimal)),
        Ok((image_index, true)) => Ok((image_index, SurfaceStatus::Suboptimal)),
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok((0, SurfaceStatus::OutOfDate)),
        Err(e) => Err(engine_err!("quad::vulkan", "Failed to acquire swapchain image: {:?}", e)),
    }
}

/// Map the raw present result to a surface status
pub(crate) fn present_status(result: VkResult<bool>) -> Result<SurfaceStatus> {
    match result {
        Ok(false) => Ok(SurfaceStatus::Optimal),
        Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(SurfaceStatus::Suboptimal),
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(SurfaceStatus::OutOfDate),
        Err(e) => Err(engine_err!("quad::vulkan", "Failed to present swapchain image: {:?}", e)),
    }
}

/// Vulkan swapchain manager
///
/// Owns the M presentable images of the current generation with one view and
/// one framebuffer each, all built against a render pass in the swapchain format.
pub struct VulkanSwapchain {
    ctx: Arc<VulkanContext>,
    loader: ash::khr::swapchain::Device,

    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,

    format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,
}

impl VulkanSwapchain {
    /// Create the first generation for a window framebuffer of `window_extent`
    pub fn new(ctx: Arc<VulkanContext>, window_extent: Extent2D) -> Result<Self> {
        let loader = ash::khr::swapchain::Device::new(&ctx.instance, &ctx.device);
        let mut swapchain = Self {
            ctx,
            loader,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            image_views: Vec::new(),
            render_pass: vk::RenderPass::null(),
            framebuffers: Vec::new(),
            format: vk::SurfaceFormatKHR::default(),
            present_mode: vk::PresentModeKHR::FIFO,
            extent: vk::Extent2D::default(),
        };
        swapchain.build(window_extent)?;
        Ok(swapchain)
    }

    /// Render pass of the current generation
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    /// Framebuffer of presentable image `image_index`
    pub fn framebuffer(&self, image_index: usize) -> vk::Framebuffer {
        self.framebuffers[image_index]
    }

    pub fn vk_extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn surface_format(&self) -> vk::SurfaceFormatKHR {
        self.format
    }

    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    /// Negotiate and create the swapchain, replacing the current handle if any
    fn build(&mut self, window_extent: Extent2D) -> Result<()> {
        let ctx = Arc::clone(&self.ctx);
        unsafe {
            let capabilities = ctx
                .surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, ctx.surface)
                .map_err(|e| {
                    engine_error!("quad::vulkan", "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })?;
            let formats = ctx
                .surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, ctx.surface)
                .map_err(|e| {
                    engine_error!("quad::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;
            let present_modes = ctx
                .surface_loader
                .get_physical_device_surface_present_modes(ctx.physical_device, ctx.surface)
                .map_err(|e| {
                    engine_error!("quad::vulkan", "Failed to query present modes: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get present modes: {:?}", e))
                })?;

            let format = choose_surface_format(&formats).ok_or_else(|| {
                engine_error!("quad::vulkan", "Surface reports no formats");
                Error::InitializationFailed("Surface reports no formats".to_string())
            })?;
            let present_mode = choose_present_mode(&present_modes);
            let extent = choose_extent(&capabilities, window_extent);
            let image_count = choose_image_count(&capabilities);

            let queue_family_indices = [ctx.graphics_queue_family, ctx.present_queue_family];
            let old_swapchain = self.swapchain;
            let mut create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(ctx.surface)
                .min_image_count(image_count)
                .image_format(format.format)
                .image_color_space(format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            create_info = if ctx.graphics_queue_family != ctx.present_queue_family {
                create_info
                    .image_sharing_mode(vk::SharingMode::CONCURRENT)
                    .queue_family_indices(&queue_family_indices)
            } else {
                create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            };

            let swapchain = self.loader.create_swapchain(&create_info, None).map_err(|e| {
                engine_error!("quad::vulkan", "Failed to create swapchain: {:?}", e);
                Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
            })?;

            if old_swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;
            self.format = format;
            self.present_mode = present_mode;
            self.extent = extent;

            self.images = self.loader.get_swapchain_images(swapchain).map_err(|e| {
                engine_error!("quad::vulkan", "Failed to get swapchain images: {:?}", e);
                Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
            })?;

            for &image in &self.images {
                let create_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(format.format)
                    .components(vk::ComponentMapping::default())
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });

                let image_view = ctx.device.create_image_view(&create_info, None).map_err(|e| {
                    engine_error!("quad::vulkan", "Failed to create swapchain image view: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create image view: {:?}", e))
                })?;
                self.image_views.push(image_view);
            }

            self.render_pass = create_render_pass(&ctx.device, format.format)?;

            for &image_view in &self.image_views {
                let attachments = [image_view];
                let create_info = vk::FramebufferCreateInfo::default()
                    .render_pass(self.render_pass)
                    .attachments(&attachments)
                    .width(extent.width)
                    .height(extent.height)
                    .layers(1);

                let framebuffer = ctx.device.create_framebuffer(&create_info, None).map_err(|e| {
                    engine_error!("quad::vulkan", "Failed to create framebuffer: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create framebuffer: {:?}", e))
                })?;
                self.framebuffers.push(framebuffer);
            }

            engine_debug!(
                "quad::vulkan",
                "Swapchain: {} images, {:?} {:?}, {:?}",
                self.images.len(),
                format.format,
                format.color_space,
                present_mode
            );
        }
        Ok(())
    }

    /// Destroy framebuffers, render pass and views (the swapchain handle is
    /// kept so the next build can pass it as the old swapchain)
    fn destroy_generation(&mut self) {
        unsafe {
            let device = &self.ctx.device;
            for framebuffer in self.framebuffers.drain(..) {
                device.destroy_framebuffer(framebuffer, None);
            }
            if self.render_pass != vk::RenderPass::null() {
                device.destroy_render_pass(self.render_pass, None);
                self.render_pass = vk::RenderPass::null();
            }
            for image_view in self.image_views.drain(..) {
                device.destroy_image_view(image_view, None);
            }
        }
        self.images.clear();
    }
}

impl Swapchain for VulkanSwapchain {
    type Semaphore = vk::Semaphore;

    fn acquire_next_image(&mut self, signal: vk::Semaphore) -> Result<(u32, SurfaceStatus)> {
        let result = unsafe {
            self.loader
                .acquire_next_image(self.swapchain, u64::MAX, signal, vk::Fence::null())
        };
        acquire_status(result)
    }

    fn present(&mut self, image_index: u32, wait: vk::Semaphore) -> Result<SurfaceStatus> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [wait];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe { self.loader.queue_present(self.ctx.present_queue, &present_info) };
        present_status(result)
    }

    fn recreate(&mut self, extent: Extent2D) -> Result<()> {
        let old_count = self.images.len();
        self.destroy_generation();
        self.build(extent)?;
        engine_info!(
            "quad::vulkan",
            "Swapchain recreated: {} -> {} images, {}x{}",
            old_count,
            self.images.len(),
            self.extent.width,
            self.extent.height
        );
        Ok(())
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn extent(&self) -> Extent2D {
        Extent2D::new(self.extent.width, self.extent.height)
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();
        }
        self.destroy_generation();
        unsafe {
            self.loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
