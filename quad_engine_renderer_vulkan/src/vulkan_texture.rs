/// Texture - sampled RGBA8 image, its view and sampler

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use gpu_allocator::MemoryLocation;
use quad_engine::quad::payload::Checkerboard;
use quad_engine::quad::{Error, Result};
use quad_engine::{engine_debug, engine_err};
use std::sync::Arc;

use crate::vulkan_buffer::{allocate, free, VulkanBuffer};
use crate::vulkan_context::VulkanContext;

/// Format of every sampled texture
pub const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;

/// Access masks and stages for a supported image layout transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LayoutTransition {
    pub src_access: vk::AccessFlags,
    pub dst_access: vk::AccessFlags,
    pub src_stage: vk::PipelineStageFlags,
    pub dst_stage: vk::PipelineStageFlags,
}

/// Barrier parameters for `old -> new`, or `None` if the transition is not used
pub(crate) fn layout_transition(old: vk::ImageLayout, new: vk::ImageLayout) -> Option<LayoutTransition> {
    match (old, new) {
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => Some(LayoutTransition {
            src_access: vk::AccessFlags::empty(),
            dst_access: vk::AccessFlags::TRANSFER_WRITE,
            src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
            dst_stage: vk::PipelineStageFlags::TRANSFER,
        }),
        (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) => {
            Some(LayoutTransition {
                src_access: vk::AccessFlags::TRANSFER_WRITE,
                dst_access: vk::AccessFlags::SHADER_READ,
                src_stage: vk::PipelineStageFlags::TRANSFER,
                dst_stage: vk::PipelineStageFlags::FRAGMENT_SHADER,
            })
        }
        _ => None,
    }
}

/// Sampler settings: linear filtering, REPEAT addressing, anisotropy at
/// `max_anisotropy`, opaque black border, single mip level
pub(crate) fn sampler_create_info(max_anisotropy: f32) -> vk::SamplerCreateInfo<'static> {
    vk::SamplerCreateInfo::default()
        .mag_filter(vk::Filter::LINEAR)
        .min_filter(vk::Filter::LINEAR)
        .address_mode_u(vk::SamplerAddressMode::REPEAT)
        .address_mode_v(vk::SamplerAddressMode::REPEAT)
        .address_mode_w(vk::SamplerAddressMode::REPEAT)
        .anisotropy_enable(true)
        .max_anisotropy(max_anisotropy)
        .border_color(vk::BorderColor::FLOAT_OPAQUE_BLACK)
        .unnormalized_coordinates(false)
        .compare_enable(false)
        .compare_op(vk::CompareOp::ALWAYS)
        .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
        .mip_lod_bias(0.0)
        .min_lod(0.0)
        .max_lod(0.0)
}

const COLOR_RANGE: vk::ImageSubresourceRange = vk::ImageSubresourceRange {
    aspect_mask: vk::ImageAspectFlags::COLOR,
    base_mip_level: 0,
    level_count: 1,
    base_array_layer: 0,
    layer_count: 1,
};

fn record_transition(
    device: &ash::Device,
    command_buffer: vk::CommandBuffer,
    image: vk::Image,
    transition: LayoutTransition,
    old: vk::ImageLayout,
    new: vk::ImageLayout,
) {
    let barrier = vk::ImageMemoryBarrier::default()
        .old_layout(old)
        .new_layout(new)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(COLOR_RANGE)
        .src_access_mask(transition.src_access)
        .dst_access_mask(transition.dst_access);

    unsafe {
        device.cmd_pipeline_barrier(
            command_buffer,
            transition.src_stage,
            transition.dst_stage,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier],
        );
    }
}

/// Device-local sampled texture
pub struct VulkanTexture {
    ctx: Arc<VulkanContext>,
    image: vk::Image,
    allocation: Option<Allocation>,
    view: vk::ImageView,
    sampler: vk::Sampler,
    width: u32,
    height: u32,
}

impl VulkanTexture {
    /// Upload a procedural checkerboard
    pub fn from_checkerboard(ctx: Arc<VulkanContext>, checkerboard: &Checkerboard) -> Result<Self> {
        Self::from_rgba8(ctx, checkerboard.width, checkerboard.height, &checkerboard.pixels())
    }

    /// Upload `pixels` (tightly packed RGBA8, row-major) into a new texture
    ///
    /// The image goes UNDEFINED -> TRANSFER_DST_OPTIMAL, receives the staging
    /// copy, then goes to SHADER_READ_ONLY_OPTIMAL, all in one blocking
    /// one-time submission.
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if `pixels` does not hold `width * height * 4` bytes.
    pub fn from_rgba8(ctx: Arc<VulkanContext>, width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(Error::InvalidResource(format!(
                "Texture data is {} bytes, expected {} for {}x{} RGBA8",
                pixels.len(),
                expected,
                width,
                height
            )));
        }

        let staging = VulkanBuffer::new(
            Arc::clone(&ctx),
            "texture staging",
            pixels.len() as u64,
            vk::BufferUsageFlags::TRANSFER_SRC,
            MemoryLocation::CpuToGpu,
        )?;
        staging.update(0, pixels)?;

        let mut texture = Self {
            ctx: Arc::clone(&ctx),
            image: vk::Image::null(),
            allocation: None,
            view: vk::ImageView::null(),
            sampler: vk::Sampler::null(),
            width,
            height,
        };

        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(TEXTURE_FORMAT)
                .extent(vk::Extent3D { width, height, depth: 1 })
                .mip_levels(1)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            texture.image = ctx
                .device
                .create_image(&image_create_info, None)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to create texture image: {:?}", e))?;

            let requirements = ctx.device.get_image_memory_requirements(texture.image);
            let allocation = allocate(&ctx, "texture", requirements, MemoryLocation::GpuOnly, false)?;
            ctx.device
                .bind_image_memory(texture.image, allocation.memory(), allocation.offset())
                .map_err(|e| engine_err!("quad::vulkan", "Failed to bind texture image memory: {:?}", e))?;
            texture.allocation = Some(allocation);

            let image = texture.image;
            let to_transfer = (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
            let to_shader = (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
            let (Some(first), Some(second)) = (
                layout_transition(to_transfer.0, to_transfer.1),
                layout_transition(to_shader.0, to_shader.1),
            ) else {
                return Err(Error::InvalidResource("Unsupported layout transition".to_string()));
            };

            ctx.submit_one_time(|device, command_buffer| {
                record_transition(device, command_buffer, image, first, to_transfer.0, to_transfer.1);

                let region = vk::BufferImageCopy::default()
                    .buffer_offset(0)
                    .buffer_row_length(0)
                    .buffer_image_height(0)
                    .image_subresource(vk::ImageSubresourceLayers {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        mip_level: 0,
                        base_array_layer: 0,
                        layer_count: 1,
                    })
                    .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
                    .image_extent(vk::Extent3D { width, height, depth: 1 });

                device.cmd_copy_buffer_to_image(
                    command_buffer,
                    staging.handle(),
                    image,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    &[region],
                );

                record_transition(device, command_buffer, image, second, to_shader.0, to_shader.1);
            })?;

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(TEXTURE_FORMAT)
                .components(vk::ComponentMapping::default())
                .subresource_range(COLOR_RANGE);

            texture.view = ctx
                .device
                .create_image_view(&view_create_info, None)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to create texture image view: {:?}", e))?;

            texture.sampler = ctx
                .device
                .create_sampler(&sampler_create_info(ctx.max_sampler_anisotropy), None)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to create texture sampler: {:?}", e))?;
        }

        engine_debug!("quad::vulkan", "Uploaded {}x{} texture", width, height);
        Ok(texture)
    }

    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    pub fn sampler(&self) -> vk::Sampler {
        self.sampler
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_sampler(self.sampler, None);
            self.ctx.device.destroy_image_view(self.view, None);
        }
        if let Some(allocation) = self.allocation.take() {
            free(&self.ctx, allocation);
        }
        unsafe {
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_texture_tests.rs"]
mod tests;
