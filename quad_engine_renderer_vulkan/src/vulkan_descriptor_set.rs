/// Descriptors - set layout shared by every generation, pool and sets per generation

use ash::vk;
use quad_engine::quad::payload::UniformBufferObject;
use quad_engine::quad::{Error, Result};
use quad_engine::{engine_bail, engine_err, engine_error};
use std::sync::Arc;

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_context::VulkanContext;
use crate::vulkan_texture::VulkanTexture;

/// Uniform buffer binding (vertex stage)
pub const UNIFORM_BINDING: u32 = 0;
/// Combined image sampler binding (fragment stage)
pub const SAMPLER_BINDING: u32 = 1;

pub(crate) fn set_layout_bindings() -> [vk::DescriptorSetLayoutBinding<'static>; 2] {
    [
        vk::DescriptorSetLayoutBinding::default()
            .binding(UNIFORM_BINDING)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::VERTEX),
        vk::DescriptorSetLayoutBinding::default()
            .binding(SAMPLER_BINDING)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT),
    ]
}

/// Pool sizes for `set_count` sets of the layout above
pub(crate) fn descriptor_pool_sizes(set_count: u32) -> [vk::DescriptorPoolSize; 2] {
    [
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            descriptor_count: set_count,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: set_count,
        },
    ]
}

/// Descriptor set layout of the textured payload
pub struct VulkanDescriptorSetLayout {
    ctx: Arc<VulkanContext>,
    layout: vk::DescriptorSetLayout,
}

impl VulkanDescriptorSetLayout {
    pub fn new(ctx: Arc<VulkanContext>) -> Result<Self> {
        let bindings = set_layout_bindings();
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

        let layout = unsafe { ctx.device.create_descriptor_set_layout(&create_info, None) }.map_err(|e| {
            engine_error!("quad::vulkan", "Failed to create descriptor set layout: {:?}", e);
            Error::InitializationFailed(format!("Failed to create descriptor set layout: {:?}", e))
        })?;

        Ok(Self { ctx, layout })
    }

    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }
}

impl Drop for VulkanDescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

/// Descriptor pool and one set per presentable image
///
/// Set `i` points at uniform buffer `i` and the shared texture. Sets are
/// freed with the pool.
pub struct VulkanDescriptors {
    ctx: Arc<VulkanContext>,
    pool: vk::DescriptorPool,
    sets: Vec<vk::DescriptorSet>,
}

impl VulkanDescriptors {
    pub fn new(
        ctx: Arc<VulkanContext>,
        layout: &VulkanDescriptorSetLayout,
        uniform_buffers: &[VulkanBuffer],
        texture: &VulkanTexture,
    ) -> Result<Self> {
        if uniform_buffers.is_empty() {
            engine_bail!("quad::vulkan", "Descriptor sets need at least one uniform buffer");
        }
        let set_count = uniform_buffers.len() as u32;

        unsafe {
            let pool_sizes = descriptor_pool_sizes(set_count);
            let pool_info = vk::DescriptorPoolCreateInfo::default()
                .pool_sizes(&pool_sizes)
                .max_sets(set_count);

            let pool = ctx
                .device
                .create_descriptor_pool(&pool_info, None)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to create descriptor pool: {:?}", e))?;

            let mut descriptors = Self {
                ctx: Arc::clone(&ctx),
                pool,
                sets: Vec::new(),
            };

            let layouts = vec![layout.handle(); uniform_buffers.len()];
            let allocate_info = vk::DescriptorSetAllocateInfo::default()
                .descriptor_pool(pool)
                .set_layouts(&layouts);

            descriptors.sets = ctx
                .device
                .allocate_descriptor_sets(&allocate_info)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to allocate {} descriptor sets: {:?}", set_count, e))?;

            for (&set, uniform_buffer) in descriptors.sets.iter().zip(uniform_buffers) {
                let buffer_info = [vk::DescriptorBufferInfo::default()
                    .buffer(uniform_buffer.handle())
                    .offset(0)
                    .range(UniformBufferObject::SIZE)];
                let image_info = [vk::DescriptorImageInfo::default()
                    .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                    .image_view(texture.view())
                    .sampler(texture.sampler())];

                let writes = [
                    vk::WriteDescriptorSet::default()
                        .dst_set(set)
                        .dst_binding(UNIFORM_BINDING)
                        .dst_array_element(0)
                        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                        .buffer_info(&buffer_info),
                    vk::WriteDescriptorSet::default()
                        .dst_set(set)
                        .dst_binding(SAMPLER_BINDING)
                        .dst_array_element(0)
                        .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                        .image_info(&image_info),
                ];
                ctx.device.update_descriptor_sets(&writes, &[]);
            }

            Ok(descriptors)
        }
    }

    /// Descriptor set of presentable image `image_index`
    pub fn set(&self, image_index: usize) -> vk::DescriptorSet {
        self.sets[image_index]
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Drop for VulkanDescriptors {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_descriptor_set_tests.rs"]
mod tests;
