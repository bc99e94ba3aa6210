/// Command recorder - one pre-recorded command buffer per presentable image
///
/// Persistent resources (mesh buffers, texture, set layout, shader modules)
/// live for the whole run. Everything that depends on the swapchain
/// (pipeline, uniform buffers, descriptor sets, command buffers) is a
/// generation, built by `record_all` and released before every recreation.

use ash::vk;
use gpu_allocator::MemoryLocation;
use quad_engine::quad::frame::{CommandRecorder, Extent2D, Swapchain};
use quad_engine::quad::payload::{
    Checkerboard, UniformBufferObject, QUAD_INDICES, QUAD_VERTICES, TRIANGLE_VERTEX_COUNT,
};
use quad_engine::quad::{Config, Payload, Result};
use quad_engine::{engine_bail, engine_debug, engine_err};
use std::sync::Arc;
use std::time::Duration;

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_context::VulkanContext;
use crate::vulkan_descriptor_set::{VulkanDescriptorSetLayout, VulkanDescriptors};
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_shader::ShaderPair;
use crate::vulkan_swapchain::VulkanSwapchain;
use crate::vulkan_texture::VulkanTexture;

/// Resources of the textured quad, uploaded once at startup
struct QuadResources {
    vertex_buffer: VulkanBuffer,
    index_buffer: VulkanBuffer,
    texture: VulkanTexture,
    set_layout: VulkanDescriptorSetLayout,
}

impl QuadResources {
    fn upload(ctx: &Arc<VulkanContext>) -> Result<Self> {
        let vertex_buffer = VulkanBuffer::device_local_with_data(
            Arc::clone(ctx),
            "quad vertices",
            vk::BufferUsageFlags::VERTEX_BUFFER,
            bytemuck::cast_slice(&QUAD_VERTICES),
        )?;
        let index_buffer = VulkanBuffer::device_local_with_data(
            Arc::clone(ctx),
            "quad indices",
            vk::BufferUsageFlags::INDEX_BUFFER,
            bytemuck::cast_slice(&QUAD_INDICES),
        )?;
        let texture = VulkanTexture::from_checkerboard(Arc::clone(ctx), &Checkerboard::default())?;
        let set_layout = VulkanDescriptorSetLayout::new(Arc::clone(ctx))?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            texture,
            set_layout,
        })
    }
}

/// Generation-scoped objects, declared in teardown order
struct Generation {
    ctx: Arc<VulkanContext>,
    command_buffers: Vec<vk::CommandBuffer>,
    descriptors: Option<VulkanDescriptors>,
    uniform_buffers: Vec<VulkanBuffer>,
    pipeline: VulkanPipeline,
    extent: Extent2D,
}

impl Drop for Generation {
    fn drop(&mut self) {
        if self.command_buffers.is_empty() {
            return;
        }
        if let Ok(pool) = self.ctx.command_pool.lock() {
            unsafe {
                self.ctx.device.free_command_buffers(*pool, &self.command_buffers);
            }
        }
    }
}

/// Vulkan command recorder for the configured payload
///
/// Owns the persistent mesh buffers and texture as well as the per-generation
/// objects. Both drop with the recorder, generation first, so the payload
/// resources are released before the swapchain and frame slots.
pub struct VulkanCommandRecorder {
    generation: Option<Generation>,
    resources: Option<QuadResources>,
    shaders: ShaderPair,
    payload: Payload,
    clear_color: [f32; 4],
    ctx: Arc<VulkanContext>,
}

impl VulkanCommandRecorder {
    /// Load shaders and upload the persistent payload resources
    ///
    /// Nothing is recorded until [`record_all`](CommandRecorder::record_all).
    pub fn new(ctx: Arc<VulkanContext>, config: &Config) -> Result<Self> {
        let shaders = ShaderPair::load(Arc::clone(&ctx), &config.shader_dir, config.payload)?;
        let resources = if config.payload.binds_resources() {
            Some(QuadResources::upload(&ctx)?)
        } else {
            None
        };

        Ok(Self {
            generation: None,
            resources,
            shaders,
            payload: config.payload,
            clear_color: config.clear_color,
            ctx,
        })
    }

    pub fn payload(&self) -> Payload {
        self.payload
    }

    /// Number of recorded command buffers (0 between release and record_all)
    pub fn recorded_count(&self) -> usize {
        self.generation
            .as_ref()
            .map_or(0, |generation| generation.command_buffers.len())
    }

    fn build_generation(&self, swapchain: &VulkanSwapchain) -> Result<Generation> {
        let ctx = &self.ctx;
        let image_count = swapchain.image_count();
        let vk_extent = swapchain.vk_extent();

        let pipeline = VulkanPipeline::new(
            Arc::clone(ctx),
            swapchain.render_pass(),
            vk_extent,
            &self.shaders,
            self.payload,
            self.resources.as_ref().map(|resources| resources.set_layout.handle()),
        )?;

        let mut generation = Generation {
            ctx: Arc::clone(ctx),
            command_buffers: Vec::new(),
            descriptors: None,
            uniform_buffers: Vec::new(),
            pipeline,
            extent: swapchain.extent(),
        };

        if let Some(resources) = &self.resources {
            for _ in 0..image_count {
                generation.uniform_buffers.push(VulkanBuffer::new(
                    Arc::clone(ctx),
                    "uniform buffer",
                    UniformBufferObject::SIZE,
                    vk::BufferUsageFlags::UNIFORM_BUFFER,
                    MemoryLocation::CpuToGpu,
                )?);
            }
            generation.descriptors = Some(VulkanDescriptors::new(
                Arc::clone(ctx),
                &resources.set_layout,
                &generation.uniform_buffers,
                &resources.texture,
            )?);
        }

        let pool = ctx
            .command_pool
            .lock()
            .map_err(|_| engine_err!("quad::vulkan", "Command pool lock poisoned"))?;

        // The pool lock is released before `generation` can drop on error
        let recorded = unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(image_count as u32);

            ctx.device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to allocate {} command buffers: {:?}", image_count, e))
                .and_then(|command_buffers| {
                    generation.command_buffers = command_buffers;
                    generation
                        .command_buffers
                        .iter()
                        .enumerate()
                        .try_for_each(|(image_index, &command_buffer)| {
                            self.record(&generation, swapchain, image_index, command_buffer)
                        })
                })
        };
        drop(pool);
        recorded?;

        Ok(generation)
    }

    /// Record the draw of `image_index` into `command_buffer`
    ///
    /// Recorded with SIMULTANEOUS_USE: the same buffer is resubmitted every
    /// time its image comes back, possibly while a previous submission is pending.
    unsafe fn record(
        &self,
        generation: &Generation,
        swapchain: &VulkanSwapchain,
        image_index: usize,
        command_buffer: vk::CommandBuffer,
    ) -> Result<()> {
        let device = &self.ctx.device;

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::SIMULTANEOUS_USE);
        device
            .begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| engine_err!("quad::vulkan", "Failed to begin command buffer {}: {:?}", image_index, e))?;

        let clear_values = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: self.clear_color,
            },
        }];
        let render_pass_begin = vk::RenderPassBeginInfo::default()
            .render_pass(swapchain.render_pass())
            .framebuffer(swapchain.framebuffer(image_index))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: swapchain.vk_extent(),
            })
            .clear_values(&clear_values);

        device.cmd_begin_render_pass(command_buffer, &render_pass_begin, vk::SubpassContents::INLINE);
        device.cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, generation.pipeline.handle());

        match (&self.resources, &generation.descriptors) {
            (Some(resources), Some(descriptors)) => {
                device.cmd_bind_vertex_buffers(command_buffer, 0, &[resources.vertex_buffer.handle()], &[0]);
                device.cmd_bind_index_buffer(
                    command_buffer,
                    resources.index_buffer.handle(),
                    0,
                    vk::IndexType::UINT16,
                );
                device.cmd_bind_descriptor_sets(
                    command_buffer,
                    vk::PipelineBindPoint::GRAPHICS,
                    generation.pipeline.layout(),
                    0,
                    &[descriptors.set(image_index)],
                    &[],
                );
                device.cmd_draw_indexed(command_buffer, QUAD_INDICES.len() as u32, 1, 0, 0, 0);
            }
            _ => {
                device.cmd_draw(command_buffer, TRIANGLE_VERTEX_COUNT, 1, 0, 0);
            }
        }

        device.cmd_end_render_pass(command_buffer);
        device
            .end_command_buffer(command_buffer)
            .map_err(|e| engine_err!("quad::vulkan", "Failed to end command buffer {}: {:?}", image_index, e))
    }
}

impl CommandRecorder<VulkanSwapchain> for VulkanCommandRecorder {
    type Fence = vk::Fence;

    fn record_all(&mut self, swapchain: &VulkanSwapchain) -> Result<()> {
        self.generation = None;
        let generation = self.build_generation(swapchain)?;
        engine_debug!(
            "quad::vulkan",
            "Recorded {} command buffers ({:?}, {}x{})",
            generation.command_buffers.len(),
            self.payload,
            generation.extent.width,
            generation.extent.height
        );
        self.generation = Some(generation);
        Ok(())
    }

    fn release(&mut self) {
        self.generation = None;
    }

    fn prepare(&mut self, image_index: u32, elapsed: Duration) -> Result<()> {
        let Some(generation) = &self.generation else {
            engine_bail!("quad::vulkan", "prepare called with nothing recorded");
        };
        if generation.uniform_buffers.is_empty() {
            return Ok(());
        }

        let Some(uniform_buffer) = generation.uniform_buffers.get(image_index as usize) else {
            engine_bail!(
                "quad::vulkan",
                "prepare: image index {} out of range (count: {})",
                image_index,
                generation.uniform_buffers.len()
            );
        };

        let ubo = UniformBufferObject::at_time(elapsed.as_secs_f32(), generation.extent);
        uniform_buffer.update(0, ubo.as_bytes())
    }

    fn submit(
        &mut self,
        image_index: u32,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> Result<()> {
        let Some(generation) = &self.generation else {
            engine_bail!("quad::vulkan", "submit called with nothing recorded");
        };
        let Some(&command_buffer) = generation.command_buffers.get(image_index as usize) else {
            engine_bail!(
                "quad::vulkan",
                "submit: image index {} out of range (count: {})",
                image_index,
                generation.command_buffers.len()
            );
        };

        let wait_semaphores = [wait];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [command_buffer];
        let signal_semaphores = [signal];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.ctx
                .device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], fence)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to submit command buffer {}: {:?}", image_index, e))
        }
    }

    fn wait_idle(&self) -> Result<()> {
        self.ctx.wait_idle()
    }
}
