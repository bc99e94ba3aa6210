/// Pipeline - graphics pipeline and layout for one swapchain generation
///
/// Viewport and scissor are baked in from the swapchain extent, so the
/// pipeline is rebuilt on every recreation.

use ash::vk;
use quad_engine::quad::payload::{AttributeFormat, Vertex};
use quad_engine::quad::{Error, Payload, Result};
use quad_engine::engine_error;
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_shader::ShaderPair;

/// Convert a vertex attribute format to its Vulkan format
pub(crate) fn attribute_format_to_vk(format: AttributeFormat) -> vk::Format {
    match format {
        AttributeFormat::Float2 => vk::Format::R32G32_SFLOAT,
        AttributeFormat::Float3 => vk::Format::R32G32B32_SFLOAT,
    }
}

/// Vertex bindings and attributes fed to the pipeline for `payload`
///
/// The triangle has no vertex input: its vertices are generated in the shader.
pub(crate) fn vertex_input_descriptions(
    payload: Payload,
) -> (Vec<vk::VertexInputBindingDescription>, Vec<vk::VertexInputAttributeDescription>) {
    if !payload.binds_resources() {
        return (Vec::new(), Vec::new());
    }

    let bindings = vec![vk::VertexInputBindingDescription::default()
        .binding(Vertex::BINDING)
        .stride(Vertex::STRIDE)
        .input_rate(vk::VertexInputRate::VERTEX)];

    let attributes = Vertex::attributes()
        .iter()
        .map(|attribute| {
            vk::VertexInputAttributeDescription::default()
                .binding(Vertex::BINDING)
                .location(attribute.location)
                .format(attribute_format_to_vk(attribute.format))
                .offset(attribute.offset)
        })
        .collect();

    (bindings, attributes)
}

/// Graphics pipeline with its layout
pub struct VulkanPipeline {
    ctx: Arc<VulkanContext>,
    layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
}

impl VulkanPipeline {
    /// Build the pipeline for one generation
    ///
    /// # Arguments
    ///
    /// * `render_pass` - Render pass of the current swapchain generation
    /// * `extent` - Swapchain extent used for viewport and scissor
    /// * `shaders` - Vertex and fragment modules of `payload`
    /// * `set_layout` - Descriptor set layout, `None` for payloads without descriptors
    pub fn new(
        ctx: Arc<VulkanContext>,
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
        shaders: &ShaderPair,
        payload: Payload,
        set_layout: Option<vk::DescriptorSetLayout>,
    ) -> Result<Self> {
        unsafe {
            let set_layouts: Vec<vk::DescriptorSetLayout> = set_layout.into_iter().collect();
            let layout_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);

            let layout = ctx.device.create_pipeline_layout(&layout_info, None).map_err(|e| {
                engine_error!("quad::vulkan", "Failed to create pipeline layout: {:?}", e);
                Error::InitializationFailed(format!("Failed to create pipeline layout: {:?}", e))
            })?;

            let mut result = Self {
                ctx: Arc::clone(&ctx),
                layout,
                pipeline: vk::Pipeline::null(),
            };

            let stages = [
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(shaders.vertex.stage())
                    .module(shaders.vertex.module())
                    .name(c"main"),
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(shaders.fragment.stage())
                    .module(shaders.fragment.module())
                    .name(c"main"),
            ];

            let (bindings, attributes) = vertex_input_descriptions(payload);
            let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&bindings)
                .vertex_attribute_descriptions(&attributes);

            let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
                .primitive_restart_enable(false);

            let viewports = [vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            }];
            let scissors = [vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            }];
            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewports(&viewports)
                .scissors(&scissors);

            let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
                .depth_clamp_enable(false)
                .rasterizer_discard_enable(false)
                .polygon_mode(vk::PolygonMode::FILL)
                .line_width(1.0)
                .cull_mode(vk::CullModeFlags::BACK)
                .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
                .depth_bias_enable(false);

            let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
                .sample_shading_enable(false)
                .rasterization_samples(vk::SampleCountFlags::TYPE_1);

            let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA)
                .blend_enable(false)];
            let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
                .logic_op_enable(false)
                .attachments(&color_blend_attachments);

            let create_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&stages)
                .vertex_input_state(&vertex_input)
                .input_assembly_state(&input_assembly)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization_state)
                .multisample_state(&multisample_state)
                .color_blend_state(&color_blend_state)
                .layout(layout)
                .render_pass(render_pass)
                .subpass(0);

            let pipelines = ctx
                .device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None)
                .map_err(|(_, e)| {
                    engine_error!("quad::vulkan", "Failed to create graphics pipeline: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create graphics pipeline: {:?}", e))
                })?;
            result.pipeline = pipelines[0];

            Ok(result)
        }
    }

    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    pub fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }
}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline(self.pipeline, None);
            self.ctx.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_pipeline_tests.rs"]
mod tests;
