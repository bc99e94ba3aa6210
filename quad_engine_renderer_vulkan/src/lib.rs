/*!
# Quad Engine - Vulkan Renderer Backend

Vulkan implementation of the `quad_engine` frame protocol, built on `ash`
for the API bindings and `gpu-allocator` for memory management.

[`create_frame_loop`] assembles the backend for a window:

- [`VulkanContext`]: instance, surface, device, queues, allocator, command pool
- [`VulkanFrameSync`]: per-slot fences and semaphores
- [`VulkanSwapchain`]: presentable images, views, render pass, framebuffers
- [`VulkanCommandRecorder`]: pipeline, payload resources, per-image command buffers

With the `vulkan-validation` feature, the Khronos validation layer can be
enabled at runtime and its messages are reported through a colored messenger.
*/

mod vulkan_context;
mod vulkan_frame_sync;
mod vulkan_swapchain;
mod vulkan_render_pass;
mod vulkan_shader;
mod vulkan_pipeline;
mod vulkan_buffer;
mod vulkan_texture;
mod vulkan_descriptor_set;
mod vulkan_command_recorder;
mod vulkan_renderer;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan_context::{QueueFamilyIndices, VulkanContext};
pub use vulkan_frame_sync::VulkanFrameSync;
pub use vulkan_swapchain::{
    choose_extent, choose_image_count, choose_present_mode, choose_surface_format, VulkanSwapchain,
};
pub use vulkan_shader::{parse_spirv, shader_paths, ShaderPair, VulkanShader};
pub use vulkan_pipeline::VulkanPipeline;
pub use vulkan_buffer::VulkanBuffer;
pub use vulkan_texture::{VulkanTexture, TEXTURE_FORMAT};
pub use vulkan_descriptor_set::{VulkanDescriptorSetLayout, VulkanDescriptors};
pub use vulkan_command_recorder::VulkanCommandRecorder;
pub use vulkan_renderer::{create_frame_loop, VulkanFrameLoop};

// Re-export debug utilities
#[cfg(feature = "vulkan-validation")]
pub use debug::{get_validation_stats, print_validation_stats_report};
