/// Shader - SPIR-V modules loaded from precompiled blobs

use ash::vk;
use quad_engine::quad::{Error, Payload, Result};
use quad_engine::{engine_debug, engine_error};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;

/// First word of every SPIR-V module
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Decode a SPIR-V blob into words
///
/// Rejects empty blobs, sizes that are not a multiple of 4 and a wrong magic
/// number. Byte-swapped modules are accepted and converted.
pub fn parse_spirv(name: &str, bytes: &[u8]) -> Result<Vec<u32>> {
    let words = ash::util::read_spv(&mut std::io::Cursor::new(bytes)).map_err(|e| {
        Error::InvalidResource(format!("Shader '{}' is not valid SPIR-V: {}", name, e))
    })?;

    match words.first() {
        Some(&SPIRV_MAGIC) => Ok(words),
        Some(&magic) => Err(Error::InvalidResource(format!(
            "Shader '{}' has bad SPIR-V magic 0x{:08x}",
            name, magic
        ))),
        None => Err(Error::InvalidResource(format!("Shader '{}' is empty", name))),
    }
}

/// Paths of the vertex and fragment blobs for `payload` under `dir`
pub fn shader_paths(dir: &Path, payload: Payload) -> (PathBuf, PathBuf) {
    let stem = payload.shader_stem();
    (
        dir.join(format!("{}.vert.spv", stem)),
        dir.join(format!("{}.frag.spv", stem)),
    )
}

/// Vulkan shader module
pub struct VulkanShader {
    ctx: Arc<VulkanContext>,
    module: vk::ShaderModule,
    stage: vk::ShaderStageFlags,
}

impl VulkanShader {
    /// Read and create a shader module from a `.spv` file
    ///
    /// # Errors
    ///
    /// `Error::AssetLoadFailed` when the file cannot be read,
    /// `Error::InvalidResource` when it is not SPIR-V.
    pub fn load(ctx: Arc<VulkanContext>, path: &Path, stage: vk::ShaderStageFlags) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            engine_error!("quad::vulkan", "Failed to read shader {}: {}", path.display(), e);
            Error::AssetLoadFailed(format!("{}: {}", path.display(), e))
        })?;

        let code = parse_spirv(&path.display().to_string(), &bytes)?;
        let create_info = vk::ShaderModuleCreateInfo::default().code(&code);

        let module = unsafe { ctx.device.create_shader_module(&create_info, None) }.map_err(|e| {
            engine_error!("quad::vulkan", "Failed to create shader module {}: {:?}", path.display(), e);
            Error::InitializationFailed(format!("Failed to create shader module: {:?}", e))
        })?;

        engine_debug!("quad::vulkan", "Loaded shader {} ({} words)", path.display(), code.len());
        Ok(Self { ctx, module, stage })
    }

    pub fn module(&self) -> vk::ShaderModule {
        self.module
    }

    pub fn stage(&self) -> vk::ShaderStageFlags {
        self.stage
    }
}

impl Drop for VulkanShader {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_shader_module(self.module, None);
        }
    }
}

/// Vertex and fragment modules of one payload
///
/// Kept alive for the whole run so pipelines can be rebuilt on every
/// swapchain generation without touching the file system.
pub struct ShaderPair {
    pub vertex: VulkanShader,
    pub fragment: VulkanShader,
}

impl ShaderPair {
    pub fn load(ctx: Arc<VulkanContext>, dir: &Path, payload: Payload) -> Result<Self> {
        let (vertex_path, fragment_path) = shader_paths(dir, payload);
        Ok(Self {
            vertex: VulkanShader::load(Arc::clone(&ctx), &vertex_path, vk::ShaderStageFlags::VERTEX)?,
            fragment: VulkanShader::load(ctx, &fragment_path, vk::ShaderStageFlags::FRAGMENT)?,
        })
    }
}

#[cfg(test)]
#[path = "vulkan_shader_tests.rs"]
mod tests;
