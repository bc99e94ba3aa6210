/// Buffer - gpu-allocator backed vertex, index, uniform and staging buffers

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use quad_engine::quad::{Error, Result};
use quad_engine::{engine_bail, engine_err, engine_error};
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;

/// Allocate device memory for `requirements` and return the allocation
///
/// Shared by buffers and images. Any allocator failure is reported as
/// `Error::OutOfMemory`.
pub(crate) fn allocate(
    ctx: &VulkanContext,
    name: &str,
    requirements: vk::MemoryRequirements,
    location: MemoryLocation,
    linear: bool,
) -> Result<Allocation> {
    let mut allocator = ctx
        .allocator
        .lock()
        .map_err(|_| engine_err!("quad::vulkan", "Allocator lock poisoned"))?;

    allocator
        .allocate(&AllocationCreateDesc {
            name,
            requirements,
            location,
            linear,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        })
        .map_err(|e| {
            let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
            engine_error!("quad::vulkan", "Out of GPU memory for {} (required: {:.2} MB): {}", name, size_mb, e);
            Error::OutOfMemory
        })
}

/// Return an allocation to the allocator (lock failure leaks the memory
/// until the allocator itself is dropped)
pub(crate) fn free(ctx: &VulkanContext, allocation: Allocation) {
    if let Ok(mut allocator) = ctx.allocator.lock() {
        allocator.free(allocation).ok();
    }
}

/// Vulkan buffer with its own allocation
pub struct VulkanBuffer {
    ctx: Arc<VulkanContext>,
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: u64,
}

impl VulkanBuffer {
    /// Create a buffer of `size` bytes in `location`
    ///
    /// # Errors
    ///
    /// `Error::OutOfMemory` when allocation fails, `Error::BackendError`
    /// for any other Vulkan failure.
    pub fn new(
        ctx: Arc<VulkanContext>,
        name: &str,
        size: u64,
        usage: vk::BufferUsageFlags,
        location: MemoryLocation,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidResource(format!("Buffer '{}' has zero size", name)));
        }

        unsafe {
            let create_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx
                .device
                .create_buffer(&create_info, None)
                .map_err(|e| engine_err!("quad::vulkan", "Failed to create buffer '{}' of {} bytes: {:?}", name, size, e))?;

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let allocation = match allocate(&ctx, name, requirements, location, true) {
                Ok(allocation) => allocation,
                Err(e) => {
                    ctx.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            // From here on Drop releases both
            let result = Self {
                buffer,
                allocation: Some(allocation),
                size,
                ctx,
            };

            if let Some(allocation) = &result.allocation {
                result
                    .ctx
                    .device
                    .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                    .map_err(|e| engine_err!("quad::vulkan", "Failed to bind buffer memory: {:?}", e))?;
            }

            Ok(result)
        }
    }

    /// Create a device-local buffer filled with `data` through a staging copy
    pub fn device_local_with_data(
        ctx: Arc<VulkanContext>,
        name: &str,
        usage: vk::BufferUsageFlags,
        data: &[u8],
    ) -> Result<Self> {
        let size = data.len() as u64;

        let staging = Self::new(
            Arc::clone(&ctx),
            "staging",
            size,
            vk::BufferUsageFlags::TRANSFER_SRC,
            MemoryLocation::CpuToGpu,
        )?;
        staging.update(0, data)?;

        let buffer = Self::new(
            Arc::clone(&ctx),
            name,
            size,
            usage | vk::BufferUsageFlags::TRANSFER_DST,
            MemoryLocation::GpuOnly,
        )?;

        ctx.submit_one_time(|device, command_buffer| unsafe {
            let region = vk::BufferCopy::default().size(size);
            device.cmd_copy_buffer(command_buffer, staging.handle(), buffer.handle(), &[region]);
        })?;

        Ok(buffer)
    }

    /// Copy `data` into the mapped memory at `offset` (host-visible buffers only)
    pub fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            engine_bail!(
                "quad::vulkan",
                "Buffer update out of range: offset {} + {} bytes > size {}",
                offset,
                data.len(),
                self.size
            );
        }

        let allocation = self
            .allocation
            .as_ref()
            .ok_or_else(|| engine_err!("quad::vulkan", "Buffer update failed: no GPU allocation"))?;

        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::BackendError("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;

        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr.add(offset as usize), data.len());
        }
        Ok(())
    }

    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            free(&self.ctx, allocation);
        }
        unsafe {
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
