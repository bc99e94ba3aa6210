/// VulkanContext - instance, surface, device, queues and allocator shared by every Vulkan object
///
/// Everything else in the backend holds an `Arc<VulkanContext>`, so the context
/// is destroyed last: after the last buffer, pipeline, swapchain and sync object.

use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use quad_engine::quad::{Config, Error, Result};
use quad_engine::{engine_debug, engine_err, engine_error, engine_info, engine_warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CStr;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

const SOURCE: &str = "quad::vulkan";

/// Khronos validation layer
pub(crate) const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Device extensions every candidate GPU must support
pub(crate) const REQUIRED_DEVICE_EXTENSIONS: [&CStr; 1] = [ash::khr::swapchain::NAME];

/// Graphics and present queue family indices (possibly identical)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    /// Pick the first graphics-capable family and the first family that can present
    ///
    /// # Arguments
    ///
    /// * `families` - Queue family properties of one physical device
    /// * `supports_present` - Whether family `i` can present to the surface
    pub fn select<F>(families: &[vk::QueueFamilyProperties], mut supports_present: F) -> Self
    where
        F: FnMut(u32) -> bool,
    {
        let mut indices = Self::default();
        for (i, family) in families.iter().enumerate() {
            let i = i as u32;
            if indices.graphics.is_none()
                && family.queue_count > 0
                && family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
            {
                indices.graphics = Some(i);
            }
            if indices.present.is_none() && family.queue_count > 0 && supports_present(i) {
                indices.present = Some(i);
            }
            if indices.is_complete() {
                break;
            }
        }
        indices
    }

    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// Distinct family indices, graphics first
    pub fn unique(&self) -> Vec<u32> {
        let mut families: Vec<u32> = self.graphics.into_iter().chain(self.present).collect();
        families.dedup();
        families
    }
}

/// Names from `required` that are absent from `available`
pub(crate) fn missing_names<'a>(available: &[&CStr], required: &[&'a CStr]) -> Vec<&'a CStr> {
    required
        .iter()
        .filter(|name| !available.contains(name))
        .copied()
        .collect()
}

/// Shared Vulkan context.
///
/// Owns the instance, surface, logical device, queues, allocator and the
/// command pool used both for per-image command buffers and one-time uploads.
pub struct VulkanContext {
    /// Vulkan loader (must outlive the instance)
    _entry: ash::Entry,
    pub instance: ash::Instance,

    pub surface_loader: ash::khr::surface::Instance,
    pub surface: vk::SurfaceKHR,

    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,

    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,
    pub present_queue: vk::Queue,
    pub present_queue_family: u32,

    /// Largest anisotropy level supported by the device
    pub max_sampler_anisotropy: f32,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop so it is dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Command pool (RESET_COMMAND_BUFFER) for per-image and one-time command buffers
    pub command_pool: Mutex<vk::CommandPool>,

    /// Validation messenger, present only when the layer was enabled
    #[cfg(feature = "vulkan-validation")]
    debug_messenger: Option<crate::debug::DebugMessenger>,
}

impl VulkanContext {
    /// Create the Vulkan context for a window
    ///
    /// # Arguments
    ///
    /// * `window` - Window providing the display and window handles
    /// * `config` - Application configuration (name, version, validation)
    ///
    /// # Errors
    ///
    /// Returns `Error::InitializationFailed` if the Vulkan library cannot be
    /// loaded, no GPU satisfies the requirements, or any creation call fails.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<Arc<Self>> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!(SOURCE, "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            let enable_validation = Self::validation_requested(&entry, config);

            // Application Info
            let app_name = std::ffi::CString::new(config.app_name.as_str()).map_err(|_| {
                Error::InitializationFailed("Application name contains a NUL byte".to_string())
            })?;
            let (major, minor, patch) = config.app_version;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"Quad Engine")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_0);

            // Get required extensions
            let display_handle = window.display_handle().map_err(|e| {
                engine_error!(SOURCE, "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| {
                    engine_error!(SOURCE, "Failed to get required extensions: {}", e);
                    Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                })?
                .to_vec();

            if enable_validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            let layer_names = if enable_validation {
                vec![VALIDATION_LAYER.as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                engine_error!(SOURCE, "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            #[cfg(feature = "vulkan-validation")]
            let debug_messenger = if enable_validation {
                Some(crate::debug::DebugMessenger::new(&entry, &instance, &config.debug)?)
            } else {
                None
            };

            // Create Surface
            let window_handle = window.window_handle().map_err(|e| {
                engine_error!(SOURCE, "Failed to get window handle: {}", e);
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!(SOURCE, "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            // Pick Physical Device
            let (physical_device, families) =
                Self::pick_physical_device(&instance, &surface_loader, surface)?;
            let graphics_family = families.graphics.unwrap_or_default();
            let present_family = families.present.unwrap_or_default();

            let properties = instance.get_physical_device_properties(physical_device);
            engine_info!(
                SOURCE,
                "Using GPU {} (graphics family {}, present family {})",
                properties
                    .device_name_as_c_str()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|_| "<unnamed>".to_string()),
                graphics_family,
                present_family
            );

            // Create Logical Device
            let queue_priorities = [1.0];
            let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = families
                .unique()
                .into_iter()
                .map(|family| {
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(family)
                        .queue_priorities(&queue_priorities)
                })
                .collect();

            let device_extension_names: Vec<*const std::ffi::c_char> =
                REQUIRED_DEVICE_EXTENSIONS.iter().map(|name| name.as_ptr()).collect();

            let device_features = vk::PhysicalDeviceFeatures::default().sampler_anisotropy(true);

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    engine_error!(SOURCE, "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(graphics_family, 0);
            let present_queue = device.get_device_queue(present_family, 0);

            // Create GPU allocator
            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                engine_error!(SOURCE, "Failed to create GPU allocator: {:?}", e);
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;

            let pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = device.create_command_pool(&pool_create_info, None).map_err(|e| {
                engine_error!(SOURCE, "Failed to create command pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
            })?;

            Ok(Arc::new(Self {
                _entry: entry,
                instance,
                surface_loader,
                surface,
                physical_device,
                device,
                graphics_queue,
                graphics_queue_family: graphics_family,
                present_queue,
                present_queue_family: present_family,
                max_sampler_anisotropy: properties.limits.max_sampler_anisotropy,
                allocator: ManuallyDrop::new(Mutex::new(allocator)),
                command_pool: Mutex::new(command_pool),
                #[cfg(feature = "vulkan-validation")]
                debug_messenger,
            }))
        }
    }

    /// Decide whether the validation layer is actually enabled
    fn validation_requested(entry: &ash::Entry, config: &Config) -> bool {
        if !config.enable_validation {
            return false;
        }
        if !cfg!(feature = "vulkan-validation") {
            engine_warn!(SOURCE, "Validation requested but the vulkan-validation feature is not compiled in");
            return false;
        }

        let layers = match unsafe { entry.enumerate_instance_layer_properties() } {
            Ok(layers) => layers,
            Err(e) => {
                engine_warn!(SOURCE, "Failed to enumerate instance layers: {:?}", e);
                return false;
            }
        };
        let available: Vec<&CStr> = layers
            .iter()
            .filter_map(|layer| layer.layer_name_as_c_str().ok())
            .collect();

        if missing_names(&available, &[VALIDATION_LAYER]).is_empty() {
            engine_debug!(SOURCE, "Validation layer enabled");
            true
        } else {
            engine_warn!(SOURCE, "Validation layer requested, but not available");
            false
        }
    }

    /// Pick the first physical device that can render and present to `surface`
    ///
    /// A device qualifies when it has graphics and present queue families,
    /// supports the swapchain extension, reports at least one surface format
    /// and present mode, and supports anisotropic sampling.
    unsafe fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, QueueFamilyIndices)> {
        let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
            engine_error!(SOURCE, "Failed to enumerate physical devices: {:?}", e);
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        if physical_devices.is_empty() {
            engine_error!(SOURCE, "No Vulkan-capable GPU found");
            return Err(Error::InitializationFailed("No Vulkan-capable GPU found".to_string()));
        }

        for physical_device in physical_devices {
            let families = QueueFamilyIndices::select(
                &instance.get_physical_device_queue_family_properties(physical_device),
                |i| {
                    surface_loader
                        .get_physical_device_surface_support(physical_device, i, surface)
                        .unwrap_or(false)
                },
            );
            if !families.is_complete() {
                continue;
            }

            let extensions = instance
                .enumerate_device_extension_properties(physical_device)
                .unwrap_or_default();
            let available: Vec<&CStr> = extensions
                .iter()
                .filter_map(|ext| ext.extension_name_as_c_str().ok())
                .collect();
            if !missing_names(&available, &REQUIRED_DEVICE_EXTENSIONS).is_empty() {
                continue;
            }

            let formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .unwrap_or_default();
            let present_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .unwrap_or_default();
            if formats.is_empty() || present_modes.is_empty() {
                continue;
            }

            let features = instance.get_physical_device_features(physical_device);
            if features.sampler_anisotropy != vk::TRUE {
                continue;
            }

            return Ok((physical_device, families));
        }

        engine_error!(SOURCE, "Failed to find a suitable GPU");
        Err(Error::InitializationFailed("Failed to find a suitable GPU".to_string()))
    }

    /// Record and run a one-time command buffer, blocking until the queue is idle
    ///
    /// Used for staging copies and image layout transitions at startup.
    pub fn submit_one_time<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let pool = self
            .command_pool
            .lock()
            .map_err(|_| engine_err!(SOURCE, "Command pool lock poisoned"))?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffer = self
                .device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!(SOURCE, "Failed to allocate one-time command buffer: {:?}", e))?[0];

            let result = (|| -> Result<()> {
                let begin_info = vk::CommandBufferBeginInfo::default()
                    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
                self.device
                    .begin_command_buffer(command_buffer, &begin_info)
                    .map_err(|e| engine_err!(SOURCE, "Failed to begin one-time command buffer: {:?}", e))?;

                record(&self.device, command_buffer);

                self.device
                    .end_command_buffer(command_buffer)
                    .map_err(|e| engine_err!(SOURCE, "Failed to end one-time command buffer: {:?}", e))?;

                let command_buffers = [command_buffer];
                let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
                self.device
                    .queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
                    .map_err(|e| engine_err!(SOURCE, "Failed to submit one-time command buffer: {:?}", e))?;
                self.device
                    .queue_wait_idle(self.graphics_queue)
                    .map_err(|e| engine_err!(SOURCE, "Failed to wait for one-time command buffer: {:?}", e))
            })();

            self.device.free_command_buffers(*pool, &[command_buffer]);
            result
        }
    }

    /// Block until the device has no outstanding work
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| engine_err!(SOURCE, "Failed to wait idle: {:?}", e))
        }
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            if let Ok(pool) = self.command_pool.get_mut() {
                self.device.destroy_command_pool(*pool, None);
            }

            // Free VkDeviceMemory pages BEFORE destroying the device
            ManuallyDrop::drop(&mut self.allocator);

            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);

            // Messenger goes BEFORE the instance, callbacks are silenced first
            #[cfg(feature = "vulkan-validation")]
            if let Some(messenger) = self.debug_messenger.take() {
                messenger.destroy();
            }

            self.instance.destroy_instance(None);
        }
        engine_debug!(SOURCE, "Vulkan context destroyed");
    }
}

#[cfg(test)]
#[path = "vulkan_context_tests.rs"]
mod tests;
