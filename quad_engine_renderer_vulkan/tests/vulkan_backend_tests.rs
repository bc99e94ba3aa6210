//! Integration tests for the Vulkan backend
//!
//! All tests require a GPU and a window system and are marked with #[ignore].
//! Tests that record commands also need the compiled shaders
//! (`quad_demo/shaders/*.spv`).
//!
//! Run with: cargo test --test vulkan_backend_tests -- --ignored

use quad_engine::quad::frame::{
    Extent2D, FrameOutcome, FrameSync, ResizeFlag, Swapchain, WindowSurface,
};
use quad_engine::quad::payload::Checkerboard;
use quad_engine::quad::{Config, Error, Payload};
use quad_engine_renderer_vulkan::{
    create_frame_loop, VulkanBuffer, VulkanCommandRecorder, VulkanContext, VulkanFrameSync,
    VulkanSwapchain, VulkanTexture,
};
use std::path::PathBuf;
use std::sync::Arc;
use winit::event_loop::EventLoop;
use winit::window::Window;

/// Helper to create a hidden test window
#[allow(deprecated)]
fn create_test_window() -> (Window, EventLoop<()>) {
    let event_loop = EventLoop::new().unwrap();
    let window_attrs = Window::default_attributes()
        .with_title("Quad Engine Vulkan Test")
        .with_inner_size(winit::dpi::PhysicalSize::new(800, 600))
        .with_visible(false); // Hidden window for tests
    let window = event_loop.create_window(window_attrs).unwrap();
    (window, event_loop)
}

fn test_config(payload: Payload) -> Config {
    Config {
        payload,
        enable_validation: false,
        shader_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../quad_demo/shaders")),
        ..Config::default()
    }
}

/// Window surface that never minimizes
struct TestSurface<'a>(&'a Window);

impl WindowSurface for TestSurface<'_> {
    fn framebuffer_extent(&self) -> Extent2D {
        Extent2D::from(self.0.inner_size())
    }

    fn wait_events(&self) {}
}

// ============================================================================
// CONTEXT AND RESOURCES
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_context_creation() {
    let (window, _event_loop) = create_test_window();
    let ctx = VulkanContext::new(&window, &test_config(Payload::TexturedQuad)).unwrap();

    assert!(ctx.max_sampler_anisotropy >= 1.0);
    ctx.wait_idle().unwrap();
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_frame_sync_fences_start_signaled() {
    let (window, _event_loop) = create_test_window();
    let ctx = VulkanContext::new(&window, &test_config(Payload::Triangle)).unwrap();
    let sync = VulkanFrameSync::new(Arc::clone(&ctx), 3).unwrap();

    assert_eq!(sync.frames_in_flight(), 3);
    for frame in 0..3 {
        // Returns immediately: fences are created signaled
        sync.wait(frame).unwrap();
        sync.reset(frame).unwrap();
    }
    assert_ne!(sync.image_available(0), sync.render_finished(0));
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_swapchain_creation_and_recreate() {
    let (window, _event_loop) = create_test_window();
    let ctx = VulkanContext::new(&window, &test_config(Payload::Triangle)).unwrap();
    let mut swapchain = VulkanSwapchain::new(Arc::clone(&ctx), Extent2D::new(800, 600)).unwrap();

    assert!(swapchain.image_count() >= 2);
    assert!(!swapchain.extent().is_zero());

    ctx.wait_idle().unwrap();
    swapchain.recreate(Extent2D::new(640, 480)).unwrap();
    assert!(swapchain.image_count() >= 2);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_buffer_update_bounds() {
    let (window, _event_loop) = create_test_window();
    let ctx = VulkanContext::new(&window, &test_config(Payload::Triangle)).unwrap();
    let buffer = VulkanBuffer::new(
        Arc::clone(&ctx),
        "test",
        64,
        ash::vk::BufferUsageFlags::UNIFORM_BUFFER,
        gpu_allocator::MemoryLocation::CpuToGpu,
    )
    .unwrap();

    assert_eq!(buffer.size(), 64);
    buffer.update(0, &[1u8; 64]).unwrap();
    buffer.update(32, &[2u8; 32]).unwrap();
    assert!(buffer.update(48, &[3u8; 32]).is_err());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_texture_upload() {
    let (window, _event_loop) = create_test_window();
    let ctx = VulkanContext::new(&window, &test_config(Payload::TexturedQuad)).unwrap();

    let texture = VulkanTexture::from_checkerboard(Arc::clone(&ctx), &Checkerboard::default()).unwrap();
    assert_eq!((texture.width(), texture.height()), (256, 256));

    let bad = VulkanTexture::from_rgba8(Arc::clone(&ctx), 4, 4, &[0u8; 10]);
    assert!(matches!(bad, Err(Error::InvalidResource(_))));
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_recorder_missing_shaders() {
    let (window, _event_loop) = create_test_window();
    let config = Config {
        shader_dir: PathBuf::from("/nonexistent/shader/dir"),
        ..test_config(Payload::TexturedQuad)
    };
    let ctx = VulkanContext::new(&window, &config).unwrap();

    let result = VulkanCommandRecorder::new(ctx, &config);
    assert!(matches!(result, Err(Error::AssetLoadFailed(_))));
}

// ============================================================================
// FRAME LOOP
// ============================================================================

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_frame_loop_textured_quad() {
    let (window, _event_loop) = create_test_window();
    let resize = ResizeFlag::new();
    let mut frame_loop =
        create_frame_loop(&window, &test_config(Payload::TexturedQuad), resize.clone()).unwrap();
    let surface = TestSurface(&window);

    assert_eq!(frame_loop.recorder().recorded_count(), frame_loop.swapchain().image_count());

    for _ in 0..10 {
        frame_loop.draw_frame(&surface).unwrap();
    }
    assert!(frame_loop.current_frame() <= 10);
    frame_loop.wait_idle().unwrap();
}

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_frame_loop_triangle_with_resize() {
    let (window, _event_loop) = create_test_window();
    let resize = ResizeFlag::new();
    let mut frame_loop = create_frame_loop(&window, &test_config(Payload::Triangle), resize.clone()).unwrap();
    let surface = TestSurface(&window);

    for _ in 0..3 {
        frame_loop.draw_frame(&surface).unwrap();
    }

    let generation = frame_loop.generation();
    resize.raise();
    let outcome = frame_loop.draw_frame(&surface).unwrap();

    match outcome {
        FrameOutcome::Presented { recreated, .. } => assert!(recreated),
        FrameOutcome::Skipped => {}
    }
    assert!(frame_loop.generation() > generation);
    assert_eq!(frame_loop.recorder().recorded_count(), frame_loop.swapchain().image_count());
}
