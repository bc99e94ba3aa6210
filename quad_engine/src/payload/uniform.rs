/// Per-image transform uploaded to the uniform buffer before each submit

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use crate::frame::Extent2D;

/// Rotation speed of the quad around +Z, in degrees per second
pub const ROTATION_DEGREES_PER_SECOND: f32 = 90.0;

/// Model, view and projection matrices (column-major, std140 compatible)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformBufferObject {
    pub model: Mat4,
    pub view: Mat4,
    pub proj: Mat4,
}

impl UniformBufferObject {
    /// Size in bytes of the uniform block
    pub const SIZE: u64 = std::mem::size_of::<UniformBufferObject>() as u64;

    /// Transform for `seconds` after startup, rendered into `extent`
    ///
    /// The projection targets clip-space depth 0..1 with Y pointing down.
    /// A zero-height extent falls back to a square aspect ratio.
    pub fn at_time(seconds: f32, extent: Extent2D) -> Self {
        let model = Mat4::from_rotation_z((seconds * ROTATION_DEGREES_PER_SECOND).to_radians());
        let view = Mat4::look_at_rh(Vec3::new(2.0, 2.0, 2.0), Vec3::ZERO, Vec3::Z);

        let aspect = if extent.height == 0 {
            1.0
        } else {
            extent.width as f32 / extent.height as f32
        };
        let mut proj = Mat4::perspective_rh(45f32.to_radians(), aspect, 0.1, 10.0);
        proj.y_axis.y *= -1.0;

        Self { model, view, proj }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;
