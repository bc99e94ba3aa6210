/// Vertex layout and the static quad mesh

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex: 2D position, RGB color, texture coordinate
///
/// Matches the vertex shader inputs at locations 0, 1 and 2 of binding 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub color: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// Component format of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    Float2,
    Float3,
}

/// One vertex attribute as seen by the pipeline's vertex input state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: AttributeFormat,
    pub offset: u32,
}

impl Vertex {
    /// Vertex buffer binding index
    pub const BINDING: u32 = 0;

    /// Size of one vertex in bytes
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    /// Attribute layout (position, color, texture coordinate)
    pub fn attributes() -> [VertexAttribute; 3] {
        [
            VertexAttribute {
                location: 0,
                format: AttributeFormat::Float2,
                offset: std::mem::offset_of!(Vertex, pos) as u32,
            },
            VertexAttribute {
                location: 1,
                format: AttributeFormat::Float3,
                offset: std::mem::offset_of!(Vertex, color) as u32,
            },
            VertexAttribute {
                location: 2,
                format: AttributeFormat::Float2,
                offset: std::mem::offset_of!(Vertex, tex_coord) as u32,
            },
        ]
    }
}

/// Four corners of the quad, counter-clockwise in model space
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex { pos: [-0.5, -0.5], color: [1.0, 0.0, 0.0], tex_coord: [1.0, 0.0] },
    Vertex { pos: [0.5, -0.5], color: [0.0, 1.0, 0.0], tex_coord: [0.0, 0.0] },
    Vertex { pos: [0.5, 0.5], color: [0.0, 0.0, 1.0], tex_coord: [0.0, 1.0] },
    Vertex { pos: [-0.5, 0.5], color: [1.0, 1.0, 1.0], tex_coord: [1.0, 1.0] },
];

/// Two triangles covering the quad
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Vertices drawn by the resource-free triangle payload
pub const TRIANGLE_VERTEX_COUNT: u32 = 3;

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
