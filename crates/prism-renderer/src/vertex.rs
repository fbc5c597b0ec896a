//! Vertex formats
//!
//! Vertex attributes are declared with `std::mem::offset_of!` so the offsets
//! follow the struct layout.

use prism_core::{Geometry, LineSegments};

use crate::color::srgb_to_linear;

/// Creates a vertex attribute with the offset calculated from the struct field.
///
/// ```ignore
/// const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
///     vertex_attr!(LineVertex, position, 0, Float32x3),
///     vertex_attr!(LineVertex, color, 1, Float32x3),
/// ];
/// ```
#[macro_export]
macro_rules! vertex_attr {
    ($struct:ty, $field:ident, $location:expr, $format:ident) => {
        wgpu::VertexAttribute {
            offset: std::mem::offset_of!($struct, $field) as u64,
            shader_location: $location,
            format: wgpu::VertexFormat::$format,
        }
    };
}

/// Creates a vertex buffer layout for `T`.
pub fn vertex_buffer_layout<T>(
    attributes: &[wgpu::VertexAttribute],
    step_mode: wgpu::VertexStepMode,
) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<T>() as u64,
        step_mode,
        attributes,
    }
}

/// Vertex of the primary object and the ground.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Position in model space.
    pub position: [f32; 3],
    /// Vertex normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl MeshVertex {
    /// Vertex attribute descriptors for the shader.
    pub const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        vertex_attr!(MeshVertex, position, 0, Float32x3),
        vertex_attr!(MeshVertex, normal, 1, Float32x3),
        vertex_attr!(MeshVertex, uv, 2, Float32x2),
    ];

    /// Per-vertex layout used by the triangle and line pipelines.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        vertex_buffer_layout::<Self>(Self::ATTRIBUTES, wgpu::VertexStepMode::Vertex)
    }

    /// Per-instance layout: the points pipeline draws one quad per vertex.
    pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        vertex_buffer_layout::<Self>(Self::ATTRIBUTES, wgpu::VertexStepMode::Instance)
    }
}

/// Interleave a geometry into GPU vertices
///
/// Missing normals or texture coordinates are filled with zeros.
pub fn mesh_vertices(geometry: &Geometry) -> Vec<MeshVertex> {
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| MeshVertex {
            position,
            normal: geometry.normals.get(i).copied().unwrap_or([0.0; 3]),
            uv: geometry.uvs.get(i).copied().unwrap_or([0.0; 2]),
        })
        .collect()
}

/// Position + color vertex of the line overlays.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
}

impl LineVertex {
    /// Vertex attribute descriptors for the shader.
    pub const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        vertex_attr!(LineVertex, position, 0, Float32x3),
        vertex_attr!(LineVertex, color, 1, Float32x3),
    ];

    /// Returns the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        vertex_buffer_layout::<Self>(Self::ATTRIBUTES, wgpu::VertexStepMode::Vertex)
    }
}

/// Convert overlay segments, whose colors are display colors, to GPU vertices
pub fn line_vertices(lines: &LineSegments) -> impl Iterator<Item = LineVertex> + '_ {
    lines.vertices.iter().map(|v| LineVertex {
        position: v.position,
        color: v.color.map(srgb_to_linear),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_offsets() {
        assert_eq!(MeshVertex::ATTRIBUTES[1].offset, 12);
        assert_eq!(MeshVertex::ATTRIBUTES[2].offset, 24);
        assert_eq!(MeshVertex::layout().array_stride, 32);
        assert_eq!(LineVertex::layout().array_stride, 24);
        assert_eq!(
            MeshVertex::instance_layout().step_mode,
            wgpu::VertexStepMode::Instance
        );
    }

    #[test]
    fn test_mesh_vertices_fill_missing_attributes() {
        let geometry = Geometry::new(
            "tri",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            Vec::new(),
            vec![0, 1, 2],
        );
        let vertices = mesh_vertices(&geometry);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[2].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[2].uv, [0.0, 0.0]);
    }

    #[test]
    fn test_line_colors_are_linearized() {
        let axes = LineSegments::axes(1.0);
        let vertices: Vec<_> = line_vertices(&axes).collect();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[3].position, [0.0, 1.0, 0.0]);
    }
}
