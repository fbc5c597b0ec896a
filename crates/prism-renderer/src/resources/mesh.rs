//! GPU geometry buffers keyed by geometry id

use std::collections::{HashMap, HashSet};

use wgpu::util::DeviceExt;

use prism_core::{Geometry, GeometryId};

use crate::vertex::mesh_vertices;

/// Vertex, triangle and edge buffers of one geometry
pub struct GpuMesh {
    /// Interleaved [`crate::vertex::MeshVertex`] data.
    pub vertex_buffer: wgpu::Buffer,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Triangle indices.
    pub index_buffer: wgpu::Buffer,
    /// Number of triangle indices.
    pub index_count: u32,
    /// Unique edges as index pairs, for wireframe drawing.
    pub edge_buffer: wgpu::Buffer,
    /// Number of edge indices.
    pub edge_count: u32,
}

impl GpuMesh {
    /// Upload a geometry
    pub fn new(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vertices = mesh_vertices(geometry);
        let edges: Vec<u32> = geometry.edges().into_iter().flatten().collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", geometry.label)),
            contents: non_empty(bytemuck::cast_slice(&vertices)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", geometry.label)),
            contents: non_empty(bytemuck::cast_slice(&geometry.indices)),
            usage: wgpu::BufferUsages::INDEX,
        });
        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Edge Buffer", geometry.label)),
            contents: non_empty(bytemuck::cast_slice(&edges)),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            edge_buffer,
            edge_count: edges.len() as u32,
        }
    }
}

/// Zero-sized buffers are invalid; pad empty contents with one index
fn non_empty(bytes: &[u8]) -> &[u8] {
    if bytes.is_empty() { &[0; 4] } else { bytes }
}

/// Uploaded geometries
///
/// Geometry is immutable once shared with the scene, so its id identifies
/// the buffers. Geometries not used by a frame are released after it.
#[derive(Default)]
pub struct MeshManager {
    meshes: HashMap<GeometryId, GpuMesh>,
    used: HashSet<GeometryId>,
}

impl MeshManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload `geometry` unless already resident, and mark it used this frame
    pub fn prepare(&mut self, device: &wgpu::Device, geometry: &Geometry) {
        self.used.insert(geometry.id);
        if !self.meshes.contains_key(&geometry.id) {
            tracing::debug!(
                "Uploading mesh '{}' ({} vertices, {} triangles)",
                geometry.label,
                geometry.vertex_count(),
                geometry.triangle_count()
            );
            self.meshes
                .insert(geometry.id, GpuMesh::new(device, geometry));
        }
    }

    /// Buffers of a resident geometry
    pub fn get(&self, id: GeometryId) -> Option<&GpuMesh> {
        self.meshes.get(&id)
    }

    /// Release the geometries not prepared since the last call
    pub fn end_frame(&mut self) {
        let used = std::mem::take(&mut self.used);
        self.meshes.retain(|id, _| used.contains(id));
    }

    /// Number of resident geometries
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no geometry is resident
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
