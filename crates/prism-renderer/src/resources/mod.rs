//! GPU resource management
//!
//! - [`MeshManager`]: vertex, index and edge buffers per geometry
//! - [`TextureManager`]: textures and cube maps per asset key

mod mesh;
mod texture;

pub use mesh::{GpuMesh, MeshManager};
pub use texture::{GpuTexture, TexelSpace, TextureManager};
