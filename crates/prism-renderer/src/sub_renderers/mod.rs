//! Sub-renderers of the main pass
//!
//! - [`mesh::MeshRenderer`]: primary object and ground, lit and shadowed
//! - [`lines::LineRenderer`]: axes, light helper and gizmo lines
//! - [`background::BackgroundRenderer`]: textured and cube map backgrounds

pub mod background;
pub mod lines;
pub mod mesh;

pub use background::BackgroundRenderer;
pub use lines::LineRenderer;
pub use mesh::{DrawItem, MaterialBinding, MeshRenderer, ObjectEntry, ObjectUniform, PipelineKey};
