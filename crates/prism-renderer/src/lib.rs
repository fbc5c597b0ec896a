//! Prism renderer
//!
//! WGPU render surface for the Prism scene.
//!
//! # Module Structure
//!
//! ```text
//! prism-renderer/
//! ├── renderer/        # Renderer, lighting/shadow system, pass recording
//! ├── sub_renderers/   # Mesh, line overlay and background renderers
//! ├── resources/       # GPU meshes and textures keyed by scene resources
//! ├── shaders/         # WGSL sources
//! ├── camera.rs        # Camera uniform
//! ├── light.rs         # Light uniform
//! ├── color.rs         # sRGB / linear conversion
//! ├── pipeline.rs      # Pipeline utilities
//! └── vertex.rs        # Vertex formats
//! ```

pub mod camera;
pub mod color;
pub mod constants;
pub mod light;
pub mod pipeline;
pub mod renderer;
pub mod resources;
pub mod sub_renderers;
pub mod vertex;

// Re-exports for convenience
pub use camera::CameraUniform;
pub use light::LightUniform;
pub use renderer::{LightingSystem, Renderer};
pub use resources::{GpuMesh, MeshManager, TextureManager};
pub use sub_renderers::{BackgroundRenderer, LineRenderer, MeshRenderer};
pub use vertex::{LineVertex, MeshVertex};
