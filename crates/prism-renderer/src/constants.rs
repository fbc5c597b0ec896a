//! Renderer constants

/// Viewport render target constants
pub mod viewport {
    /// Depth buffer format of the main pass
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
}

/// Shadow map constants
pub mod shadow {
    /// Shadow map depth format
    pub const SHADOW_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// Smallest accepted shadow map resolution
    pub const MIN_SIZE: u32 = 256;
    /// Largest accepted shadow map resolution
    pub const MAX_SIZE: u32 = 8192;
}

/// Line overlay constants
pub mod lines {
    /// Initial vertex capacity of the line buffer
    pub const INITIAL_CAPACITY: usize = 1024;
}

/// Placeholder texel values bound when a map is absent
pub mod placeholder {
    /// Neutral color / ao / roughness texel
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    /// Tangent-space normal pointing straight out of the surface
    pub const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];
}
