//! Scene light uniform and its shadow map

use wgpu::util::DeviceExt;

use prism_core::{Light, ShadowFilter};

use crate::light::LightUniform;
use crate::sub_renderers::MeshRenderer;

use super::gpu_resources;

/// Manages the light uniform and the shadow map.
pub struct LightingSystem {
    /// Last uploaded light data.
    uniform: LightUniform,
    /// Uniform buffer read by both passes.
    light_buffer: wgpu::Buffer,
    /// Shadow map texture.
    #[allow(dead_code)]
    shadow_texture: wgpu::Texture,
    /// Shadow map texture view.
    shadow_view: wgpu::TextureView,
    /// Light, shadow map and comparison sampler for the main pass.
    light_bind_group: wgpu::BindGroup,
    /// Light alone, for the depth-only shadow pass.
    shadow_light_bind_group: wgpu::BindGroup,
    /// Shadow map size.
    shadow_map_size: u32,
    /// Whether the surface renders shadows at all.
    shadows_enabled: bool,
    /// Shadow map filtering.
    shadow_filter: ShadowFilter,
}

impl LightingSystem {
    /// Allocate the light buffer and a shadow map of `shadow_map_size`.
    pub fn new(
        device: &wgpu::Device,
        mesh_renderer: &MeshRenderer,
        shadows_enabled: bool,
        shadow_filter: ShadowFilter,
        shadow_map_size: u32,
    ) -> Self {
        let uniform = LightUniform::default();
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shadow_map_size = gpu_resources::shadow_map_size(shadow_map_size);
        let (shadow_texture, shadow_view) =
            gpu_resources::create_shadow_texture(device, shadow_map_size);
        let shadow_sampler = gpu_resources::create_shadow_sampler(device);

        let light_bind_group = gpu_resources::create_light_bind_group(
            device,
            mesh_renderer.light_bind_group_layout(),
            &light_buffer,
            &shadow_view,
            &shadow_sampler,
        );
        let shadow_light_bind_group = gpu_resources::create_shadow_light_bind_group(
            device,
            mesh_renderer.shadow_light_bind_group_layout(),
            &light_buffer,
        );

        Self {
            uniform,
            light_buffer,
            shadow_texture,
            shadow_view,
            light_bind_group,
            shadow_light_bind_group,
            shadow_map_size,
            shadows_enabled,
            shadow_filter,
        }
    }

    pub fn light_bind_group(&self) -> &wgpu::BindGroup {
        &self.light_bind_group
    }

    pub fn shadow_light_bind_group(&self) -> &wgpu::BindGroup {
        &self.shadow_light_bind_group
    }

    pub fn shadow_view(&self) -> &wgpu::TextureView {
        &self.shadow_view
    }

    /// Clamped shadow map resolution
    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    /// Whether the current light needs a shadow pass.
    pub fn casts_shadows(&self) -> bool {
        self.uniform.casts_shadows()
    }

    /// Upload the scene light; `None` leaves the scene unlit.
    pub fn update(&mut self, queue: &wgpu::Queue, light: Option<&Light>) {
        self.uniform = LightUniform::new(
            light,
            self.shadows_enabled,
            self.shadow_filter,
            self.shadow_map_size,
        );
        queue.write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
