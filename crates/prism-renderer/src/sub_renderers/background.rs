//! Textured and cube map backgrounds
//!
//! A color background is the main pass clear value and needs no draw call.

use prism_core::{AssetCache, AssetKey, Background};

use crate::pipeline::{PipelineConfig, create_camera_bind_group, sampler_entry, texture_entry};
use crate::resources::{TexelSpace, TextureManager};

/// Which fragment entry point draws the background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Projection {
    /// Image stretched over the viewport
    Flat,
    /// Cube map sampled along the view ray
    Cube,
}

struct BoundBackground {
    projection: Projection,
    key: AssetKey,
    bind_group: wgpu::BindGroup,
}

/// Full-screen background renderer
pub struct BackgroundRenderer {
    flat_pipeline: wgpu::RenderPipeline,
    cube_pipeline: wgpu::RenderPipeline,
    camera_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    bound: Option<BoundBackground>,
}

impl BackgroundRenderer {
    /// Creates a new background renderer
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/background.wgsl").into()),
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Background Bind Group Layout"),
                entries: &[
                    texture_entry(0, wgpu::TextureViewDimension::D2),
                    texture_entry(1, wgpu::TextureViewDimension::Cube),
                    sampler_entry(2),
                ],
            });

        let layouts = [camera_bind_group_layout, &texture_bind_group_layout];
        let pipeline = |label: &str, entry: &str| {
            PipelineConfig::new(label, &shader, format, depth_format, &layouts)
                .with_entry_points("vs_main", entry)
                .with_depth(false, wgpu::CompareFunction::Always)
                .with_sample_count(sample_count)
                .build(device)
        };
        let flat_pipeline = pipeline("Flat Background", "fs_texture");
        let cube_pipeline = pipeline("Cube Background", "fs_cube");

        let camera_bind_group = create_camera_bind_group(
            device,
            camera_bind_group_layout,
            camera_buffer,
            "Background",
        );

        Self {
            flat_pipeline,
            cube_pipeline,
            camera_bind_group,
            texture_bind_group_layout,
            bound: None,
        }
    }

    /// Bind the displayed background
    ///
    /// Until its asset is loaded, a textured background draws nothing and
    /// the clear color shows through.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &mut TextureManager,
        assets: &AssetCache,
        background: &Background,
    ) {
        let (projection, key) = match background {
            Background::Color(_) => {
                self.bound = None;
                return;
            }
            Background::Texture(key) => (Projection::Flat, key),
            Background::CubeMap(key) => (Projection::Cube, key),
        };
        if self
            .bound
            .as_ref()
            .is_some_and(|b| b.projection == projection && &b.key == key)
        {
            return;
        }

        let ready = match projection {
            Projection::Flat => textures.prepare_image(device, queue, assets, key, TexelSpace::Color),
            Projection::Cube => textures.prepare_cube(device, queue, assets, key),
        };
        if !ready {
            self.bound = None;
            return;
        }

        let flat = match projection {
            Projection::Flat => textures.image(key, TexelSpace::Color),
            Projection::Cube => None,
        }
        .unwrap_or(textures.white());
        let cube = match projection {
            Projection::Cube => textures.cube(key),
            Projection::Flat => None,
        }
        .unwrap_or(textures.black_cube());

        tracing::debug!("Binding background {}", key.label());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Background Bind Group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(flat),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(cube),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(textures.sampler()),
                },
            ],
        });
        self.bound = Some(BoundBackground {
            projection,
            key: key.clone(),
            bind_group,
        });
    }

    /// Draw the background, if one is bound
    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        let Some(bound) = &self.bound else {
            return;
        };
        let pipeline = match bound.projection {
            Projection::Flat => &self.flat_pipeline,
            Projection::Cube => &self.cube_pipeline,
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &bound.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
