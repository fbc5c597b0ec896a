//! Viewport rendering state

use std::sync::Arc;

use parking_lot::Mutex;

use prism_core::{RendererConfig, Session};
use prism_renderer::Renderer;

/// Offscreen target shown as an egui image
struct RenderTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    egui_texture_id: egui::TextureId,
    width: u32,
    height: u32,
}

/// Viewport rendering state
pub struct ViewportState {
    pub renderer: Renderer,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    render_texture: Option<RenderTexture>,
}

impl ViewportState {
    /// Build the renderer for the egui surface format
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        config: &RendererConfig,
    ) -> Self {
        let renderer = Renderer::new(&device, &queue, format, 800, 600, config);
        Self {
            renderer,
            device,
            queue,
            render_texture: None,
        }
    }

    /// Texture id of a target sized `width` x `height`, reallocated on resize
    pub fn ensure_texture(
        &mut self,
        width: u32,
        height: u32,
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> egui::TextureId {
        let width = width.max(1);
        let height = height.max(1);

        if let Some(rt) = &self.render_texture
            && rt.width == width
            && rt.height == height
        {
            return rt.egui_texture_id;
        }

        // Free old texture if exists
        if let Some(old) = self.render_texture.take() {
            egui_renderer.free_texture(&old.egui_texture_id);
        }

        tracing::debug!("Creating viewport texture {width}x{height}");
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Viewport Render Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.renderer.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Register with egui
        let egui_texture_id =
            egui_renderer.register_native_texture(&self.device, &view, wgpu::FilterMode::Linear);

        self.renderer.resize(&self.device, width, height);

        self.render_texture = Some(RenderTexture {
            texture,
            view,
            egui_texture_id,
            width,
            height,
        });
        egui_texture_id
    }

    /// Render the session's scene to the texture
    pub fn render(&mut self, session: &Session) {
        let Some(rt) = &self.render_texture else {
            return;
        };

        let scene = session.scene();
        self.renderer.prepare(
            &self.device,
            &self.queue,
            scene,
            &scene.camera,
            session.cache(),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Render Encoder"),
            });

        self.renderer.render(&mut encoder, &rt.view);

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

pub type SharedViewportState = Arc<Mutex<ViewportState>>;
