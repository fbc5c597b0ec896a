//! Main renderer combining all sub-renderers.
//!
//! A frame is drawn in two steps:
//! - [`Renderer::prepare`] uploads what the scene references (geometry,
//!   textures, uniforms, line overlays)
//! - [`Renderer::render`] records the shadow pass and the main pass
//!
//! # Architecture
//!
//! - [`LightingSystem`]: light uniform and shadow map
//! - [`MeshManager`]/[`TextureManager`]: GPU copies of scene resources
//! - [`BackgroundRenderer`], [`MeshRenderer`], [`LineRenderer`]: the
//!   sub-renderers, drawn in that order

mod gpu_resources;
mod lighting_system;
mod render_pass;

pub use lighting_system::LightingSystem;
pub use render_pass::{MainPassParams, ShadowPassParams, render_main_pass, render_shadow_pass};

use wgpu::util::DeviceExt;

use prism_core::{
    AssetCache, AssetKey, Background, Color, LineSegments, PerspectiveCamera, RendererConfig,
    Scene,
};

use crate::camera::CameraUniform;
use crate::color::clear_color;
use crate::constants::viewport::DEPTH_FORMAT;
use crate::pipeline::uniform_entry;
use crate::resources::{MeshManager, TextureManager};
use crate::sub_renderers::{BackgroundRenderer, DrawItem, LineRenderer, MeshRenderer, ObjectEntry};

/// Renders a [`Scene`] into a color target.
pub struct Renderer {
    // Camera
    camera_buffer: wgpu::Buffer,

    // Core components
    lighting_system: LightingSystem,
    meshes: MeshManager,
    textures: TextureManager,

    // Per-object state
    ground: Option<ObjectEntry>,
    primary: Option<ObjectEntry>,

    // Depth/MSAA resources
    #[allow(dead_code)] // Held for GPU resource lifetime
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    #[allow(dead_code)] // Held for GPU resource lifetime
    msaa_texture: Option<wgpu::Texture>,
    msaa_view: Option<wgpu::TextureView>,

    // Sub-renderers
    background_renderer: BackgroundRenderer,
    mesh_renderer: MeshRenderer,
    line_renderer: LineRenderer,

    clear_color: wgpu::Color,
    format: wgpu::TextureFormat,
    sample_count: u32,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Creates a renderer drawing into `format` targets of the given size.
    ///
    /// Antialiasing and the shadow map are fixed for the renderer's lifetime.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &RendererConfig,
    ) -> Self {
        let sample_count = config.sample_count();
        tracing::info!(
            "Creating renderer: {width}x{height} {format:?}, {sample_count}x MSAA, shadows {}",
            if config.shadows { "on" } else { "off" }
        );

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
            });

        // Create depth and MSAA textures
        let (depth_texture, depth_view) =
            gpu_resources::create_depth_texture(device, width, height, sample_count);
        let (msaa_texture, msaa_view) =
            gpu_resources::create_msaa_texture(device, format, width, height, sample_count)
                .unzip();

        // Initialize sub-renderers
        let background_renderer = BackgroundRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            sample_count,
            &camera_bind_group_layout,
            &camera_buffer,
        );
        let mesh_renderer = MeshRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            sample_count,
            &camera_bind_group_layout,
            &camera_buffer,
        );
        let line_renderer = LineRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            sample_count,
            &camera_bind_group_layout,
            &camera_buffer,
        );

        // Initialize lighting system (needs mesh_renderer for bind group layout)
        let lighting_system = LightingSystem::new(
            device,
            &mesh_renderer,
            config.shadows,
            config.shadow_filter,
            config.shadow_map_size,
        );

        Self {
            camera_buffer,
            lighting_system,
            meshes: MeshManager::new(),
            textures: TextureManager::new(device, queue),
            ground: None,
            primary: None,
            depth_texture,
            depth_view,
            msaa_texture,
            msaa_view,
            background_renderer,
            mesh_renderer,
            line_renderer,
            clear_color: clear_color(Color::rgb(0.0, 0.0, 0.0), format),
            format,
            sample_count,
            width,
            height,
        }
    }

    /// Resizes the renderer's textures for a new viewport size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;

        let (depth_texture, depth_view) =
            gpu_resources::create_depth_texture(device, width, height, self.sample_count);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;

        // Recreate MSAA texture
        let (msaa_texture, msaa_view) = gpu_resources::create_msaa_texture(
            device,
            self.format,
            width,
            height,
            self.sample_count,
        )
        .unzip();
        self.msaa_texture = msaa_texture;
        self.msaa_view = msaa_view;
    }

    /// Upload everything `scene` needs to be drawn from `camera`.
    ///
    /// Assets that are still loading are skipped: their maps are left
    /// unbound and a textured background shows the clear color.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        camera: &PerspectiveCamera,
        assets: &AssetCache,
    ) {
        let camera_uniform = CameraUniform::new(camera, self.format);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));

        self.lighting_system.update(queue, scene.light());

        // Background
        let background = scene.displayed_background();
        self.clear_color = match background {
            Background::Color(color) => clear_color(*color, self.format),
            Background::Texture(_) | Background::CubeMap(_) => {
                clear_color(Color::rgb(0.0, 0.0, 0.0), self.format)
            }
        };
        self.background_renderer
            .prepare(device, queue, &mut self.textures, assets, background);

        // Ground
        match scene.ground() {
            Some(ground) => {
                let material = ground.material();
                let item = DrawItem {
                    geometry: &ground.geometry,
                    material: &material,
                    model: ground.transform.matrix(),
                    cast_shadow: false,
                    receive_shadow: ground.receive_shadow,
                };
                self.prepare_object(device, queue, assets, &item, ObjectSlot::Ground);
            }
            None => self.ground = None,
        }

        // Primary object
        match scene.primary() {
            Some(primary) => {
                let item = DrawItem {
                    geometry: &primary.geometry,
                    material: &primary.material,
                    model: primary.transform.matrix(),
                    cast_shadow: primary.cast_shadow,
                    receive_shadow: primary.receive_shadow,
                };
                self.prepare_object(device, queue, assets, &item, ObjectSlot::Primary);
            }
            None => self.primary = None,
        }
        self.meshes.end_frame();

        // Release textures the scene no longer references
        let referenced = referenced_assets(scene);
        self.textures.retain(|key| referenced.contains(key));

        // Line overlays
        let mut helpers = LineSegments::new();
        if let Some(size) = scene.axes() {
            helpers.extend(LineSegments::axes(size));
        }
        if let (Some(kind), Some(light)) = (scene.helper(), scene.light()) {
            helpers.extend(LineSegments::light_helper(kind, light));
        }
        let gizmo = &scene.gizmo;
        let overlay = match gizmo.target() {
            Some(_) => LineSegments::gizmo(
                gizmo.mode(),
                gizmo.highlighted_axis(),
                gizmo.position(),
                gizmo.world_scale(camera),
            ),
            None => LineSegments::new(),
        };
        self.line_renderer.prepare(device, queue, &helpers, &overlay);
    }

    fn prepare_object(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets: &AssetCache,
        item: &DrawItem<'_>,
        slot: ObjectSlot,
    ) {
        self.meshes.prepare(device, item.geometry);
        let binding =
            MeshRenderer::prepare_maps(device, queue, &mut self.textures, assets, item.material);
        let entry = match slot {
            ObjectSlot::Ground => &mut self.ground,
            ObjectSlot::Primary => &mut self.primary,
        };
        self.mesh_renderer
            .prepare_object(device, queue, &self.textures, entry, item, binding);
    }

    /// Record the shadow and main passes into `encoder`, drawing into `view`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let objects: Vec<&ObjectEntry> = [&self.ground, &self.primary]
            .into_iter()
            .flatten()
            .collect();

        render_shadow_pass(
            encoder,
            &ShadowPassParams {
                lighting: &self.lighting_system,
                meshes: &self.meshes,
                objects: &objects,
                mesh_renderer: &self.mesh_renderer,
            },
        );

        render_main_pass(
            encoder,
            view,
            &MainPassParams {
                lighting: &self.lighting_system,
                meshes: &self.meshes,
                objects: &objects,
                background_renderer: &self.background_renderer,
                mesh_renderer: &self.mesh_renderer,
                line_renderer: &self.line_renderer,
                depth_view: &self.depth_view,
                msaa_view: self.msaa_view.as_ref(),
                clear_color: self.clear_color,
            },
        );
    }

    /// Returns the texture format used by the renderer.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Number of resident geometries.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of resident textures and cube maps.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

#[derive(Clone, Copy)]
enum ObjectSlot {
    Ground,
    Primary,
}

/// Every asset the scene currently draws with
fn referenced_assets(scene: &Scene) -> Vec<AssetKey> {
    let mut keys: Vec<AssetKey> = Vec::new();
    if let Some(primary) = scene.primary() {
        keys.extend(primary.material.asset_keys().cloned());
    }
    if let Some(map) = scene.ground().and_then(|g| g.map.as_ref()) {
        keys.push(map.clone());
    }
    if let Some(key) = scene.displayed_background().asset() {
        keys.push(key.clone());
    }
    keys
}
