//! Line overlays: axes, light helper and transform gizmo

use std::ops::Range;

use prism_core::LineSegments;

use crate::constants::lines::INITIAL_CAPACITY;
use crate::pipeline::{PipelineConfig, create_camera_bind_group};
use crate::vertex::{LineVertex, line_vertices};

/// Line list renderer
///
/// All segments of a frame share one vertex buffer. Scene helpers are depth
/// tested; the gizmo is drawn last and on top of everything.
pub struct LineRenderer {
    scene_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    capacity: usize,
    scene_range: Range<u32>,
    overlay_range: Range<u32>,
}

impl LineRenderer {
    /// Creates a new line renderer
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/lines.wgsl").into()),
        });

        let layouts = [camera_bind_group_layout];
        let scene_pipeline =
            PipelineConfig::new("Scene Lines", &shader, format, depth_format, &layouts)
                .with_vertex_layouts(vec![LineVertex::layout()])
                .with_topology(wgpu::PrimitiveTopology::LineList)
                .with_sample_count(sample_count)
                .build(device);
        let overlay_pipeline =
            PipelineConfig::new("Overlay Lines", &shader, format, depth_format, &layouts)
                .with_vertex_layouts(vec![LineVertex::layout()])
                .with_topology(wgpu::PrimitiveTopology::LineList)
                .with_depth(false, wgpu::CompareFunction::Always)
                .with_sample_count(sample_count)
                .build(device);

        let bind_group =
            create_camera_bind_group(device, camera_bind_group_layout, camera_buffer, "Line");

        Self {
            scene_pipeline,
            overlay_pipeline,
            bind_group,
            vertex_buffer: create_vertex_buffer(device, INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            scene_range: 0..0,
            overlay_range: 0..0,
        }
    }

    /// Upload this frame's segments
    ///
    /// The buffer doubles until it fits; it never shrinks.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &LineSegments,
        overlay: &LineSegments,
    ) {
        let vertices: Vec<LineVertex> = line_vertices(scene).chain(line_vertices(overlay)).collect();
        let scene_count = scene.vertices.len() as u32;
        self.scene_range = 0..scene_count;
        self.overlay_range = scene_count..vertices.len() as u32;

        if vertices.is_empty() {
            return;
        }
        if vertices.len() > self.capacity {
            let mut capacity = self.capacity.max(1);
            while capacity < vertices.len() {
                capacity *= 2;
            }
            tracing::debug!("Growing line buffer to {capacity} vertices");
            self.vertex_buffer = create_vertex_buffer(device, capacity);
            self.capacity = capacity;
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
    }

    /// Draw the depth-tested helpers
    pub fn render_scene<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        self.draw(render_pass, &self.scene_pipeline, self.scene_range.clone());
    }

    /// Draw the always-on-top overlay
    pub fn render_overlay<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        self.draw(render_pass, &self.overlay_pipeline, self.overlay_range.clone());
    }

    fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        pipeline: &'a wgpu::RenderPipeline,
        range: Range<u32>,
    ) {
        if range.is_empty() {
            return;
        }
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(range, 0..1);
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Line Vertex Buffer"),
        size: (capacity * std::mem::size_of::<LineVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
