//! Shadow and main pass recording

use crate::resources::MeshManager;
use crate::sub_renderers::{BackgroundRenderer, LineRenderer, MeshRenderer, ObjectEntry};

use super::LightingSystem;

/// Shadow pass parameters.
pub struct ShadowPassParams<'a> {
    /// Lighting system.
    pub lighting: &'a LightingSystem,
    /// Resident geometry.
    pub meshes: &'a MeshManager,
    /// Objects of the frame, in draw order.
    pub objects: &'a [&'a ObjectEntry],
    /// Mesh renderer.
    pub mesh_renderer: &'a MeshRenderer,
}

/// Execute the shadow pass.
///
/// Skipped when the light casts no shadow or no object does.
pub fn render_shadow_pass(encoder: &mut wgpu::CommandEncoder, params: &ShadowPassParams<'_>) {
    if !params.lighting.casts_shadows() {
        return;
    }
    let casters: Vec<_> = params
        .objects
        .iter()
        .filter(|entry| entry.cast_shadow)
        .filter_map(|entry| Some((*entry, params.meshes.get(entry.geometry)?)))
        .collect();

    // The pass still runs without casters so the map is cleared to "lit"
    let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Shadow Pass"),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: params.lighting.shadow_view(),
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let size = params.lighting.shadow_map_size() as f32;
    shadow_pass.set_viewport(0.0, 0.0, size, size, 0.0, 1.0);

    for (entry, mesh) in casters {
        params.mesh_renderer.render_shadow(
            &mut shadow_pass,
            mesh,
            entry,
            params.lighting.shadow_light_bind_group(),
        );
    }
}

/// Main pass parameters.
pub struct MainPassParams<'a> {
    /// Lighting system.
    pub lighting: &'a LightingSystem,
    /// Resident geometry.
    pub meshes: &'a MeshManager,
    /// Objects of the frame, in draw order.
    pub objects: &'a [&'a ObjectEntry],
    /// Background renderer.
    pub background_renderer: &'a BackgroundRenderer,
    /// Mesh renderer.
    pub mesh_renderer: &'a MeshRenderer,
    /// Line renderer.
    pub line_renderer: &'a LineRenderer,
    /// Depth view.
    pub depth_view: &'a wgpu::TextureView,
    /// MSAA view (if MSAA is enabled).
    pub msaa_view: Option<&'a wgpu::TextureView>,
    /// Clear color.
    pub clear_color: wgpu::Color,
}

/// Execute the main render pass.
pub fn render_main_pass(
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    params: &MainPassParams<'_>,
) {
    let ops = wgpu::Operations {
        load: wgpu::LoadOp::Clear(params.clear_color),
        store: wgpu::StoreOp::Store,
    };
    let color_attachment = if let Some(msaa_view) = params.msaa_view {
        // Resolve the multisampled target into the output view
        wgpu::RenderPassColorAttachment {
            view: msaa_view,
            resolve_target: Some(view),
            ops,
        }
    } else {
        wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops,
        }
    };

    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Main Render Pass"),
        color_attachments: &[Some(color_attachment)],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: params.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    params.background_renderer.render(&mut render_pass);

    for &entry in params.objects {
        if let Some(mesh) = params.meshes.get(entry.geometry) {
            params.mesh_renderer.render(
                &mut render_pass,
                mesh,
                entry,
                params.lighting.light_bind_group(),
            );
        }
    }

    // Axes and light helper, then the gizmo on top
    params.line_renderer.render_scene(&mut render_pass);
    params.line_renderer.render_overlay(&mut render_pass);
}
