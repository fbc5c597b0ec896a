//! 3D Viewport panel

mod stats_overlay;

use glam::Vec2;

use prism_core::{AffineMode, Session, SettingChange};

use crate::panels::Panel;
use crate::state::{SharedAppState, SharedViewportState};

use stats_overlay::{ResidentCounts, render_stats};

/// Scroll distance in points that counts as one wheel step
const WHEEL_STEP: f32 = 50.0;
/// Middle-drag distance in points that counts as one dolly step
const DOLLY_STEP: f32 = 10.0;

/// 3D viewport panel
#[derive(Default)]
pub struct ViewportPanel {
    /// Whether the current primary-button drag started on a gizmo handle
    dragging_gizmo: bool,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route pointer and keyboard input to the gizmo or the orbit controls
    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        session: &mut Session,
    ) -> Option<SettingChange> {
        let size = Vec2::new(response.rect.width(), response.rect.height());
        let pointer = response
            .hover_pos()
            .or(response.interact_pointer_pos())
            .map(|p| p - response.rect.min)
            .map(|p| Vec2::new(p.x, p.y));

        // Gizmo (left mouse button)
        if let Some(pointer) = pointer {
            let (origin, dir) = session.scene().camera.screen_to_ray(pointer, size);
            session.hover_gizmo(origin, dir);

            if response.drag_started_by(egui::PointerButton::Primary) {
                self.dragging_gizmo = session.begin_gizmo_drag(origin, dir);
            }
            if self.dragging_gizmo
                && response.dragged_by(egui::PointerButton::Primary)
                && session.drag_gizmo(origin, dir)
            {
                ui.ctx().request_repaint();
            }
        }
        if self.dragging_gizmo && !response.dragged_by(egui::PointerButton::Primary) {
            session.end_gizmo_drag();
            self.dragging_gizmo = false;
        }

        // Orbit: left rotates, right pans, middle dollies
        if !self.dragging_gizmo {
            let delta = response.drag_delta();
            let delta = Vec2::new(delta.x, delta.y);
            if response.dragged_by(egui::PointerButton::Primary) {
                session.orbit.rotate(delta, size.y);
            } else if response.dragged_by(egui::PointerButton::Secondary) {
                let camera = session.scene().camera.clone();
                session.orbit.pan(delta, size.y, &camera);
            } else if response.dragged_by(egui::PointerButton::Middle) {
                session.orbit.zoom(-delta.y / DOLLY_STEP);
            }
        }

        if !response.hovered() {
            return None;
        }

        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            session.orbit.zoom(scroll / WHEEL_STEP);
        }

        // Gizmo mode keyboard shortcuts
        let current = session.settings().affine.mode;
        let mode = ui.input(|i| {
            if i.key_pressed(egui::Key::T) {
                Some(AffineMode::Translate)
            } else if i.key_pressed(egui::Key::R) {
                Some(AffineMode::Rotate)
            } else if i.key_pressed(egui::Key::S) {
                Some(AffineMode::Scale)
            } else if i.key_pressed(egui::Key::Escape) {
                Some(AffineMode::None)
            } else {
                None
            }
        });
        mode.filter(|&mode| mode != current).map(SettingChange::AffineMode)
    }
}

impl Panel for ViewportPanel {
    fn name(&self) -> &str {
        "3D Viewport"
    }

    fn needs_render_context(&self) -> bool {
        true
    }

    fn ui(&mut self, ui: &mut egui::Ui, _app_state: &SharedAppState) {
        // Fallback when no render context
        let available_size = ui.available_size();
        let (response, painter) =
            ui.allocate_painter(available_size, egui::Sense::click_and_drag());

        painter.rect_filled(response.rect, 0.0, egui::Color32::from_rgb(30, 30, 30));
        painter.text(
            response.rect.center(),
            egui::Align2::CENTER_CENTER,
            "3D Viewport\n(WebGPU not available)",
            egui::FontId::proportional(16.0),
            egui::Color32::GRAY,
        );
    }

    fn ui_with_render_context(
        &mut self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        render_state: &egui_wgpu::RenderState,
        viewport_state: &SharedViewportState,
    ) {
        let available_size = ui.available_size();
        let width = available_size.x as u32;
        let height = available_size.y as u32;

        if width == 0 || height == 0 {
            return;
        }

        let texture_id = {
            let mut state = viewport_state.lock();
            let mut egui_renderer = render_state.renderer.write();
            state.ensure_texture(width, height, &mut egui_renderer)
        };

        // Display the rendered texture
        let response = ui.add(
            egui::Image::new(egui::load::SizedTexture::new(
                texture_id,
                [available_size.x, available_size.y],
            ))
            .sense(egui::Sense::click_and_drag()),
        );

        let mut app = app_state.lock();
        app.session.set_aspect(available_size.x / available_size.y);
        if let Some(change) = self.handle_input(ui, &response, &mut app.session) {
            app.commit(change);
        }

        // Render after input so the texture shows this frame's state
        let resident = {
            let mut viewport = viewport_state.lock();
            viewport.render(&app.session);
            ResidentCounts {
                meshes: viewport.renderer.mesh_count(),
                textures: viewport.renderer.texture_count(),
            }
        };

        if app.show_stats {
            render_stats(ui, response.rect, &app.stats, resident);
        }
    }
}
