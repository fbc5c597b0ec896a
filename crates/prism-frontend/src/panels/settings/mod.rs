//! Settings panel
//!
//! Draws one group per settings section. Widgets work on a snapshot of the
//! settings record; every committed edit is queued as an
//! [`AppAction::Commit`] and reaches the session on the next frame.

mod widgets;

use prism_core::settings::{
    ANGLE_RANGE, AffineSettings, AnimationSettings, FAR_RANGE, FOV_RANGE, GeometrySettings,
    INTENSITY_RANGE, LightSettings, NEAR_RANGE, POSITION_RANGE, PerspectiveSettings,
    SCALE_RANGE, SceneSettings,
};
use prism_core::{
    AffineMode, BackgroundChoice, LightSource, MaterialKind, ModelChoice, PlaneTexture,
    RotateAnimation, SettingChange, Shape, TextureChoice, TranslateAnimation,
};

use crate::panels::Panel;
use crate::state::{AppAction, SharedAppState};

/// Side panel holding every settings widget
#[derive(Default)]
pub struct SettingsPanel;

impl SettingsPanel {
    pub fn new() -> Self {
        Self
    }
}

impl Panel for SettingsPanel {
    fn name(&self) -> &str {
        "Settings"
    }

    fn ui(&mut self, ui: &mut egui::Ui, app_state: &SharedAppState) {
        let (settings, show_stats) = {
            let state = app_state.lock();
            (state.session.settings().clone(), state.show_stats)
        };

        ui.heading(self.name());
        ui.separator();

        let mut changes = Vec::new();
        section(ui, "Scene", |ui| scene_section(ui, &settings.scene, &mut changes));
        section(ui, "Geometry", |ui| {
            geometry_section(ui, &settings.geometry, &mut changes)
        });
        section(ui, "Affine", |ui| affine_section(ui, &settings.affine, &mut changes));
        section(ui, "Light", |ui| light_section(ui, &settings.light, &mut changes));
        section(ui, "Perspective", |ui| {
            perspective_section(ui, &settings.perspective, &mut changes)
        });
        section(ui, "Animation", |ui| {
            animation_section(ui, &settings.animation, &mut changes)
        });

        ui.separator();
        let stats_toggle = widgets::toggle(ui, "Show FPS", show_stats);

        if changes.is_empty() && stats_toggle.is_none() {
            return;
        }
        let mut state = app_state.lock();
        for change in changes {
            state.commit(change);
        }
        if let Some(visible) = stats_toggle {
            state.queue_action(AppAction::SetStatsVisible(visible));
        }
    }
}

fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::CollapsingHeader::new(title)
        .default_open(true)
        .show(ui, add_contents);
}

fn scene_section(ui: &mut egui::Ui, scene: &SceneSettings, changes: &mut Vec<SettingChange>) {
    changes.extend(widgets::toggle(ui, "Show axes", scene.show_axes).map(SettingChange::ShowAxes));
    changes.extend(
        widgets::choice(
            ui,
            "Background",
            scene.background,
            &BackgroundChoice::ALL,
            BackgroundChoice::label,
        )
        .map(SettingChange::Background),
    );
    changes.extend(
        widgets::color(ui, "Background color", scene.color).map(SettingChange::BackgroundColor),
    );
    changes.extend(
        widgets::color(ui, "Plane color", scene.plane_color).map(SettingChange::PlaneColor),
    );
    changes.extend(
        widgets::choice(
            ui,
            "Plane texture",
            scene.plane_texture,
            &PlaneTexture::ALL,
            PlaneTexture::label,
        )
        .map(SettingChange::PlaneTexture),
    );
}

fn geometry_section(
    ui: &mut egui::Ui,
    geometry: &GeometrySettings,
    changes: &mut Vec<SettingChange>,
) {
    changes.extend(widgets::slider(ui, "Scale", geometry.scale, SCALE_RANGE).map(SettingChange::Scale));
    changes.extend(
        widgets::choice(ui, "Shape", geometry.shape, &Shape::ALL, Shape::label)
            .map(SettingChange::Shape),
    );
    changes.extend(
        widgets::choice(
            ui,
            "Material",
            geometry.material,
            &MaterialKind::ALL,
            MaterialKind::label,
        )
        .map(SettingChange::Material),
    );
    changes.extend(
        widgets::choice(
            ui,
            "Texture",
            geometry.texture,
            &TextureChoice::ALL,
            TextureChoice::label,
        )
        .map(SettingChange::Texture),
    );
    changes.extend(
        widgets::choice(ui, "Model", geometry.model, &ModelChoice::ALL, ModelChoice::label)
            .map(SettingChange::Model),
    );
    changes.extend(widgets::color(ui, "Color", geometry.color).map(SettingChange::ObjectColor));
}

fn affine_section(ui: &mut egui::Ui, affine: &AffineSettings, changes: &mut Vec<SettingChange>) {
    changes.extend(
        widgets::choice(ui, "Mode", affine.mode, &AffineMode::ALL, AffineMode::label)
            .map(SettingChange::AffineMode),
    );
    if widgets::button(ui, "Reset") {
        changes.push(SettingChange::ResetTransform);
    }
}

fn light_section(ui: &mut egui::Ui, light: &LightSettings, changes: &mut Vec<SettingChange>) {
    changes.extend(
        widgets::choice(ui, "Source", light.source, &LightSource::ALL, LightSource::label)
            .map(SettingChange::LightSource),
    );
    changes.extend(
        widgets::toggle(ui, "Show helper", light.show_helper).map(SettingChange::ShowHelper),
    );
    changes.extend(widgets::toggle(ui, "Enabled", light.enabled).map(SettingChange::LightEnabled));
    changes.extend(widgets::toggle(ui, "Shadow", light.shadow).map(SettingChange::LightShadow));
    changes.extend(
        widgets::slider(ui, "Intensity", light.intensity, INTENSITY_RANGE)
            .map(SettingChange::LightIntensity),
    );
    changes.extend(widgets::color(ui, "Color", light.color).map(SettingChange::LightColor));
    changes.extend(
        widgets::vec3(ui, "Position", light.position, POSITION_RANGE)
            .map(SettingChange::LightPosition),
    );
    if light.source == LightSource::Spot {
        changes.extend(
            widgets::slider(ui, "Angle", light.angle, ANGLE_RANGE).map(SettingChange::LightAngle),
        );
    }
}

fn perspective_section(
    ui: &mut egui::Ui,
    perspective: &PerspectiveSettings,
    changes: &mut Vec<SettingChange>,
) {
    changes.extend(widgets::slider(ui, "FOV", perspective.fov, FOV_RANGE).map(SettingChange::Fov));
    changes.extend(
        widgets::slider(ui, "Near", perspective.near, NEAR_RANGE).map(SettingChange::Near),
    );
    changes.extend(widgets::slider(ui, "Far", perspective.far, FAR_RANGE).map(SettingChange::Far));
    changes.extend(
        widgets::vec3(ui, "Position", perspective.position, POSITION_RANGE)
            .map(SettingChange::CameraPosition),
    );
    changes.extend(
        widgets::vec3(ui, "Look at", perspective.look, POSITION_RANGE)
            .map(SettingChange::CameraLook),
    );
}

fn animation_section(
    ui: &mut egui::Ui,
    animation: &AnimationSettings,
    changes: &mut Vec<SettingChange>,
) {
    changes.extend(
        widgets::choice(
            ui,
            "Translate",
            animation.translate,
            &TranslateAnimation::ALL,
            TranslateAnimation::label,
        )
        .map(SettingChange::TranslateAnimation),
    );
    changes.extend(
        widgets::choice(
            ui,
            "Rotate",
            animation.rotate,
            &RotateAnimation::ALL,
            RotateAnimation::label,
        )
        .map(SettingChange::RotateAnimation),
    );
    changes.extend(
        widgets::toggle(ui, "Pulse scale", animation.pulse_scale).map(SettingChange::PulseScale),
    );
    changes.extend(
        widgets::toggle(ui, "Cycle color", animation.cycle_color).map(SettingChange::CycleColor),
    );
}

#[cfg(test)]
mod tests {
    use prism_core::AppConfig;

    use super::*;
    use crate::state::create_shared_state;

    #[test]
    fn test_idle_pass_queues_nothing() {
        let app_state = create_shared_state(&AppConfig::default());
        let mut panel = SettingsPanel::new();

        let ctx = egui::Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| panel.ui(ui, &app_state));
            });
        }

        assert!(app_state.lock().take_pending_actions().is_empty());
    }
}
