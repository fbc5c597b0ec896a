//! UI panels

mod settings;
mod viewport;

pub use settings::SettingsPanel;
pub use viewport::ViewportPanel;

use crate::state::{SharedAppState, SharedViewportState};

/// Panel trait for the side and central panels
pub trait Panel {
    /// Panel name for headings
    fn name(&self) -> &str;

    /// Draw the panel UI
    fn ui(&mut self, ui: &mut egui::Ui, app_state: &SharedAppState);

    /// Draw with render context (for 3D viewport)
    fn ui_with_render_context(
        &mut self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        render_state: &egui_wgpu::RenderState,
        viewport_state: &SharedViewportState,
    ) {
        // Default: just call ui()
        let _ = (render_state, viewport_state);
        self.ui(ui, app_state);
    }

    /// Whether this panel needs render context
    fn needs_render_context(&self) -> bool {
        false
    }
}
