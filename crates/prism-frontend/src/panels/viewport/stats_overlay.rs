//! Frame rate overlay for the 3D viewport

use prism_core::FrameStats;

/// GPU resources held by the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResidentCounts {
    pub meshes: usize,
    pub textures: usize,
}

impl ResidentCounts {
    fn summary(&self) -> String {
        format!("{} meshes, {} textures", self.meshes, self.textures)
    }
}

/// Render the frame counter in the top-left corner
pub fn render_stats(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    stats: &FrameStats,
    resident: ResidentCounts,
) {
    let margin = 10.0;

    egui::Area::new(egui::Id::new("viewport_stats"))
        .fixed_pos(rect.left_top() + egui::vec2(margin, margin))
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style())
                .fill(egui::Color32::from_rgba_unmultiplied(30, 30, 30, 200))
                .corner_radius(4.0)
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(60)))
                .inner_margin(6.0)
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0} FPS", stats.fps()))
                            .monospace()
                            .color(egui::Color32::from_rgb(0, 255, 128)),
                    );
                    ui.label(
                        egui::RichText::new(format!(
                            "{:.1} ms (max {:.1})",
                            stats.frame_time_ms(),
                            stats.max_frame_time_ms()
                        ))
                        .monospace()
                        .small()
                        .color(egui::Color32::from_gray(180)),
                    );
                    ui.label(
                        egui::RichText::new(resident.summary())
                            .monospace()
                            .small()
                            .color(egui::Color32::from_gray(140)),
                    );
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resident_summary() {
        let resident = ResidentCounts {
            meshes: 2,
            textures: 5,
        };
        assert_eq!(resident.summary(), "2 meshes, 5 textures");
    }
}
