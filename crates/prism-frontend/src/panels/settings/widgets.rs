//! Settings widgets
//!
//! Each helper draws one control and returns the new value only when the
//! user committed a change, so a panel pass produces one change per edit.

use std::ops::RangeInclusive;

use glam::Vec3;

use prism_core::Color;

/// Enumerated choice
pub fn choice<T: Copy + PartialEq>(
    ui: &mut egui::Ui,
    label: &str,
    current: T,
    all: &[T],
    name: impl Fn(&T) -> &'static str,
) -> Option<T> {
    let mut picked = None;
    egui::ComboBox::from_label(label)
        .selected_text(name(&current))
        .show_ui(ui, |ui| {
            for value in all {
                if ui.selectable_label(*value == current, name(value)).clicked()
                    && *value != current
                {
                    picked = Some(*value);
                }
            }
        });
    picked
}

/// Numeric range
pub fn slider(
    ui: &mut egui::Ui,
    label: &str,
    value: f32,
    range: RangeInclusive<f32>,
) -> Option<f32> {
    let mut edited = value;
    let response = ui.add(egui::Slider::new(&mut edited, range).text(label));
    (response.changed() && edited != value).then_some(edited)
}

/// Boolean toggle
pub fn toggle(ui: &mut egui::Ui, label: &str, value: bool) -> Option<bool> {
    let mut edited = value;
    ui.checkbox(&mut edited, label)
        .changed()
        .then_some(edited)
}

/// Color picker
pub fn color(ui: &mut egui::Ui, label: &str, value: Color) -> Option<Color> {
    let mut rgb = value.to_srgb8();
    let changed = ui
        .horizontal(|ui| {
            let changed = ui.color_edit_button_srgb(&mut rgb).changed();
            ui.label(label);
            changed
        })
        .inner;
    (changed && rgb != value.to_srgb8()).then(|| Color::from_srgb8(rgb))
}

/// Three sliders sharing one range
pub fn vec3(
    ui: &mut egui::Ui,
    label: &str,
    value: Vec3,
    range: RangeInclusive<f32>,
) -> Option<Vec3> {
    let mut edited = value;
    ui.label(label);
    ui.indent(label, |ui| {
        for (axis, component) in ["x", "y", "z"].into_iter().zip(edited.as_mut()) {
            ui.add(egui::Slider::new(component, range.clone()).text(axis));
        }
    });
    (edited != value).then_some(edited)
}

/// Action button
pub fn button(ui: &mut egui::Ui, label: &str) -> bool {
    ui.button(label).clicked()
}
