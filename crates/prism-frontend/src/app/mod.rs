//! Main application module
//!
//! One [`eframe::App::update`] call is one frame: queued commits are applied,
//! the primary object is animated, finished loads are taken in, the orbit
//! controls settle and the viewport renders.

use std::sync::Arc;

use parking_lot::Mutex;

use prism_core::{AppConfig, CompletedLoad};

use crate::loader::Loader;
use crate::panels::{Panel, SettingsPanel, ViewportPanel};
use crate::state::{
    AppAction, AppState, SharedAppState, SharedViewportState, ViewportState, create_shared_state,
};

/// Main application
pub struct PrismApp {
    app_state: SharedAppState,
    viewport_state: Option<SharedViewportState>,
    loader: Loader,
    settings_panel: SettingsPanel,
    viewport_panel: ViewportPanel,
}

impl PrismApp {
    /// Create a new app
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        // Create viewport state if WGPU is available
        let viewport_state = cc.wgpu_render_state.as_ref().map(|render_state| {
            let device = Arc::new(render_state.device.clone());
            let queue = Arc::new(render_state.queue.clone());
            let format = render_state.target_format;

            Arc::new(Mutex::new(ViewportState::new(
                device,
                queue,
                format,
                &config.renderer,
            )))
        });
        if viewport_state.is_none() {
            tracing::warn!("No wgpu render state, the viewport is disabled");
        }

        let app_state = create_shared_state(&config);
        let loader = Loader::new(app_state.lock().session.catalog().clone());

        let initial = app_state.lock().session.initial_loads();
        tracing::info!("Starting {} initial asset loads", initial.len());
        for load in initial {
            loader.start(load);
        }

        Self {
            app_state,
            viewport_state,
            loader,
            settings_panel: SettingsPanel::new(),
            viewport_panel: ViewportPanel::new(),
        }
    }

    /// Process pending actions
    fn process_actions(&mut self) {
        let actions = self.app_state.lock().take_pending_actions();
        for action in actions {
            match action {
                AppAction::Commit(change) => {
                    // The lock is released before loads start: a file dialog may block
                    let loads = self.app_state.lock().session.commit(change);
                    for load in loads {
                        self.loader.start(load);
                    }
                }
                AppAction::SetStatsVisible(visible) => {
                    let mut state = self.app_state.lock();
                    state.show_stats = visible;
                    if visible {
                        state.stats.reset();
                    }
                }
            }
        }
    }

    /// Advance the scene to `now` (seconds since start)
    fn step(&mut self, now: f64) {
        let completed = self.loader.drain();
        let mut state = self.app_state.lock();
        step_state(&mut state, now, completed);
    }
}

/// Frame step on the locked state
fn step_state(state: &mut AppState, now: f64, completed: Vec<CompletedLoad>) {
    state.session.tick(now);
    for load in completed {
        state.session.finish_load(load);
    }
    state.stats.record(now);
    state.session.update_camera();
}

impl eframe::App for PrismApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.process_actions();
        self.step(ctx.input(|i| i.time));

        egui::SidePanel::left("settings_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.settings_panel.ui(ui, &self.app_state);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let render_state = frame.wgpu_render_state();
                match (render_state, &self.viewport_state) {
                    (Some(render_state), Some(viewport_state))
                        if self.viewport_panel.needs_render_context() =>
                    {
                        self.viewport_panel.ui_with_render_context(
                            ui,
                            &self.app_state,
                            render_state,
                            viewport_state,
                        );
                    }
                    _ => self.viewport_panel.ui(ui, &self.app_state),
                }
            });

        // The frame loop runs continuously
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use prism_core::{ImageData, LoadPayload, SettingChange, TextureChoice, TranslateAnimation};

    use super::*;

    #[test]
    fn test_step_animates_and_counts_frames() {
        let mut state = AppState::new(&AppConfig::default());
        state
            .session
            .commit(SettingChange::TranslateAnimation(TranslateAnimation::UpDown));

        step_state(&mut state, 0.5, Vec::new());
        step_state(&mut state, 1.0, Vec::new());

        let position = state.session.scene().primary().unwrap().transform.position;
        assert_eq!(position.y, 1.0_f64.sin() as f32);
        assert!(state.stats.fps() > 0.0);
    }

    #[test]
    fn test_step_takes_in_finished_loads() {
        let mut state = AppState::new(&AppConfig::default());
        let key = state.session.catalog().shells();
        let loads = state
            .session
            .commit(SettingChange::Texture(TextureChoice::Blending));
        assert_eq!(loads.len(), 1);

        let image = ImageData::from_rgba(1, 1, vec![255; 4]).unwrap();
        step_state(
            &mut state,
            0.0,
            vec![CompletedLoad {
                ticket: None,
                payload: LoadPayload::Image {
                    key: key.clone(),
                    result: Ok(image),
                },
            }],
        );
        assert!(state.session.cache().is_ready(&key));
    }
}
