//! Application state module

mod viewport;

pub use viewport::{SharedViewportState, ViewportState};

use std::sync::Arc;

use parking_lot::Mutex;

use prism_core::{AppConfig, FrameStats, Session, SettingChange};

/// Actions queued by the panels and processed once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Commit one widget value
    Commit(SettingChange),
    /// Show or hide the frame rate overlay
    SetStatsVisible(bool),
}

/// Application state
pub struct AppState {
    /// Settings, scene and asset bookkeeping
    pub session: Session,
    /// Frame rate counter
    pub stats: FrameStats,
    /// Whether the frame rate overlay is drawn
    pub show_stats: bool,
    /// Pending actions
    pending_actions: Vec<AppAction>,
}

impl AppState {
    /// Create the state for a fresh session
    pub fn new(config: &AppConfig) -> Self {
        Self {
            session: Session::from_config(config),
            stats: FrameStats::new(),
            show_stats: true,
            pending_actions: Vec::new(),
        }
    }

    /// Queue an action
    pub fn queue_action(&mut self, action: AppAction) {
        self.pending_actions.push(action);
    }

    /// Queue one committed widget value
    pub fn commit(&mut self, change: SettingChange) {
        self.queue_action(AppAction::Commit(change));
    }

    /// Take pending actions
    pub fn take_pending_actions(&mut self) -> Vec<AppAction> {
        std::mem::take(&mut self.pending_actions)
    }
}

pub type SharedAppState = Arc<Mutex<AppState>>;

/// Create a new shared app state
pub fn create_shared_state(config: &AppConfig) -> SharedAppState {
    Arc::new(Mutex::new(AppState::new(config)))
}

#[cfg(test)]
mod tests {
    use prism_core::{MaterialKind, Shape};

    use super::*;

    #[test]
    fn test_actions_drain_in_order() {
        let mut state = AppState::new(&AppConfig::default());
        state.commit(SettingChange::Shape(Shape::Box));
        state.commit(SettingChange::Material(MaterialKind::Lambert));
        state.queue_action(AppAction::SetStatsVisible(false));

        let actions = state.take_pending_actions();
        assert_eq!(
            actions,
            vec![
                AppAction::Commit(SettingChange::Shape(Shape::Box)),
                AppAction::Commit(SettingChange::Material(MaterialKind::Lambert)),
                AppAction::SetStatsVisible(false),
            ]
        );
        assert!(state.take_pending_actions().is_empty());
    }

    #[test]
    fn test_queueing_does_not_touch_settings() {
        let mut state = AppState::new(&AppConfig::default());
        state.commit(SettingChange::Shape(Shape::Teapot));
        assert_eq!(state.session.settings().geometry.shape, Shape::Sphere);
    }
}
