//! Prism frontend
//!
//! eframe application around the Prism scene: a settings side panel, a 3D
//! viewport rendered to a texture by `prism-renderer`, and background asset
//! loading.

pub mod app;
pub mod loader;
pub mod panels;
pub mod state;

pub use app::PrismApp;
pub use loader::Loader;
pub use state::{
    AppAction, AppState, SharedAppState, SharedViewportState, ViewportState, create_shared_state,
};
