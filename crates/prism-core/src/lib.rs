//! Prism core library
//!
//! GPU-free half of the Prism demo: the settings record, the scene model,
//! the reconciliation handlers that turn a settings change into scene edits,
//! the frame-loop motion laws, camera/orbit/gizmo math, procedural geometry,
//! and the asset bookkeeping shared with the frontend.

pub mod animation;
pub mod assets;
pub mod camera;
pub mod color;
pub mod config;
pub mod constants;
pub mod geometry;
pub mod gizmo;
pub mod light;
pub mod lines;
pub mod material;
pub mod model;
pub mod reconcile;
pub mod scene;
pub mod session;
pub mod settings;
pub mod stats;

pub use animation::animate;
pub use assets::{
    AssetCache, AssetCatalog, AssetError, AssetKey, AssetState, CompletedLoad, CubeMapData,
    ImageData, IssuedLoad, LoadJob, LoadPayload, LoadRequest, LoadSlot, LoadTicket, LoadTracker,
};
pub use camera::{OrbitControls, PerspectiveCamera};
pub use color::Color;
pub use config::{
    AppConfig, AssetConfig, ConfigError, RendererConfig, ShadowFilter, WindowConfig,
};
pub use geometry::{FontError, Geometry, GeometryId, Typeface};
pub use gizmo::{GizmoAxis, GizmoEvent, GizmoMode, TransformGizmo};
pub use light::{HelperKind, Light, ShadowParams};
pub use lines::{LineSegments, LineVertex};
pub use material::{Blending, DrawMode, Material, Shading, TextureMaps};
pub use model::ModelError;
pub use reconcile::{Reconciliation, reconcile};
pub use scene::{
    Background, Drawable, Ground, LightHelper, Node, NodeId, NodeKind, Scene, SceneEdit, Transform,
};
pub use session::Session;
pub use settings::{
    AffineMode, BackgroundChoice, LightSource, MaterialKind, ModelChoice, PlaneTexture,
    RotateAnimation, SettingChange, Settings, Shape, TextureChoice, TranslateAnimation,
};
pub use stats::FrameStats;
