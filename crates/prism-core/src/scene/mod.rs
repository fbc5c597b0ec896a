//! Scene graph model
//!
//! The [`Scene`] owns every node plus the camera and the transform gizmo.
//! It is only ever changed through [`Scene::apply`], one [`SceneEdit`] at a
//! time, which keeps these invariants:
//! - at most one primary object, one light and one light helper
//! - a helper only exists next to a light whose kind defines one
//! - the gizmo targets the live primary object or nothing

mod node;

use std::sync::Arc;

use glam::Vec3;

use crate::assets::{AssetCatalog, AssetKey};
use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::constants::AXES_SIZE;
use crate::geometry::{self, Geometry};
use crate::gizmo::{GizmoEvent, GizmoMode, TransformGizmo};
use crate::light::{HelperKind, Light};
use crate::material::Material;
use crate::settings::{Settings, TextureChoice};

pub use node::{Background, Drawable, Ground, LightHelper, Node, NodeId, NodeKind, Transform};

/// One mutation of the scene
#[derive(Debug, Clone)]
pub enum SceneEdit {
    /// Swap the primary object for a new node in a single step
    ReplacePrimary(Drawable),
    /// New geometry on the existing primary node, moved back to the resting position
    SetPrimaryGeometry(Arc<Geometry>),
    SetPrimaryMaterial(Material),
    SetPrimaryColor(Color),
    SetPrimaryScale(f32),
    ResetPrimaryTransform,
    /// Remembered background
    SetBackground(Background),
    /// Temporary background shown instead of the remembered one
    SetBackgroundOverride(Option<Background>),
    SetGroundColor(Color),
    SetGroundMap(Option<AssetKey>),
    ShowAxes(bool),
    /// Swap the light and its helper
    ReplaceLight { light: Light, show_helper: bool },
    ShowHelper(bool),
    SetLightColor(Color),
    SetLightIntensity(f32),
    SetLightPosition(Vec3),
    SetLightShadow(bool),
    SetLightAngle(f32),
    SetLightEnabled(bool),
    SetFov(f32),
    SetNear(f32),
    SetFar(f32),
    SetCameraPosition(Vec3),
    SetCameraTarget(Vec3),
    /// Set the gizmo mode and attach it to the primary object
    AttachGizmo(GizmoMode),
    DetachGizmo,
}

#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    background: Background,
    background_override: Option<Background>,
    pub camera: PerspectiveCamera,
    pub gizmo: TransformGizmo,
}

impl Scene {
    /// Build the initial scene for `settings`
    pub fn from_settings(settings: &Settings, catalog: &AssetCatalog) -> Self {
        let geometry = geometry::primitive(settings.geometry.shape)
            .unwrap_or_else(|| Geometry::empty("Text"));
        let material = Material::from_settings(&settings.geometry, catalog);
        let mut primary = Drawable::new(Arc::new(geometry), material);
        primary.transform.scale = Vec3::splat(settings.geometry.scale);

        let mut ground = Ground::new(settings.scene.plane_color);
        ground.map = catalog.plane(settings.scene.plane_texture);

        let background = catalog
            .background(settings.scene.background)
            .map_or(Background::Color(settings.scene.color), Background::Texture);

        let mut scene = Self {
            nodes: Vec::new(),
            background,
            background_override: None,
            camera: PerspectiveCamera::from_settings(&settings.perspective, 1.0),
            gizmo: TransformGizmo::new(),
        };

        scene.nodes.push(Node::new(NodeKind::Ground(ground)));
        scene.nodes.push(Node::new(NodeKind::Primary(primary)));
        scene.apply(SceneEdit::ShowAxes(settings.scene.show_axes));
        scene.apply(SceneEdit::ReplaceLight {
            light: Light::from_settings(&settings.light, &settings.scene),
            show_helper: settings.light.show_helper,
        });
        if settings.geometry.texture == TextureChoice::Reflection {
            scene.background_override = Some(Background::CubeMap(catalog.environment()));
        }
        if let Some(mode) = GizmoMode::from_affine(settings.affine.mode) {
            scene.apply(SceneEdit::AttachGizmo(mode));
        }
        scene
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn primary_id(&self) -> Option<NodeId> {
        self.nodes.iter().find_map(|n| match n.kind {
            NodeKind::Primary(_) => Some(n.id),
            _ => None,
        })
    }

    pub fn primary(&self) -> Option<&Drawable> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::Primary(d) => Some(d),
            _ => None,
        })
    }

    pub fn primary_mut(&mut self) -> Option<&mut Drawable> {
        self.nodes.iter_mut().find_map(|n| match &mut n.kind {
            NodeKind::Primary(d) => Some(d),
            _ => None,
        })
    }

    pub fn ground(&self) -> Option<&Ground> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::Ground(g) => Some(g),
            _ => None,
        })
    }

    fn ground_mut(&mut self) -> Option<&mut Ground> {
        self.nodes.iter_mut().find_map(|n| match &mut n.kind {
            NodeKind::Ground(g) => Some(g),
            _ => None,
        })
    }

    pub fn light(&self) -> Option<&Light> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::Light(l) => Some(l),
            _ => None,
        })
    }

    fn light_mut(&mut self) -> Option<&mut Light> {
        self.nodes.iter_mut().find_map(|n| match &mut n.kind {
            NodeKind::Light(l) => Some(l),
            _ => None,
        })
    }

    pub fn helper(&self) -> Option<HelperKind> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::LightHelper(h) => Some(h.kind),
            _ => None,
        })
    }

    /// Axes length, if the axes helper is shown
    pub fn axes(&self) -> Option<f32> {
        self.nodes.iter().find_map(|n| match n.kind {
            NodeKind::Axes { size } => Some(size),
            _ => None,
        })
    }

    pub fn count_primary(&self) -> usize {
        self.count(|k| matches!(k, NodeKind::Primary(_)))
    }

    pub fn count_lights(&self) -> usize {
        self.count(|k| matches!(k, NodeKind::Light(_)))
    }

    pub fn count_helpers(&self) -> usize {
        self.count(|k| matches!(k, NodeKind::LightHelper(_)))
    }

    fn count(&self, predicate: impl Fn(&NodeKind) -> bool) -> usize {
        self.nodes.iter().filter(|n| predicate(&n.kind)).count()
    }

    /// Remembered background
    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn background_override(&self) -> Option<&Background> {
        self.background_override.as_ref()
    }

    /// Background currently drawn
    pub fn displayed_background(&self) -> &Background {
        self.background_override
            .as_ref()
            .unwrap_or(&self.background)
    }

    fn remove_where(&mut self, predicate: impl Fn(&NodeKind) -> bool) {
        self.nodes.retain(|n| !predicate(&n.kind));
    }

    /// Apply one edit
    ///
    /// Returns the gizmo notification caused by the edit, if any.
    pub fn apply(&mut self, edit: SceneEdit) -> Option<GizmoEvent> {
        match edit {
            SceneEdit::ReplacePrimary(drawable) => {
                let old = self.primary_id();
                let transform = drawable.transform;
                let node = Node::new(NodeKind::Primary(drawable));
                let new = node.id;
                match self
                    .nodes
                    .iter_mut()
                    .find(|n| matches!(n.kind, NodeKind::Primary(_)))
                {
                    Some(slot) => *slot = node,
                    None => self.nodes.push(node),
                }
                if old.is_some() && self.gizmo.target() == old {
                    let event = self.gizmo.detach();
                    self.gizmo.attach(new, &transform);
                    return event;
                }
            }
            SceneEdit::SetPrimaryGeometry(geometry) => {
                let moved = self.primary_mut().map(|primary| {
                    primary.geometry = geometry;
                    primary.transform.position = Transform::resting().position;
                    primary.transform
                });
                if let Some(transform) = moved {
                    self.gizmo.update(&transform);
                }
            }
            SceneEdit::SetPrimaryMaterial(material) => {
                if let Some(primary) = self.primary_mut() {
                    primary.material = material;
                }
            }
            SceneEdit::SetPrimaryColor(color) => {
                if let Some(primary) = self.primary_mut() {
                    primary.material.color = color;
                }
            }
            SceneEdit::SetPrimaryScale(scale) => {
                if let Some(primary) = self.primary_mut() {
                    primary.transform.scale = Vec3::splat(scale);
                }
            }
            SceneEdit::ResetPrimaryTransform => {
                if let Some(primary) = self.primary_mut() {
                    primary.transform = Transform::resting();
                }
                self.gizmo.update(&Transform::resting());
            }
            SceneEdit::SetBackground(background) => self.background = background,
            SceneEdit::SetBackgroundOverride(background) => self.background_override = background,
            SceneEdit::SetGroundColor(color) => {
                if let Some(ground) = self.ground_mut() {
                    ground.color = color;
                }
            }
            SceneEdit::SetGroundMap(map) => {
                if let Some(ground) = self.ground_mut() {
                    ground.map = map;
                }
            }
            SceneEdit::ShowAxes(show) => {
                let shown = self.axes().is_some();
                if show && !shown {
                    self.nodes
                        .push(Node::new(NodeKind::Axes { size: AXES_SIZE }));
                } else if !show && shown {
                    self.remove_where(|k| matches!(k, NodeKind::Axes { .. }));
                }
            }
            SceneEdit::ReplaceLight { light, show_helper } => {
                self.remove_where(|k| matches!(k, NodeKind::Light(_) | NodeKind::LightHelper(_)));
                let helper = light.helper();
                self.nodes.push(Node::new(NodeKind::Light(light)));
                if show_helper && let Some(kind) = helper {
                    self.nodes
                        .push(Node::new(NodeKind::LightHelper(LightHelper { kind })));
                }
            }
            SceneEdit::ShowHelper(show) => {
                let kind = self.light().and_then(Light::helper);
                let shown = self.helper().is_some();
                match kind {
                    Some(kind) if show && !shown => {
                        self.nodes
                            .push(Node::new(NodeKind::LightHelper(LightHelper { kind })));
                    }
                    _ if !show && shown => {
                        self.remove_where(|k| matches!(k, NodeKind::LightHelper(_)));
                    }
                    _ => {}
                }
            }
            SceneEdit::SetLightColor(color) => {
                if let Some(light) = self.light_mut() {
                    light.color = color;
                }
            }
            SceneEdit::SetLightIntensity(intensity) => {
                if let Some(light) = self.light_mut() {
                    light.intensity = intensity;
                }
            }
            SceneEdit::SetLightPosition(position) => {
                if let Some(light) = self.light_mut() {
                    light.position = position;
                }
            }
            SceneEdit::SetLightShadow(cast) => {
                if let Some(light) = self.light_mut() {
                    light.cast_shadow = cast;
                }
            }
            SceneEdit::SetLightAngle(angle) => {
                if let Some(light) = self.light_mut() {
                    light.angle = angle;
                }
            }
            SceneEdit::SetLightEnabled(enabled) => {
                if let Some(light) = self.light_mut() {
                    light.enabled = enabled;
                }
            }
            SceneEdit::SetFov(fov) => {
                self.camera.fov = fov;
                self.camera.update_projection_matrix();
            }
            SceneEdit::SetNear(near) => {
                self.camera.near = near;
                self.camera.update_projection_matrix();
            }
            SceneEdit::SetFar(far) => {
                self.camera.far = far;
                self.camera.update_projection_matrix();
            }
            SceneEdit::SetCameraPosition(position) => self.camera.position = position,
            SceneEdit::SetCameraTarget(target) => self.camera.target = target,
            SceneEdit::AttachGizmo(mode) => {
                let event = self.gizmo.detach();
                self.gizmo.set_mode(mode);
                let target = self.primary_id().zip(self.primary().map(|p| p.transform));
                if let Some((id, transform)) = target {
                    self.gizmo.attach(id, &transform);
                }
                return event;
            }
            SceneEdit::DetachGizmo => return self.gizmo.detach(),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{LightSource, MaterialKind};

    fn scene() -> Scene {
        Scene::from_settings(&Settings::default(), &AssetCatalog::default())
    }

    #[test]
    fn test_initial_scene() {
        let scene = scene();
        assert_eq!(scene.count_primary(), 1);
        assert_eq!(scene.count_lights(), 1);
        assert_eq!(scene.count_helpers(), 1);
        assert_eq!(scene.axes(), Some(5.0));
        assert!(scene.ground().is_some());
        assert_eq!(
            scene.displayed_background(),
            &Background::Color(Color::from_hex(0x828282))
        );
        assert!(scene.gizmo.target().is_none());
        assert_eq!(scene.primary().unwrap().transform, Transform::resting());
    }

    #[test]
    fn test_replace_primary_keeps_single_node() {
        let mut scene = scene();
        let old = scene.primary_id().unwrap();
        let geometry = scene.primary().unwrap().geometry.clone();
        let material = Material::for_kind(MaterialKind::Wireframe, Color::WHITE);
        scene.apply(SceneEdit::ReplacePrimary(Drawable::new(geometry, material)));
        assert_eq!(scene.count_primary(), 1);
        assert_ne!(scene.primary_id().unwrap(), old);
    }

    #[test]
    fn test_replace_primary_retargets_gizmo() {
        let mut scene = scene();
        scene.apply(SceneEdit::AttachGizmo(GizmoMode::Rotate));
        assert_eq!(scene.gizmo.target(), scene.primary_id());

        let geometry = scene.primary().unwrap().geometry.clone();
        let drawable = Drawable::new(geometry, Material::default());
        scene.apply(SceneEdit::ReplacePrimary(drawable));
        assert_eq!(scene.gizmo.target(), scene.primary_id());
        assert_eq!(scene.gizmo.mode(), GizmoMode::Rotate);

        scene.apply(SceneEdit::DetachGizmo);
        assert!(scene.gizmo.target().is_none());
    }

    #[test]
    fn test_replace_light_without_helper() {
        let mut scene = scene();
        let settings = Settings::default();
        let mut ambient = settings.light.clone();
        ambient.source = LightSource::Ambient;
        scene.apply(SceneEdit::ReplaceLight {
            light: Light::from_settings(&ambient, &settings.scene),
            show_helper: true,
        });
        assert_eq!(scene.count_lights(), 1);
        assert_eq!(scene.count_helpers(), 0);

        // Helper toggles do nothing for a light without one
        scene.apply(SceneEdit::ShowHelper(true));
        assert_eq!(scene.count_helpers(), 0);
    }

    #[test]
    fn test_show_helper_leaves_light() {
        let mut scene = scene();
        let light = scene.light().cloned();
        scene.apply(SceneEdit::ShowHelper(false));
        assert_eq!(scene.count_helpers(), 0);
        assert_eq!(scene.light().cloned(), light);
        scene.apply(SceneEdit::ShowHelper(true));
        scene.apply(SceneEdit::ShowHelper(true));
        assert_eq!(scene.count_helpers(), 1);
        assert_eq!(scene.count_lights(), 1);
    }

    #[test]
    fn test_projection_recomputed() {
        let mut scene = scene();
        let before = scene.camera.projection_matrix();
        scene.apply(SceneEdit::SetFov(60.0));
        assert_ne!(scene.camera.projection_matrix(), before);
    }

    #[test]
    fn test_background_override() {
        let mut scene = scene();
        let cube = Background::CubeMap(AssetKey::CubeMap("textures/pisa".to_string()));
        scene.apply(SceneEdit::SetBackgroundOverride(Some(cube.clone())));
        assert_eq!(scene.displayed_background(), &cube);
        scene.apply(SceneEdit::SetBackgroundOverride(None));
        assert_eq!(scene.displayed_background(), scene.background());
    }

    #[test]
    fn test_axes_toggle() {
        let mut scene = scene();
        scene.apply(SceneEdit::ShowAxes(false));
        assert!(scene.axes().is_none());
        scene.apply(SceneEdit::ShowAxes(true));
        scene.apply(SceneEdit::ShowAxes(true));
        assert_eq!(
            scene
                .nodes()
                .iter()
                .filter(|n| matches!(n.kind, NodeKind::Axes { .. }))
                .count(),
            1
        );
    }
}
