//! Application state driven by the frontend
//!
//! A [`Session`] owns the settings record, the scene, the orbit controls and
//! the asset bookkeeping. The frontend commits one [`SettingChange`] per
//! widget edit, forwards pointer input, hands issued loads to its loader and
//! feeds finished loads back through [`Session::finish_load`].

use std::sync::Arc;

use glam::Vec3;

use crate::animation::animate;
use crate::assets::{
    AssetCache, AssetCatalog, AssetKey, CompletedLoad, IssuedLoad, LoadJob, LoadPayload,
    LoadRequest, LoadSlot, LoadTicket, LoadTracker,
};
use crate::camera::OrbitControls;
use crate::config::AppConfig;
use crate::geometry::Typeface;
use crate::gizmo::{GizmoAxis, GizmoEvent};
use crate::material::Material;
use crate::reconcile::{Reconciliation, cache_job, reconcile, text_geometry};
use crate::scene::{Background, Scene, SceneEdit};
use crate::settings::{SettingChange, Settings, Shape};

pub struct Session {
    settings: Settings,
    scene: Scene,
    pub orbit: OrbitControls,
    cache: AssetCache,
    catalog: AssetCatalog,
    tracker: LoadTracker,
}

impl Session {
    pub fn new(settings: Settings, catalog: AssetCatalog) -> Self {
        let scene = Scene::from_settings(&settings, &catalog);
        Self {
            settings,
            scene,
            orbit: OrbitControls::new(),
            cache: AssetCache::new(),
            catalog,
            tracker: LoadTracker::new(),
        }
    }

    /// Default settings with the asset locations of `config`
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Settings::default(), AssetCatalog::new(&config.assets))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Loads needed by the initial scene
    pub fn initial_loads(&mut self) -> Vec<IssuedLoad> {
        let mut keys: Vec<AssetKey> = Vec::new();
        if let Some(primary) = self.scene.primary() {
            keys.extend(primary.material.asset_keys().cloned());
        }
        if let Some(map) = self.scene.ground().and_then(|g| g.map.clone()) {
            keys.push(map);
        }
        keys.extend(self.scene.background().asset().cloned());
        keys.extend(
            self.scene
                .background_override()
                .and_then(Background::asset)
                .cloned(),
        );

        let mut requests: Vec<LoadRequest> = keys
            .iter()
            .map(|key| LoadRequest::cache(cache_job(key)))
            .collect();
        if self.settings.geometry.shape == Shape::Text {
            requests.push(LoadRequest::for_slot(
                LoadJob::Font(self.catalog.font()),
                LoadSlot::PrimaryGeometry,
            ));
        }
        self.issue(requests)
    }

    /// Commit one widget value
    ///
    /// Writes the setting, applies the reconciled edits in order and returns
    /// the loads the frontend has to start.
    pub fn commit(&mut self, change: SettingChange) -> Vec<IssuedLoad> {
        tracing::debug!("Setting changed: {:?}", change);
        self.settings.apply(&change);

        match change {
            SettingChange::Shape(_) | SettingChange::Model(_) => {
                self.tracker.invalidate(LoadSlot::PrimaryGeometry);
            }
            SettingChange::Material(_) | SettingChange::Texture(_) => {
                self.tracker.invalidate(LoadSlot::PrimaryMaterial);
            }
            SettingChange::CameraPosition(_) | SettingChange::CameraLook(_) => {
                self.orbit.reset();
            }
            _ => {}
        }

        let Reconciliation { edits, loads } =
            reconcile(&change, &self.settings, &self.scene, &self.catalog);
        for edit in edits {
            self.apply(edit);
        }
        self.issue(loads)
    }

    /// Apply one edit, keeping the load tracker and orbit controls in step
    fn apply(&mut self, edit: SceneEdit) {
        let before = self.scene.primary_id();
        if let Some(event) = self.scene.apply(edit) {
            self.on_gizmo_event(event);
        }
        if let (Some(old), Some(new)) = (before, self.scene.primary_id())
            && old != new
        {
            self.tracker.retarget(old, new);
        }
        self.release_imports();
    }

    /// Drop imported images the primary material no longer shows
    fn release_imports(&mut self) {
        let live: Vec<&AssetKey> = self
            .scene
            .primary()
            .map(|primary| primary.material.asset_keys().collect())
            .unwrap_or_default();
        let stale: Vec<AssetKey> = self
            .cache
            .imported_keys()
            .filter(|key| !live.contains(key))
            .cloned()
            .collect();
        for key in stale {
            tracing::debug!("Releasing {}", key);
            self.cache.remove(&key);
        }
    }

    fn on_gizmo_event(&mut self, event: GizmoEvent) {
        if let GizmoEvent::DraggingChanged(dragging) = event {
            self.orbit.enabled = !dragging;
        }
    }

    /// Ticket mutation-bearing requests and skip cached assets
    fn issue(&mut self, requests: Vec<LoadRequest>) -> Vec<IssuedLoad> {
        let mut issued = Vec::new();
        for request in requests {
            match &request.job {
                LoadJob::Image(key) | LoadJob::CubeMap(key) => {
                    if !self.cache.begin(key) {
                        continue;
                    }
                }
                LoadJob::Font(key) => {
                    if let Some(font) = self.cache.font(key) {
                        if request.slot.is_some() {
                            self.apply_text(&font);
                        }
                        continue;
                    }
                    self.cache.begin(key);
                }
                LoadJob::PickImage | LoadJob::PickModel => {}
            }
            issued.push(self.tracker.issue(request, self.scene.primary_id()));
        }
        issued
    }

    fn apply_text(&mut self, font: &Typeface) {
        match text_geometry(font) {
            Ok(geometry) => self.apply(SceneEdit::SetPrimaryGeometry(Arc::new(geometry))),
            Err(e) => tracing::warn!("Failed to build text geometry: {}", e),
        }
    }

    /// Whether a ticketed result still belongs to the live primary object
    fn accept(&mut self, ticket: &LoadTicket) -> bool {
        if self.tracker.is_current(ticket, self.scene.primary_id()) {
            self.tracker.complete(ticket);
            true
        } else {
            tracing::debug!(
                "Discarding superseded {:?} load (generation {})",
                ticket.slot,
                ticket.generation
            );
            false
        }
    }

    /// Take in a finished load
    ///
    /// Returns true if the scene or a visible asset changed.
    pub fn finish_load(&mut self, load: CompletedLoad) -> bool {
        let CompletedLoad { ticket, payload } = load;
        match payload {
            LoadPayload::Image { key, result } => match result {
                Ok(image) => {
                    tracing::debug!("Loaded {} ({}x{})", key, image.width, image.height);
                    self.cache.insert_image(key, image);
                    true
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", key, e);
                    self.cache.insert_failed(key, &e);
                    false
                }
            },
            LoadPayload::CubeMap { key, result } => match result {
                Ok(cube) => {
                    tracing::debug!("Loaded {} ({}px faces)", key, cube.size);
                    self.cache.insert_cube_map(key, cube);
                    true
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", key, e);
                    self.cache.insert_failed(key, &e);
                    false
                }
            },
            LoadPayload::Font { key, result } => match result {
                Ok(font) => {
                    tracing::debug!("Loaded {}", key);
                    self.cache.insert_font(key.clone(), font);
                    let font = self.cache.font(&key);
                    match (ticket, font) {
                        (Some(ticket), Some(font)) if self.accept(&ticket) => {
                            self.apply_text(&font);
                            true
                        }
                        _ => false,
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", key, e);
                    self.cache.insert_failed(key, &e);
                    false
                }
            },
            LoadPayload::PickedImage(None) | LoadPayload::PickedModel(None) => {
                tracing::debug!("File selection cancelled");
                false
            }
            LoadPayload::PickedImage(Some(Err(e))) => {
                tracing::warn!("Failed to import texture: {}", e);
                false
            }
            LoadPayload::PickedModel(Some(Err(e))) => {
                tracing::warn!("Failed to import model: {}", e);
                false
            }
            LoadPayload::PickedImage(Some(Ok((name, image)))) => match ticket {
                Some(ticket) if self.accept(&ticket) => {
                    tracing::info!("Imported texture '{}'", name);
                    let key = AssetKey::imported(name);
                    self.cache.insert_image(key.clone(), image);
                    self.apply(SceneEdit::SetPrimaryMaterial(Material::imported(key)));
                    true
                }
                _ => false,
            },
            LoadPayload::PickedModel(Some(Ok((name, geometry)))) => match ticket {
                Some(ticket) if self.accept(&ticket) => {
                    tracing::info!("Imported model '{}'", name);
                    self.apply(SceneEdit::SetPrimaryGeometry(Arc::new(geometry)));
                    true
                }
                _ => false,
            },
        }
    }

    /// Frame step: animate the primary object for `elapsed` seconds
    ///
    /// Returns true if anything moved.
    pub fn tick(&mut self, elapsed: f64) -> bool {
        let Some(primary) = self.scene.primary_mut() else {
            return false;
        };
        let animated = animate(
            &self.settings.animation,
            elapsed,
            &mut primary.transform,
            &mut primary.material.color,
        );
        if animated {
            let transform = primary.transform;
            self.scene.gizmo.update(&transform);
        }
        animated
    }

    /// Advance damped orbit motion
    pub fn update_camera(&mut self) -> bool {
        self.orbit.update(&mut self.scene.camera)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.scene.camera.set_aspect(aspect);
    }

    /// Highlight the gizmo handle under the pointer ray
    ///
    /// Returns true if the highlight changed.
    pub fn hover_gizmo(&mut self, origin: Vec3, dir: Vec3) -> bool {
        if self.scene.gizmo.is_dragging() {
            return false;
        }
        let axis = self.scene.gizmo.hit_test(origin, dir, &self.scene.camera);
        let changed = axis != self.scene.gizmo.highlighted_axis();
        self.scene.gizmo.set_hovered(axis);
        changed
    }

    /// Start a gizmo drag if the ray hits a handle
    pub fn begin_gizmo_drag(&mut self, origin: Vec3, dir: Vec3) -> bool {
        let axis = self.scene.gizmo.hit_test(origin, dir, &self.scene.camera);
        if axis == GizmoAxis::None {
            return false;
        }
        let event = self
            .scene
            .gizmo
            .begin_drag(axis, origin, dir, &self.scene.camera);
        match event {
            Some(event) => {
                self.on_gizmo_event(event);
                true
            }
            None => false,
        }
    }

    /// Continue a gizmo drag
    ///
    /// Returns true if the primary transform changed.
    pub fn drag_gizmo(&mut self, origin: Vec3, dir: Vec3) -> bool {
        let Some(mut transform) = self.scene.primary().map(|p| p.transform) else {
            return false;
        };
        let camera = self.scene.camera.clone();
        let event = self
            .scene
            .gizmo
            .drag(origin, dir, &camera, &mut transform);
        if event != Some(GizmoEvent::Changed) {
            return false;
        }
        if let Some(primary) = self.scene.primary_mut() {
            primary.transform = transform;
        }
        true
    }

    pub fn end_gizmo_drag(&mut self) {
        if let Some(event) = self.scene.gizmo.end_drag() {
            self.on_gizmo_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetState, ImageData};
    use crate::geometry::Geometry;
    use crate::settings::{AffineMode, MaterialKind, TextureChoice};

    fn session() -> Session {
        Session::new(Settings::default(), AssetCatalog::default())
    }

    fn pixel() -> ImageData {
        ImageData::from_rgba(1, 1, vec![255; 4]).unwrap()
    }

    fn triangle() -> Geometry {
        Geometry::new(
            "triangle",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![[0.0, 0.0]; 3],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_cached_assets_are_not_reloaded() {
        let mut session = session();
        let first = session.commit(SettingChange::Texture(TextureChoice::StoneFloor));
        assert_eq!(first.len(), 4);
        session.commit(SettingChange::Texture(TextureChoice::None));
        let again = session.commit(SettingChange::Texture(TextureChoice::StoneFloor));
        assert!(again.is_empty());
    }

    #[test]
    fn test_image_result_fills_cache() {
        let mut session = session();
        let key = session.catalog().shells();
        let loads = session.commit(SettingChange::Texture(TextureChoice::Blending));
        assert_eq!(loads.len(), 1);
        assert!(matches!(session.cache().state(&key), AssetState::Pending));

        let changed = session.finish_load(CompletedLoad {
            ticket: None,
            payload: LoadPayload::Image {
                key: key.clone(),
                result: Ok(pixel()),
            },
        });
        assert!(changed);
        assert!(session.cache().is_ready(&key));
    }

    #[test]
    fn test_imported_texture_applies_in_place() {
        let mut session = session();
        let node = session.scene().primary_id();
        let loads = session.commit(SettingChange::Texture(TextureChoice::Import));
        let ticket = loads[0].ticket;
        assert!(ticket.is_some());

        assert!(session.finish_load(CompletedLoad {
            ticket,
            payload: LoadPayload::PickedImage(Some(Ok(("brick.png".to_string(), pixel())))),
        }));
        assert_eq!(session.scene().primary_id(), node);
        let material = &session.scene().primary().unwrap().material;
        assert!(matches!(
            material.maps.color,
            Some(AssetKey::Imported { ref name, .. }) if name == "brick.png"
        ));
    }

    #[test]
    fn test_reimport_releases_previous_image() {
        let mut session = session();
        for name in ["first.png", "second.png"] {
            let loads = session.commit(SettingChange::Texture(TextureChoice::Import));
            assert!(session.finish_load(CompletedLoad {
                ticket: loads[0].ticket,
                payload: LoadPayload::PickedImage(Some(Ok((name.to_string(), pixel())))),
            }));
        }

        let imported: Vec<&AssetKey> = session.cache().imported_keys().collect();
        assert_eq!(imported.len(), 1);
        assert!(matches!(imported[0], AssetKey::Imported { name, .. } if name == "second.png"));

        session.commit(SettingChange::Texture(TextureChoice::None));
        assert_eq!(session.cache().imported_keys().count(), 0);
    }

    #[test]
    fn test_vertical_camera_keeps_finite_view() {
        let mut session = session();
        session.commit(SettingChange::CameraPosition(Vec3::new(0.0, 5.0, 0.0)));
        assert!(session.scene().camera.view_projection().is_finite());

        session.commit(SettingChange::CameraPosition(Vec3::ZERO));
        session.commit(SettingChange::CameraLook(Vec3::ZERO));
        assert!(session.scene().camera.view_projection().is_finite());
    }

    #[test]
    fn test_light_on_target_keeps_finite_shadow() {
        let mut session = session();
        session.commit(SettingChange::LightPosition(Vec3::ZERO));
        let shadow = session.scene().light().unwrap().shadow().unwrap();
        assert!(shadow.view_proj.is_finite());
    }

    #[test]
    fn test_cancelled_import_changes_nothing() {
        let mut session = session();
        let before = session.scene().primary().unwrap().material.clone();
        let loads = session.commit(SettingChange::Texture(TextureChoice::Import));
        assert!(!session.finish_load(CompletedLoad {
            ticket: loads[0].ticket,
            payload: LoadPayload::PickedImage(None),
        }));
        assert_eq!(session.scene().primary().unwrap().material, before);
    }

    #[test]
    fn test_stale_import_is_discarded() {
        let mut session = session();
        let loads = session.commit(SettingChange::Texture(TextureChoice::Import));
        // Material rebuilt while the dialog was open
        session.commit(SettingChange::Material(MaterialKind::Lambert));

        assert!(!session.finish_load(CompletedLoad {
            ticket: loads[0].ticket,
            payload: LoadPayload::PickedImage(Some(Ok(("late.png".to_string(), pixel())))),
        }));
        let material = &session.scene().primary().unwrap().material;
        assert!(material.maps.color.is_none());
    }

    #[test]
    fn test_model_import_follows_rebuilt_primary() {
        let mut session = session();
        let loads = session.commit(SettingChange::Model(crate::settings::ModelChoice::Import));
        session.commit(SettingChange::Material(MaterialKind::Wireframe));

        assert!(session.finish_load(CompletedLoad {
            ticket: loads[0].ticket,
            payload: LoadPayload::PickedModel(Some(Ok(("tri".to_string(), triangle())))),
        }));
        assert_eq!(session.scene().primary().unwrap().geometry.label, "triangle");
    }

    #[test]
    fn test_shape_change_supersedes_model_import() {
        let mut session = session();
        let loads = session.commit(SettingChange::Model(crate::settings::ModelChoice::Import));
        session.commit(SettingChange::Shape(Shape::Box));

        assert!(!session.finish_load(CompletedLoad {
            ticket: loads[0].ticket,
            payload: LoadPayload::PickedModel(Some(Ok(("tri".to_string(), triangle())))),
        }));
        assert_ne!(session.scene().primary().unwrap().geometry.label, "triangle");
    }

    #[test]
    fn test_drag_state_toggles_orbit() {
        let mut session = session();
        session.commit(SettingChange::AffineMode(AffineMode::Translate));
        assert!(session.orbit.enabled);

        let camera = session.scene().camera.clone();
        let center = session.scene().gizmo.position();
        let scale = session.scene().gizmo.world_scale(&camera);
        let handle = center + Vec3::X * 0.5 * scale;
        let dir = (handle - camera.position).normalize();

        assert!(session.begin_gizmo_drag(camera.position, dir));
        assert!(!session.orbit.enabled);

        session.end_gizmo_drag();
        assert!(session.orbit.enabled);
    }

    #[test]
    fn test_detach_while_dragging_restores_orbit() {
        let mut session = session();
        session.commit(SettingChange::AffineMode(AffineMode::Translate));
        let camera = session.scene().camera.clone();
        let center = session.scene().gizmo.position();
        let scale = session.scene().gizmo.world_scale(&camera);
        let dir = (center + Vec3::X * 0.5 * scale - camera.position).normalize();
        assert!(session.begin_gizmo_drag(camera.position, dir));

        session.commit(SettingChange::AffineMode(AffineMode::None));
        assert!(session.orbit.enabled);
        assert!(session.scene().gizmo.target().is_none());
    }

    #[test]
    fn test_tick_moves_gizmo_with_primary() {
        let mut session = session();
        session.commit(SettingChange::AffineMode(AffineMode::Translate));
        session.commit(SettingChange::TranslateAnimation(
            crate::settings::TranslateAnimation::UpDown,
        ));
        assert!(session.tick(1.0));
        let position = session.scene().primary().unwrap().transform.position;
        assert_eq!(session.scene().gizmo.position(), position);
        assert_eq!(position.y, 1.0_f64.sin() as f32);
    }
}
