//! Reconciliation handlers
//!
//! [`reconcile`] maps one committed [`SettingChange`] to the scene edits and
//! asset loads it implies. It never touches the scene itself; the caller
//! applies the edits in order and hands the loads to the loader.

use std::sync::Arc;

use crate::assets::{AssetCatalog, AssetKey, LoadJob, LoadRequest, LoadSlot};
use crate::constants::{TEXT_CURVE_SEGMENTS, TEXT_DEPTH, TEXT_LABEL, TEXT_SIZE};
use crate::geometry::{self, FontError, Geometry, Typeface, generate_text};
use crate::gizmo::GizmoMode;
use crate::light::Light;
use crate::material::Material;
use crate::scene::{Background, Drawable, Scene, SceneEdit};
use crate::settings::{
    BackgroundChoice, ModelChoice, SettingChange, Settings, Shape, TextureChoice,
};

/// Everything a settings change asks for
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub edits: Vec<SceneEdit>,
    pub loads: Vec<LoadRequest>,
}

impl Reconciliation {
    fn edit(edit: SceneEdit) -> Self {
        Self {
            edits: vec![edit],
            loads: Vec::new(),
        }
    }

    fn load(&mut self, request: LoadRequest) {
        self.loads.push(request);
    }

    /// Queue cache loads for every asset `material` refers to
    fn load_material_assets(&mut self, material: &Material) {
        for key in material.asset_keys() {
            self.loads.push(LoadRequest::cache(cache_job(key)));
        }
    }
}

/// Cache job fetching `key`
pub(crate) fn cache_job(key: &AssetKey) -> LoadJob {
    match key {
        AssetKey::CubeMap(_) => LoadJob::CubeMap(key.clone()),
        AssetKey::Font(_) => LoadJob::Font(key.clone()),
        AssetKey::Image(_) | AssetKey::Imported { .. } => LoadJob::Image(key.clone()),
    }
}

/// Geometry of the "CS105" shape built from a loaded typeface
pub fn text_geometry(font: &Typeface) -> Result<Geometry, FontError> {
    generate_text(
        font,
        TEXT_LABEL,
        TEXT_SIZE,
        TEXT_DEPTH,
        TEXT_CURVE_SEGMENTS,
    )
}

/// Decide how the scene follows `change`
///
/// # Arguments
/// * `change` - The committed value
/// * `settings` - The settings record, already holding `change`
/// * `scene` - The scene as it is before any of the returned edits
/// * `catalog` - Location of built-in assets
pub fn reconcile(
    change: &SettingChange,
    settings: &Settings,
    scene: &Scene,
    catalog: &AssetCatalog,
) -> Reconciliation {
    match change {
        // Scene
        SettingChange::ShowAxes(show) => Reconciliation::edit(SceneEdit::ShowAxes(*show)),
        SettingChange::Background(choice) => {
            let mut result = Reconciliation::default();
            match catalog.background(*choice) {
                Some(key) => {
                    result.load(LoadRequest::cache(LoadJob::Image(key.clone())));
                    result
                        .edits
                        .push(SceneEdit::SetBackground(Background::Texture(key)));
                }
                None => result
                    .edits
                    .push(SceneEdit::SetBackground(Background::Color(settings.scene.color))),
            }
            result
        }
        SettingChange::BackgroundColor(color) => {
            if settings.scene.background == BackgroundChoice::Color {
                Reconciliation::edit(SceneEdit::SetBackground(Background::Color(*color)))
            } else {
                Reconciliation::default()
            }
        }
        SettingChange::PlaneColor(color) => Reconciliation::edit(SceneEdit::SetGroundColor(*color)),
        SettingChange::PlaneTexture(texture) => {
            let map = catalog.plane(*texture);
            let mut result = Reconciliation::default();
            if let Some(key) = &map {
                result.load(LoadRequest::cache(LoadJob::Image(key.clone())));
            }
            result.edits.push(SceneEdit::SetGroundMap(map));
            result
        }

        // Geometry
        SettingChange::Scale(scale) => Reconciliation::edit(SceneEdit::SetPrimaryScale(*scale)),
        SettingChange::Shape(shape) => reconcile_shape(*shape, catalog),
        SettingChange::Model(ModelChoice::None) => {
            reconcile_shape(settings.geometry.shape, catalog)
        }
        SettingChange::Model(ModelChoice::Import) => Reconciliation {
            edits: Vec::new(),
            loads: vec![LoadRequest::for_slot(
                LoadJob::PickModel,
                LoadSlot::PrimaryGeometry,
            )],
        },
        SettingChange::Material(kind) => {
            let material = Material::for_kind(*kind, settings.geometry.color);
            Reconciliation::edit(SceneEdit::ReplacePrimary(Drawable::new(
                current_geometry(settings, scene),
                material,
            )))
        }
        SettingChange::Texture(texture) => reconcile_texture(*texture, settings, scene, catalog),
        SettingChange::ObjectColor(color) => {
            Reconciliation::edit(SceneEdit::SetPrimaryColor(*color))
        }

        // Affine
        SettingChange::AffineMode(mode) => match GizmoMode::from_affine(*mode) {
            Some(mode) => Reconciliation::edit(SceneEdit::AttachGizmo(mode)),
            None => Reconciliation::edit(SceneEdit::DetachGizmo),
        },
        SettingChange::ResetTransform => Reconciliation::edit(SceneEdit::ResetPrimaryTransform),

        // Light
        SettingChange::LightSource(_) => Reconciliation::edit(SceneEdit::ReplaceLight {
            light: Light::from_settings(&settings.light, &settings.scene),
            show_helper: settings.light.show_helper,
        }),
        SettingChange::ShowHelper(show) => Reconciliation::edit(SceneEdit::ShowHelper(*show)),
        SettingChange::LightEnabled(enabled) => {
            Reconciliation::edit(SceneEdit::SetLightEnabled(*enabled))
        }
        SettingChange::LightShadow(cast) => Reconciliation::edit(SceneEdit::SetLightShadow(*cast)),
        SettingChange::LightIntensity(intensity) => {
            Reconciliation::edit(SceneEdit::SetLightIntensity(*intensity))
        }
        SettingChange::LightColor(color) => Reconciliation::edit(SceneEdit::SetLightColor(*color)),
        SettingChange::LightPosition(position) => {
            Reconciliation::edit(SceneEdit::SetLightPosition(*position))
        }
        SettingChange::LightAngle(angle) => Reconciliation::edit(SceneEdit::SetLightAngle(*angle)),

        // Perspective
        SettingChange::Fov(fov) => Reconciliation::edit(SceneEdit::SetFov(*fov)),
        SettingChange::Near(near) => Reconciliation::edit(SceneEdit::SetNear(*near)),
        SettingChange::Far(far) => Reconciliation::edit(SceneEdit::SetFar(*far)),
        SettingChange::CameraPosition(position) => {
            Reconciliation::edit(SceneEdit::SetCameraPosition(*position))
        }
        SettingChange::CameraLook(target) => {
            Reconciliation::edit(SceneEdit::SetCameraTarget(*target))
        }

        // Read every frame by the animation step
        SettingChange::TranslateAnimation(_)
        | SettingChange::RotateAnimation(_)
        | SettingChange::PulseScale(_)
        | SettingChange::CycleColor(_) => Reconciliation::default(),
    }
}

/// Geometry swap for a shape; text waits for its font
fn reconcile_shape(shape: Shape, catalog: &AssetCatalog) -> Reconciliation {
    match geometry::primitive(shape) {
        Some(geometry) => Reconciliation::edit(SceneEdit::SetPrimaryGeometry(Arc::new(geometry))),
        None => Reconciliation {
            edits: Vec::new(),
            loads: vec![LoadRequest::for_slot(
                LoadJob::Font(catalog.font()),
                LoadSlot::PrimaryGeometry,
            )],
        },
    }
}

fn reconcile_texture(
    texture: TextureChoice,
    settings: &Settings,
    scene: &Scene,
    catalog: &AssetCatalog,
) -> Reconciliation {
    let mut result = Reconciliation::default();

    if texture == TextureChoice::Import {
        result.load(LoadRequest::for_slot(
            LoadJob::PickImage,
            LoadSlot::PrimaryMaterial,
        ));
    } else {
        let material = Material::from_settings(&settings.geometry, catalog);
        result.load_material_assets(&material);
        result
            .edits
            .push(SceneEdit::ReplacePrimary(Drawable::new(
                current_geometry(settings, scene),
                material,
            )));
    }

    let environment = (texture == TextureChoice::Reflection)
        .then(|| Background::CubeMap(catalog.environment()));
    result
        .edits
        .push(SceneEdit::SetBackgroundOverride(environment));
    result
}

/// Geometry of the live primary object, or the selected shape if there is none
fn current_geometry(settings: &Settings, scene: &Scene) -> Arc<Geometry> {
    scene
        .primary()
        .map(|primary| primary.geometry.clone())
        .unwrap_or_else(|| {
            Arc::new(
                geometry::primitive(settings.geometry.shape)
                    .unwrap_or_else(|| Geometry::empty(TEXT_LABEL)),
            )
        })
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::color::Color;
    use crate::material::DrawMode;
    use crate::settings::{AffineMode, LightSource, MaterialKind};

    fn setup() -> (Settings, Scene, AssetCatalog) {
        let settings = Settings::default();
        let catalog = AssetCatalog::default();
        let scene = Scene::from_settings(&settings, &catalog);
        (settings, scene, catalog)
    }

    fn run(
        change: SettingChange,
        settings: &mut Settings,
        scene: &Scene,
        catalog: &AssetCatalog,
    ) -> Reconciliation {
        settings.apply(&change);
        reconcile(&change, settings, scene, catalog)
    }

    #[test]
    fn test_material_change_keeps_geometry() {
        let (mut settings, scene, catalog) = setup();
        let geometry = scene.primary().unwrap().geometry.clone();
        let result = run(
            SettingChange::Material(MaterialKind::Wireframe),
            &mut settings,
            &scene,
            &catalog,
        );
        assert!(result.loads.is_empty());
        match result.edits.as_slice() {
            [SceneEdit::ReplacePrimary(drawable)] => {
                assert!(Arc::ptr_eq(&drawable.geometry, &geometry));
                assert_eq!(drawable.material.draw, DrawMode::Wireframe);
                assert_eq!(drawable.material.color, settings.geometry.color);
                assert!(drawable.cast_shadow);
            }
            other => panic!("unexpected edits {other:?}"),
        }
    }

    #[test]
    fn test_shape_change_swaps_geometry_only() {
        let (mut settings, scene, catalog) = setup();
        let result = run(
            SettingChange::Shape(Shape::Box),
            &mut settings,
            &scene,
            &catalog,
        );
        assert!(matches!(
            result.edits.as_slice(),
            [SceneEdit::SetPrimaryGeometry(_)]
        ));
        assert_eq!(settings.geometry.material, MaterialKind::Phong);
    }

    #[test]
    fn test_text_shape_requests_font() {
        let (mut settings, scene, catalog) = setup();
        let result = run(
            SettingChange::Shape(Shape::Text),
            &mut settings,
            &scene,
            &catalog,
        );
        assert!(result.edits.is_empty());
        assert_eq!(
            result.loads,
            vec![LoadRequest::for_slot(
                LoadJob::Font(catalog.font()),
                LoadSlot::PrimaryGeometry
            )]
        );
    }

    #[test]
    fn test_texture_presets() {
        let (mut settings, scene, catalog) = setup();

        let result = run(
            SettingChange::Texture(TextureChoice::StoneFloor),
            &mut settings,
            &scene,
            &catalog,
        );
        assert_eq!(result.loads.len(), 4);
        assert!(result.loads.iter().all(|l| l.slot.is_none()));
        assert!(matches!(
            result.edits.as_slice(),
            [
                SceneEdit::ReplacePrimary(_),
                SceneEdit::SetBackgroundOverride(None)
            ]
        ));

        let result = run(
            SettingChange::Texture(TextureChoice::Reflection),
            &mut settings,
            &scene,
            &catalog,
        );
        assert_eq!(
            result.loads,
            vec![LoadRequest::cache(LoadJob::CubeMap(catalog.environment()))]
        );
        assert!(matches!(
            result.edits.last(),
            Some(SceneEdit::SetBackgroundOverride(Some(Background::CubeMap(_))))
        ));
    }

    #[test]
    fn test_texture_import_only_prompts() {
        let (mut settings, scene, catalog) = setup();
        let result = run(
            SettingChange::Texture(TextureChoice::Import),
            &mut settings,
            &scene,
            &catalog,
        );
        assert_eq!(
            result.loads,
            vec![LoadRequest::for_slot(
                LoadJob::PickImage,
                LoadSlot::PrimaryMaterial
            )]
        );
        assert!(
            !result
                .edits
                .iter()
                .any(|e| matches!(e, SceneEdit::ReplacePrimary(_)))
        );
    }

    #[test]
    fn test_background_choices() {
        let (mut settings, scene, catalog) = setup();
        let result = run(
            SettingChange::Background(BackgroundChoice::Galaxy),
            &mut settings,
            &scene,
            &catalog,
        );
        assert_eq!(result.loads.len(), 1);
        assert!(matches!(
            result.edits.as_slice(),
            [SceneEdit::SetBackground(Background::Texture(_))]
        ));

        // Colour only matters while the colour background is chosen
        let result = run(
            SettingChange::BackgroundColor(Color::BLACK),
            &mut settings,
            &scene,
            &catalog,
        );
        assert!(result.edits.is_empty());

        run(
            SettingChange::Background(BackgroundChoice::Color),
            &mut settings,
            &scene,
            &catalog,
        );
        let result = run(
            SettingChange::BackgroundColor(Color::WHITE),
            &mut settings,
            &scene,
            &catalog,
        );
        assert!(matches!(
            result.edits.as_slice(),
            [SceneEdit::SetBackground(Background::Color(c))] if *c == Color::WHITE
        ));
    }

    #[test]
    fn test_light_source_uses_current_light_settings() {
        let (mut settings, scene, catalog) = setup();
        settings.light.intensity = 7.0;
        settings.light.position = Vec3::new(1.0, 2.0, 3.0);
        let result = run(
            SettingChange::LightSource(LightSource::Spot),
            &mut settings,
            &scene,
            &catalog,
        );
        match result.edits.as_slice() {
            [SceneEdit::ReplaceLight { light, show_helper }] => {
                assert_eq!(light.source, LightSource::Spot);
                assert_eq!(light.intensity, 7.0);
                assert_eq!(light.position, Vec3::new(1.0, 2.0, 3.0));
                assert!(*show_helper);
            }
            other => panic!("unexpected edits {other:?}"),
        }
    }

    #[test]
    fn test_affine_modes() {
        let (mut settings, scene, catalog) = setup();
        let result = run(
            SettingChange::AffineMode(AffineMode::Scale),
            &mut settings,
            &scene,
            &catalog,
        );
        assert!(matches!(
            result.edits.as_slice(),
            [SceneEdit::AttachGizmo(GizmoMode::Scale)]
        ));
        let result = run(
            SettingChange::AffineMode(AffineMode::None),
            &mut settings,
            &scene,
            &catalog,
        );
        assert!(matches!(result.edits.as_slice(), [SceneEdit::DetachGizmo]));
    }

    #[test]
    fn test_animation_fields_have_no_edits() {
        let (mut settings, scene, catalog) = setup();
        let result = run(
            SettingChange::PulseScale(true),
            &mut settings,
            &scene,
            &catalog,
        );
        assert!(result.edits.is_empty());
        assert!(result.loads.is_empty());
    }
}
