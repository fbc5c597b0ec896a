//! Settings state edited through the settings panel
//!
//! The record is grouped the way the panel is: scene, geometry, affine,
//! light, perspective and animation. A widget commit becomes exactly one
//! [`SettingChange`], which [`Settings::apply`] writes before the matching
//! reconciliation handler runs.

use std::f32::consts::PI;
use std::ops::RangeInclusive;

use glam::Vec3;

use crate::color::Color;

/// Slider bounds of the object scale
pub const SCALE_RANGE: RangeInclusive<f32> = 0.1..=10.0;
/// Slider bounds of the light intensity
pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=10.0;
/// Slider bounds of every position component (light and camera)
pub const POSITION_RANGE: RangeInclusive<f32> = -10.0..=10.0;
/// Slider bounds of the spot light cone angle
pub const ANGLE_RANGE: RangeInclusive<f32> = 0.0..=PI / 3.0;
/// Slider bounds of the vertical field of view (degrees)
pub const FOV_RANGE: RangeInclusive<f32> = 40.0..=150.0;
/// Slider bounds of the near plane
pub const NEAR_RANGE: RangeInclusive<f32> = 0.1..=4.0;
/// Slider bounds of the far plane
pub const FAR_RANGE: RangeInclusive<f32> = 100.0..=1000.0;

/// Scene background choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackgroundChoice {
    #[default]
    Color,
    Sea,
    Nature,
    Galaxy,
}

impl BackgroundChoice {
    pub const ALL: [BackgroundChoice; 4] = [Self::Color, Self::Sea, Self::Nature, Self::Galaxy];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Color => "Color",
            Self::Sea => "Sea",
            Self::Nature => "Nature",
            Self::Galaxy => "Galaxy",
        }
    }
}

/// Ground disk texture choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaneTexture {
    #[default]
    Color,
    Grass,
    Dry,
}

impl PlaneTexture {
    pub const ALL: [PlaneTexture; 3] = [Self::Color, Self::Grass, Self::Dry];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Color => "Color",
            Self::Grass => "Grass",
            Self::Dry => "Dry",
        }
    }
}

/// Shape of the primary object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Sphere,
    Box,
    Cone,
    Cylinder,
    Wheel,
    Teapot,
    Knot,
    Icosahedron,
    Text,
}

impl Shape {
    pub const ALL: [Shape; 9] = [
        Self::Sphere,
        Self::Box,
        Self::Cone,
        Self::Cylinder,
        Self::Wheel,
        Self::Teapot,
        Self::Knot,
        Self::Icosahedron,
        Self::Text,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sphere => "Sphere",
            Self::Box => "Box",
            Self::Cone => "Cone",
            Self::Cylinder => "Cylinder",
            Self::Wheel => "Wheel",
            Self::Teapot => "Teapot",
            Self::Knot => "Knot",
            Self::Icosahedron => "Icosahedron",
            Self::Text => "CS105",
        }
    }
}

/// Material kind of the primary object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialKind {
    Basic,
    Points,
    Lines,
    Wireframe,
    Lambert,
    #[default]
    Phong,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 6] = [
        Self::Basic,
        Self::Points,
        Self::Lines,
        Self::Wireframe,
        Self::Lambert,
        Self::Phong,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Points => "Points",
            Self::Lines => "Lines",
            Self::Wireframe => "Wireframe",
            Self::Lambert => "Lambert",
            Self::Phong => "Phong",
        }
    }
}

/// Texture preset of the primary object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureChoice {
    #[default]
    None,
    StoneFloor,
    Ceiling,
    Blending,
    Reflection,
    Import,
}

impl TextureChoice {
    pub const ALL: [TextureChoice; 6] = [
        Self::None,
        Self::StoneFloor,
        Self::Ceiling,
        Self::Blending,
        Self::Reflection,
        Self::Import,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::StoneFloor => "Stone Floor",
            Self::Ceiling => "Ceiling",
            Self::Blending => "Blending",
            Self::Reflection => "Reflection",
            Self::Import => "Import Texture",
        }
    }
}

/// Imported model choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelChoice {
    #[default]
    None,
    Import,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [Self::None, Self::Import];

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Import => "Import OBJ",
        }
    }
}

/// Affine gizmo mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AffineMode {
    #[default]
    None,
    Translate,
    Rotate,
    Scale,
}

impl AffineMode {
    pub const ALL: [AffineMode; 4] = [Self::None, Self::Translate, Self::Rotate, Self::Scale];

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Translate => "Translation",
            Self::Rotate => "Rotation",
            Self::Scale => "Scaling",
        }
    }
}

/// Light source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightSource {
    Ambient,
    Hemisphere,
    #[default]
    Directional,
    Point,
    Spot,
}

impl LightSource {
    pub const ALL: [LightSource; 5] = [
        Self::Ambient,
        Self::Hemisphere,
        Self::Directional,
        Self::Point,
        Self::Spot,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ambient => "Ambient Light",
            Self::Hemisphere => "Hemisphere Light",
            Self::Directional => "Directional Light",
            Self::Point => "Point Light",
            Self::Spot => "Spot Light",
        }
    }
}

/// Translational animation law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslateAnimation {
    #[default]
    None,
    UpDown,
    SideToSide,
    BackForth,
    Circle,
}

impl TranslateAnimation {
    pub const ALL: [TranslateAnimation; 5] = [
        Self::None,
        Self::UpDown,
        Self::SideToSide,
        Self::BackForth,
        Self::Circle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::UpDown => "Up and down",
            Self::SideToSide => "Side to side",
            Self::BackForth => "Back and forth",
            Self::Circle => "Circle",
        }
    }
}

/// Rotational animation law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotateAnimation {
    #[default]
    None,
    SpinX,
    SpinY,
    SpinZ,
    SwayX,
    SwayY,
    SwayZ,
}

impl RotateAnimation {
    pub const ALL: [RotateAnimation; 7] = [
        Self::None,
        Self::SpinX,
        Self::SpinY,
        Self::SpinZ,
        Self::SwayX,
        Self::SwayY,
        Self::SwayZ,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::SpinX => "Spin X",
            Self::SpinY => "Spin Y",
            Self::SpinZ => "Spin Z",
            Self::SwayX => "Sway X",
            Self::SwayY => "Sway Y",
            Self::SwayZ => "Sway Z",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub show_axes: bool,
    pub background: BackgroundChoice,
    pub color: Color,
    pub plane_color: Color,
    pub plane_texture: PlaneTexture,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            show_axes: true,
            background: BackgroundChoice::Color,
            color: Color::from_hex(0x828282),
            plane_color: Color::from_hex(0xababab),
            plane_texture: PlaneTexture::Color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometrySettings {
    pub scale: f32,
    pub shape: Shape,
    pub material: MaterialKind,
    pub texture: TextureChoice,
    pub model: ModelChoice,
    pub color: Color,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            shape: Shape::Sphere,
            material: MaterialKind::Phong,
            texture: TextureChoice::None,
            model: ModelChoice::None,
            color: Color::from_hex(0x7a6c6c),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffineSettings {
    pub mode: AffineMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightSettings {
    pub source: LightSource,
    pub show_helper: bool,
    pub enabled: bool,
    pub shadow: bool,
    pub intensity: f32,
    pub color: Color,
    pub position: Vec3,
    /// Spot light cone half angle (radians)
    pub angle: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            source: LightSource::Directional,
            show_helper: true,
            enabled: true,
            shadow: true,
            intensity: 2.0,
            color: Color::WHITE,
            position: Vec3::new(-5.0, 5.0, 0.0),
            angle: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveSettings {
    /// Vertical field of view (degrees)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub look: Vec3,
}

impl Default for PerspectiveSettings {
    fn default() -> Self {
        Self {
            fov: 104.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(-2.0, 2.0, 4.0),
            look: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSettings {
    pub translate: TranslateAnimation,
    pub rotate: RotateAnimation,
    pub pulse_scale: bool,
    pub cycle_color: bool,
}

/// The whole settings record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub scene: SceneSettings,
    pub geometry: GeometrySettings,
    pub affine: AffineSettings,
    pub light: LightSettings,
    pub perspective: PerspectiveSettings,
    pub animation: AnimationSettings,
}

/// One committed widget value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    // Scene
    ShowAxes(bool),
    Background(BackgroundChoice),
    BackgroundColor(Color),
    PlaneColor(Color),
    PlaneTexture(PlaneTexture),
    // Geometry
    Scale(f32),
    Shape(Shape),
    Material(MaterialKind),
    Texture(TextureChoice),
    Model(ModelChoice),
    ObjectColor(Color),
    // Affine
    AffineMode(AffineMode),
    ResetTransform,
    // Light
    LightSource(LightSource),
    ShowHelper(bool),
    LightEnabled(bool),
    LightShadow(bool),
    LightIntensity(f32),
    LightColor(Color),
    LightPosition(Vec3),
    LightAngle(f32),
    // Perspective
    Fov(f32),
    Near(f32),
    Far(f32),
    CameraPosition(Vec3),
    CameraLook(Vec3),
    // Animation
    TranslateAnimation(TranslateAnimation),
    RotateAnimation(RotateAnimation),
    PulseScale(bool),
    CycleColor(bool),
}

impl Settings {
    /// Write the field named by `change`
    pub fn apply(&mut self, change: &SettingChange) {
        match change {
            SettingChange::ShowAxes(v) => self.scene.show_axes = *v,
            SettingChange::Background(v) => self.scene.background = *v,
            SettingChange::BackgroundColor(v) => self.scene.color = *v,
            SettingChange::PlaneColor(v) => self.scene.plane_color = *v,
            SettingChange::PlaneTexture(v) => self.scene.plane_texture = *v,
            SettingChange::Scale(v) => self.geometry.scale = *v,
            SettingChange::Shape(v) => self.geometry.shape = *v,
            SettingChange::Material(v) => self.geometry.material = *v,
            SettingChange::Texture(v) => self.geometry.texture = *v,
            SettingChange::Model(v) => self.geometry.model = *v,
            SettingChange::ObjectColor(v) => self.geometry.color = *v,
            SettingChange::AffineMode(v) => self.affine.mode = *v,
            SettingChange::ResetTransform => {}
            SettingChange::LightSource(v) => self.light.source = *v,
            SettingChange::ShowHelper(v) => self.light.show_helper = *v,
            SettingChange::LightEnabled(v) => self.light.enabled = *v,
            SettingChange::LightShadow(v) => self.light.shadow = *v,
            SettingChange::LightIntensity(v) => self.light.intensity = *v,
            SettingChange::LightColor(v) => self.light.color = *v,
            SettingChange::LightPosition(v) => self.light.position = *v,
            SettingChange::LightAngle(v) => self.light.angle = *v,
            SettingChange::Fov(v) => self.perspective.fov = *v,
            SettingChange::Near(v) => self.perspective.near = *v,
            SettingChange::Far(v) => self.perspective.far = *v,
            SettingChange::CameraPosition(v) => self.perspective.position = *v,
            SettingChange::CameraLook(v) => self.perspective.look = *v,
            SettingChange::TranslateAnimation(v) => self.animation.translate = *v,
            SettingChange::RotateAnimation(v) => self.animation.rotate = *v,
            SettingChange::PulseScale(v) => self.animation.pulse_scale = *v,
            SettingChange::CycleColor(v) => self.animation.cycle_color = *v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.scene.show_axes);
        assert_eq!(settings.scene.color.to_hex(), 0x828282);
        assert_eq!(settings.geometry.shape, Shape::Sphere);
        assert_eq!(settings.geometry.material, MaterialKind::Phong);
        assert_eq!(settings.geometry.color.to_hex(), 0x7a6c6c);
        assert_eq!(settings.light.source, LightSource::Directional);
        assert_eq!(settings.light.position, Vec3::new(-5.0, 5.0, 0.0));
        assert_eq!(settings.perspective.fov, 104.0);
        assert_eq!(settings.perspective.position, Vec3::new(-2.0, 2.0, 4.0));
    }

    #[test]
    fn test_apply_writes_only_named_field() {
        let mut settings = Settings::default();
        let before = settings.clone();

        settings.apply(&SettingChange::Material(MaterialKind::Wireframe));
        assert_eq!(settings.geometry.material, MaterialKind::Wireframe);
        assert_eq!(settings.geometry.shape, before.geometry.shape);
        assert_eq!(settings.light, before.light);

        settings.apply(&SettingChange::LightPosition(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(settings.light.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(settings.geometry.material, MaterialKind::Wireframe);
    }

    #[test]
    fn test_reset_is_not_a_field() {
        let mut settings = Settings::default();
        settings.apply(&SettingChange::ResetTransform);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_default_values_inside_slider_ranges() {
        let settings = Settings::default();
        assert!(SCALE_RANGE.contains(&settings.geometry.scale));
        assert!(INTENSITY_RANGE.contains(&settings.light.intensity));
        assert!(ANGLE_RANGE.contains(&settings.light.angle));
        assert!(FOV_RANGE.contains(&settings.perspective.fov));
        assert!(NEAR_RANGE.contains(&settings.perspective.near));
        assert!(FAR_RANGE.contains(&settings.perspective.far));
    }
}
