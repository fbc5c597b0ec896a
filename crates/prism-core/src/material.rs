//! Material descriptors of the primary object
//!
//! A [`Material`] describes how the renderer shades and draws a geometry.
//! Texture maps are referenced by [`AssetKey`]; a map whose asset is not
//! loaded yet is simply skipped by the renderer.

use crate::assets::{AssetCatalog, AssetKey};
use crate::color::Color;
use crate::constants::POINT_SIZE;
use crate::settings::{GeometrySettings, MaterialKind, TextureChoice};

/// Lighting model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shading {
    /// Unlit
    Basic,
    /// Diffuse only
    Lambert,
    /// Diffuse plus Blinn-Phong specular
    Phong,
    /// Metallic/roughness
    Standard,
}

/// Primitive topology used to draw the geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Triangles,
    Points,
    /// One strip through the index buffer in order
    LineStrip,
    /// Unique triangle edges
    Wireframe,
}

/// How fragments combine with the framebuffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Blending {
    #[default]
    Normal,
    /// `dst * src`
    Multiply,
}

/// Optional texture maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureMaps {
    pub color: Option<AssetKey>,
    pub normal: Option<AssetKey>,
    pub ambient_occlusion: Option<AssetKey>,
    pub specular: Option<AssetKey>,
    pub roughness: Option<AssetKey>,
    pub metalness: Option<AssetKey>,
}

impl TextureMaps {
    /// Every referenced key
    pub fn keys(&self) -> impl Iterator<Item = &AssetKey> {
        [
            &self.color,
            &self.normal,
            &self.ambient_occlusion,
            &self.specular,
            &self.roughness,
            &self.metalness,
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub draw: DrawMode,
    pub color: Color,
    pub maps: TextureMaps,
    /// Cube map reflected by the surface
    pub env_map: Option<AssetKey>,
    pub shininess: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub blending: Blending,
    pub point_size: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shading: Shading::Phong,
            draw: DrawMode::Triangles,
            color: Color::WHITE,
            maps: TextureMaps::default(),
            env_map: None,
            shininess: 30.0,
            roughness: 1.0,
            metalness: 0.0,
            blending: Blending::Normal,
            point_size: POINT_SIZE,
            double_sided: true,
        }
    }
}

impl Material {
    /// Untextured material for a drawing style
    pub fn for_kind(kind: MaterialKind, color: Color) -> Self {
        let (shading, draw) = match kind {
            MaterialKind::Basic => (Shading::Basic, DrawMode::Triangles),
            MaterialKind::Points => (Shading::Basic, DrawMode::Points),
            MaterialKind::Lines => (Shading::Basic, DrawMode::LineStrip),
            MaterialKind::Wireframe => (Shading::Basic, DrawMode::Wireframe),
            MaterialKind::Lambert => (Shading::Lambert, DrawMode::Triangles),
            MaterialKind::Phong => (Shading::Phong, DrawMode::Triangles),
        };
        Self {
            shading,
            draw,
            color,
            ..Self::default()
        }
    }

    /// Material selected by the geometry settings
    ///
    /// An imported texture only exists once its file is read, so `Import`
    /// falls back to the drawing style.
    pub fn from_settings(geometry: &GeometrySettings, catalog: &AssetCatalog) -> Self {
        match geometry.texture {
            TextureChoice::None | TextureChoice::Import => {
                Self::for_kind(geometry.material, geometry.color)
            }
            TextureChoice::StoneFloor => Self::stone_floor(catalog),
            TextureChoice::Ceiling => Self::ceiling(catalog),
            TextureChoice::Blending => Self::blending(catalog),
            TextureChoice::Reflection => Self::reflection(catalog),
        }
    }

    /// Phong with color, occlusion, specular and normal maps
    pub fn stone_floor(catalog: &AssetCatalog) -> Self {
        let keys = catalog.stone_floor();
        Self {
            shininess: 50.0,
            maps: TextureMaps {
                color: Some(keys.base),
                ambient_occlusion: Some(keys.ambient_occlusion),
                specular: Some(keys.height),
                normal: Some(keys.normal),
                ..TextureMaps::default()
            },
            ..Self::default()
        }
    }

    /// Metallic/roughness with its full map set
    pub fn ceiling(catalog: &AssetCatalog) -> Self {
        let keys = catalog.ceiling();
        Self {
            shading: Shading::Standard,
            roughness: 0.2,
            metalness: 0.2,
            maps: TextureMaps {
                color: Some(keys.base),
                roughness: Some(keys.roughness),
                metalness: Some(keys.metallic),
                normal: Some(keys.normal),
                ..TextureMaps::default()
            },
            double_sided: false,
            ..Self::default()
        }
    }

    /// Unlit image multiplied onto whatever is behind it
    pub fn blending(catalog: &AssetCatalog) -> Self {
        Self {
            shading: Shading::Basic,
            blending: Blending::Multiply,
            maps: TextureMaps {
                color: Some(catalog.shells()),
                ..TextureMaps::default()
            },
            ..Self::default()
        }
    }

    /// Phong surface mirroring the environment cube map
    pub fn reflection(catalog: &AssetCatalog) -> Self {
        Self {
            env_map: Some(catalog.environment()),
            ..Self::default()
        }
    }

    /// Unlit material showing a user supplied image
    pub fn imported(key: AssetKey) -> Self {
        Self {
            shading: Shading::Basic,
            maps: TextureMaps {
                color: Some(key),
                ..TextureMaps::default()
            },
            ..Self::default()
        }
    }

    /// Whether the material reacts to lights
    pub fn is_lit(&self) -> bool {
        self.shading != Shading::Basic
    }

    /// Every asset this material needs
    pub fn asset_keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.maps.keys().chain(self.env_map.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_kind_draw_modes() {
        let color = Color::from_hex(0x7a6c6c);
        let wire = Material::for_kind(MaterialKind::Wireframe, color);
        assert_eq!(wire.draw, DrawMode::Wireframe);
        assert_eq!(wire.shading, Shading::Basic);
        assert_eq!(wire.color, color);

        assert_eq!(
            Material::for_kind(MaterialKind::Lines, color).draw,
            DrawMode::LineStrip
        );
        assert_eq!(
            Material::for_kind(MaterialKind::Points, color).draw,
            DrawMode::Points
        );
        assert!(Material::for_kind(MaterialKind::Phong, color).is_lit());
        assert!(!Material::for_kind(MaterialKind::Basic, color).is_lit());
    }

    #[test]
    fn test_presets_reference_assets() {
        let catalog = AssetCatalog::default();

        let stone = Material::stone_floor(&catalog);
        assert_eq!(stone.shininess, 50.0);
        assert_eq!(stone.maps.keys().count(), 4);
        assert_eq!(stone.color, Color::WHITE);

        let ceiling = Material::ceiling(&catalog);
        assert_eq!(ceiling.shading, Shading::Standard);
        assert!(ceiling.maps.metalness.is_some());

        let blend = Material::blending(&catalog);
        assert_eq!(blend.blending, Blending::Multiply);

        let mirror = Material::reflection(&catalog);
        assert_eq!(mirror.env_map, Some(catalog.environment()));
        assert!(mirror.maps.is_empty());
        assert_eq!(mirror.asset_keys().count(), 1);
    }
}
