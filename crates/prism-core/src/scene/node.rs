//! Scene nodes

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};
use uuid::Uuid;

use crate::assets::AssetKey;
use crate::color::Color;
use crate::constants::{GROUND_HEIGHT, GROUND_RADIUS, GROUND_SEGMENTS, RESTING_POSITION};
use crate::geometry::{Geometry, generate_circle};
use crate::light::{HelperKind, Light};
use crate::material::Material;

/// Unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Position, XYZ Euler rotation (radians) and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Pose given to every rebuilt primary object
    pub fn resting() -> Self {
        Self {
            position: Vec3::from_array(RESTING_POSITION),
            ..Self::default()
        }
    }

    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }
}

/// A geometry drawn with a material
#[derive(Debug, Clone)]
pub struct Drawable {
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Drawable {
    /// Primary object in its resting pose
    pub fn new(geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            geometry,
            material,
            transform: Transform::resting(),
            cast_shadow: true,
            receive_shadow: false,
        }
    }
}

/// Ground disk under the primary object
#[derive(Debug, Clone)]
pub struct Ground {
    pub geometry: Arc<Geometry>,
    pub color: Color,
    pub map: Option<AssetKey>,
    pub transform: Transform,
    pub receive_shadow: bool,
}

impl Ground {
    pub fn new(color: Color) -> Self {
        Self {
            geometry: Arc::new(generate_circle(GROUND_RADIUS, GROUND_SEGMENTS)),
            color,
            map: None,
            transform: Transform {
                position: Vec3::new(0.0, GROUND_HEIGHT, 0.0),
                rotation: Vec3::new(-FRAC_PI_2, 0.0, 0.0),
                scale: Vec3::ONE,
            },
            receive_shadow: true,
        }
    }

    /// Phong material the ground is drawn with
    pub fn material(&self) -> Material {
        Material {
            color: self.color,
            maps: crate::material::TextureMaps {
                color: self.map.clone(),
                ..Default::default()
            },
            ..Material::default()
        }
    }
}

/// Helper drawn for the light it follows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightHelper {
    pub kind: HelperKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Primary(Drawable),
    Ground(Ground),
    Axes { size: f32 },
    Light(Light),
    LightHelper(LightHelper),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
        }
    }
}

/// What is drawn behind the scene
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Color(Color),
    Texture(AssetKey),
    CubeMap(AssetKey),
}

impl Background {
    pub fn asset(&self) -> Option<&AssetKey> {
        match self {
            Self::Color(_) => None,
            Self::Texture(key) | Self::CubeMap(key) => Some(key),
        }
    }
}
