//! Procedural geometry for the primary object and the ground disk
//!
//! Generates positions, normals, texture coordinates and triangle indices for:
//! - Sphere (UV sphere)
//! - Box
//! - Cone and cylinder (with caps)
//! - Torus ("wheel") and torus knot
//! - Teapot (lathe body and lid, swept spout and handle)
//! - Icosahedron (flat shaded)
//! - Circle (ground disk)
//! - Extruded text from a typeface font

mod box_mesh;
mod circle;
mod cylinder;
mod icosahedron;
mod sphere;
mod teapot;
mod text;
mod torus;
mod triangulate;

use std::collections::HashSet;

use glam::{Mat3, Mat4, Vec3};
use uuid::Uuid;

use crate::settings::Shape;

pub use box_mesh::generate_box;
pub use circle::generate_circle;
pub use cylinder::{generate_cone, generate_cylinder};
pub use icosahedron::generate_icosahedron;
pub use sphere::generate_sphere;
pub use teapot::generate_teapot;
pub use text::{FontError, Glyph, Typeface, generate_text};
pub use torus::{generate_torus, generate_torus_knot};
pub use triangulate::triangulate_polygon;

/// Identity of a geometry buffer (stable across clones, used for GPU caching)
pub type GeometryId = Uuid;

/// Indexed triangle geometry
#[derive(Debug, Clone)]
pub struct Geometry {
    pub id: GeometryId,
    pub label: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates with `v` growing down the image
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn new(
        label: impl Into<String>,
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        uvs: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            positions,
            normals,
            uvs,
            indices,
        }
    }

    /// Empty geometry used as a builder target
    pub fn empty(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether all attribute arrays agree and every index is in range
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len();
        self.normals.len() == n
            && self.uvs.len() == n
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Unique triangle edges, used by the wireframe draw mode
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    edges.push([a, b]);
                }
            }
        }
        edges
    }

    /// Axis-aligned bounds, `None` when empty
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Radius of the sphere around the bounds center enclosing every vertex
    pub fn bounding_radius(&self) -> f32 {
        let Some((min, max)) = self.bounds() else {
            return 0.0;
        };
        let center = (min + max) * 0.5;
        self.positions
            .iter()
            .map(|p| Vec3::from_array(*p).distance(center))
            .fold(0.0, f32::max)
    }

    /// Recompute smooth per-vertex normals from triangle faces
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from_array(self.positions[a]);
            let pb = Vec3::from_array(self.positions[b]);
            let pc = Vec3::from_array(self.positions[c]);
            // Area weighted
            let face = (pb - pa).cross(pc - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.normalize_or(Vec3::Y).to_array())
            .collect();
    }

    /// Append another geometry's vertices and triangles
    pub fn append(&mut self, other: &Geometry) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Transform positions and normals in place
    pub fn apply_matrix(&mut self, matrix: Mat4) {
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        for p in &mut self.positions {
            *p = matrix.transform_point3(Vec3::from_array(*p)).to_array();
        }
        for n in &mut self.normals {
            *n = (normal_matrix * Vec3::from_array(*n))
                .normalize_or(Vec3::Y)
                .to_array();
        }
    }

    /// Center the bounds on the origin and scale so the bounding radius is `radius`
    pub fn normalize_to_radius(&mut self, radius: f32) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let center = (min + max) * 0.5;
        let current = self.bounding_radius();
        let scale = if current > f32::EPSILON {
            radius / current
        } else {
            1.0
        };
        self.apply_matrix(Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-center));
    }
}

/// Build the geometry of a procedural shape
///
/// Returns `None` for [`Shape::Text`], whose geometry depends on a loaded font.
pub fn primitive(shape: Shape) -> Option<Geometry> {
    use std::f32::consts::PI;

    let geometry = match shape {
        Shape::Sphere => generate_sphere(1.0, 32, 32),
        Shape::Box => generate_box(1.3, 1.3, 1.3),
        Shape::Cone => generate_cone(1.0, 2.0, 16),
        Shape::Cylinder => generate_cylinder(1.0, 1.0, 1.5, 32),
        Shape::Wheel => generate_torus(0.8, 0.3, 32, 32, 2.0 * PI),
        Shape::Teapot => generate_teapot(0.5, 16),
        Shape::Knot => generate_torus_knot(0.7, 0.2, 128, 32, 2, 3),
        Shape::Icosahedron => generate_icosahedron(1.0),
        Shape::Text => return None,
    };
    Some(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_procedural_shape_is_valid() {
        for shape in Shape::ALL {
            let Some(geometry) = primitive(shape) else {
                assert_eq!(shape, Shape::Text);
                continue;
            };
            assert!(geometry.is_valid(), "{shape:?} has inconsistent buffers");
            assert!(geometry.triangle_count() > 0, "{shape:?} has no triangles");
        }
    }

    #[test]
    fn test_edges_are_unique() {
        let geometry = generate_box(1.0, 1.0, 1.0);
        let edges = geometry.edges();
        // 6 faces * (4 outline + 1 diagonal)
        assert_eq!(edges.len(), 30);
    }

    #[test]
    fn test_bounds_of_box() {
        let geometry = generate_box(2.0, 4.0, 6.0);
        let (min, max) = geometry.bounds().unwrap();
        let size = max - min;
        assert!((size.x - 2.0).abs() < 1e-5);
        assert!((size.y - 4.0).abs() < 1e-5);
        assert!((size.z - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_to_radius() {
        let mut geometry = generate_sphere(3.0, 8, 8);
        geometry.apply_matrix(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        geometry.normalize_to_radius(1.0);
        let (min, max) = geometry.bounds().unwrap();
        assert!(((min + max) * 0.5).length() < 1e-4);
        assert!((geometry.bounding_radius() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut a = generate_box(1.0, 1.0, 1.0);
        let b = generate_box(1.0, 1.0, 1.0);
        let count = a.vertex_count() as u32;
        a.append(&b);
        assert!(a.is_valid());
        assert_eq!(a.triangle_count(), 24);
        assert!(a.indices[36..].iter().all(|&i| i >= count));
    }
}
