//! Icosahedron mesh generation (flat shaded)

use std::f32::consts::PI;

use glam::Vec3;

use super::Geometry;

const FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Generate a regular icosahedron with every vertex at `radius`
///
/// Vertices are not shared between faces so each face keeps its own normal.
pub fn generate_icosahedron(radius: f32) -> Geometry {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let corners = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .map(|c| c.normalize() * radius);

    let mut geometry = Geometry::empty("Icosahedron");
    for face in FACES {
        let [a, b, c] = face.map(|i| corners[i]);
        let normal = (b - a).cross(c - a).normalize();
        for p in [a, b, c] {
            let base = geometry.positions.len() as u32;
            geometry.positions.push(p.to_array());
            geometry.normals.push(normal.to_array());
            geometry.uvs.push(spherical_uv(p));
            geometry.indices.push(base);
        }
    }
    geometry
}

fn spherical_uv(p: Vec3) -> [f32; 2] {
    let n = p.normalize();
    let u = n.z.atan2(-n.x) / (2.0 * PI) + 0.5;
    let v = 0.5 - n.y.asin() / PI;
    [u, v]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icosahedron() {
        let mesh = generate_icosahedron(1.0);
        assert!(mesh.is_valid());
        assert_eq!(mesh.triangle_count(), 20);
        assert_eq!(mesh.vertex_count(), 60);
        for p in &mesh.positions {
            assert!((Vec3::from_array(*p).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_faces_point_outward() {
        let mesh = generate_icosahedron(1.0);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!(Vec3::from_array(*p).dot(Vec3::from_array(*n)) > 0.0);
        }
    }
}
