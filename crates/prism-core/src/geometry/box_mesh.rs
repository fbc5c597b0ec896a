//! Box mesh generation

use glam::Vec3;

use super::Geometry;

/// Generate an axis-aligned box centered at the origin
///
/// Each face gets its own four vertices so normals and texture
/// coordinates stay flat per face.
pub fn generate_box(width: f32, height: f32, depth: f32) -> Geometry {
    let half = Vec3::new(width, height, depth) * 0.5;

    // (normal, u axis, v axis) with u x v == normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u_axis, v_axis) in faces {
        let base = positions.len() as u32;
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        for (su, sv) in corners {
            let p = (normal + u_axis * su + v_axis * sv) * half;
            positions.push(p.to_array());
            normals.push(normal.to_array());
            uvs.push([(su + 1.0) * 0.5, (1.0 - sv) * 0.5]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry::new("Box", positions, normals, uvs, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_counts() {
        let mesh = generate_box(1.0, 1.0, 1.0);
        assert_eq!(mesh.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(mesh.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
    }

    #[test]
    fn test_box_winding_matches_normals() {
        let mesh = generate_box(1.3, 1.3, 1.3);
        for tri in mesh.indices.chunks_exact(3) {
            let a = Vec3::from_array(mesh.positions[tri[0] as usize]);
            let b = Vec3::from_array(mesh.positions[tri[1] as usize]);
            let c = Vec3::from_array(mesh.positions[tri[2] as usize]);
            let face = (b - a).cross(c - a).normalize();
            let normal = Vec3::from_array(mesh.normals[tri[0] as usize]);
            assert!(face.dot(normal) > 0.99);
        }
    }
}
