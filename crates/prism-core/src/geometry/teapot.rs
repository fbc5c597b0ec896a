//! Procedural teapot
//!
//! Body and lid are one surface of revolution; spout and handle are tubes
//! swept along Bezier paths.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use super::Geometry;

/// Body and lid profile as (radius, height), bottom to top, at size 0.5
const PROFILE: [[f32; 2]; 19] = [
    [0.0, -0.75],
    [0.55, -0.75],
    [0.8, -0.72],
    [0.98, -0.6],
    [1.1, -0.38],
    [1.15, -0.12],
    [1.12, 0.12],
    [1.04, 0.34],
    [0.94, 0.5],
    [0.88, 0.58],
    [0.8, 0.64],
    [0.55, 0.7],
    [0.25, 0.76],
    [0.12, 0.8],
    [0.1, 0.88],
    [0.16, 0.94],
    [0.12, 1.0],
    [0.05, 1.02],
    [0.0, 1.02],
];

const AUTHORED_SIZE: f32 = 0.5;

/// Generate a teapot
///
/// # Arguments
/// * `size` - Scale; 0.5 gives a body about 2.3 units wide
/// * `segments` - Resolution of the lathe and tube sweeps
pub fn generate_teapot(size: f32, segments: u32) -> Geometry {
    let segments = segments.max(4);

    let mut teapot = lathe(&PROFILE, segments * 2);

    let spout_path = sample_quadratic(
        Vec3::new(0.95, -0.25, 0.0),
        Vec3::new(1.6, -0.25, 0.0),
        Vec3::new(1.65, 0.5, 0.0),
        segments,
    );
    let spout_radii: Vec<f32> = (0..spout_path.len())
        .map(|i| 0.26 - 0.15 * i as f32 / (spout_path.len() - 1) as f32)
        .collect();
    teapot.append(&tube(&spout_path, &spout_radii, segments));

    let handle_path = sample_cubic(
        Vec3::new(-0.95, 0.4, 0.0),
        Vec3::new(-1.75, 0.55, 0.0),
        Vec3::new(-1.75, -0.45, 0.0),
        Vec3::new(-1.0, -0.35, 0.0),
        segments,
    );
    let handle_radii = vec![0.07; handle_path.len()];
    teapot.append(&tube(&handle_path, &handle_radii, segments));

    teapot.compute_vertex_normals();
    teapot.apply_matrix(Mat4::from_scale(Vec3::splat(size / AUTHORED_SIZE)));
    teapot.label = "Teapot".to_string();
    teapot
}

/// Surface of revolution of a (radius, height) profile around Y
fn lathe(profile: &[[f32; 2]], segments: u32) -> Geometry {
    let mut geometry = Geometry::empty("Lathe");
    let n = profile.len() as u32;

    for i in 0..=segments {
        let phi = i as f32 / segments as f32 * 2.0 * PI;
        let (sin, cos) = phi.sin_cos();
        for (j, [r, y]) in profile.iter().enumerate() {
            geometry.positions.push([r * sin, *y, r * cos]);
            geometry.normals.push([sin, 0.0, cos]);
            geometry.uvs.push([
                i as f32 / segments as f32,
                1.0 - j as f32 / (n - 1) as f32,
            ]);
        }
    }

    for i in 0..segments {
        for j in 0..n - 1 {
            let a = i * n + j;
            let b = a + n;
            let c = b + 1;
            let d = a + 1;
            geometry.indices.extend_from_slice(&[a, b, d, c, d, b]);
        }
    }

    geometry
}

/// Tube of varying radius swept along a path with parallel-transported frames
fn tube(path: &[Vec3], radii: &[f32], radial_segments: u32) -> Geometry {
    let mut geometry = Geometry::empty("Tube");
    if path.len() < 2 {
        return geometry;
    }

    let last = path.len() - 1;
    let tangent_at = |i: usize| (path[(i + 1).min(last)] - path[i.saturating_sub(1)]).normalize();

    let mut normal = tangent_at(0).any_orthonormal_vector();
    for (i, point) in path.iter().enumerate() {
        let tangent = tangent_at(i);
        normal = (normal - tangent * normal.dot(tangent)).normalize_or(normal);
        let binormal = tangent.cross(normal);

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * 2.0 * PI;
            let dir = normal * -v.cos() + binormal * v.sin();
            geometry
                .positions
                .push((*point + dir * radii[i]).to_array());
            geometry.normals.push(dir.to_array());
            geometry.uvs.push([
                i as f32 / last as f32,
                1.0 - j as f32 / radial_segments as f32,
            ]);
        }
    }

    let row = radial_segments + 1;
    for j in 1..path.len() as u32 {
        for i in 1..=radial_segments {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    geometry
}

fn sample_quadratic(p0: Vec3, p1: Vec3, p2: Vec3, steps: u32) -> Vec<Vec3> {
    (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            let s = 1.0 - t;
            p0 * (s * s) + p1 * (2.0 * s * t) + p2 * (t * t)
        })
        .collect()
}

fn sample_cubic(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, steps: u32) -> Vec<Vec3> {
    (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            let s = 1.0 - t;
            p0 * (s * s * s) + p1 * (3.0 * s * s * t) + p2 * (3.0 * s * t * t) + p3 * (t * t * t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teapot_is_valid() {
        let teapot = generate_teapot(0.5, 16);
        assert!(teapot.is_valid());
        assert!(teapot.triangle_count() > 500);
    }

    #[test]
    fn test_teapot_scales_with_size() {
        let small = generate_teapot(0.5, 8);
        let large = generate_teapot(1.0, 8);
        let ratio = large.bounding_radius() / small.bounding_radius();
        assert!((ratio - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_lathe_faces_outward() {
        let mut body = lathe(&PROFILE, 16);
        body.compute_vertex_normals();
        // Widest ring of the body
        let widest = 5;
        let n = PROFILE.len();
        for i in 0..16 {
            let idx = i * n + widest;
            let p = Vec3::from_array(body.positions[idx]);
            let normal = Vec3::from_array(body.normals[idx]);
            assert!(Vec3::new(p.x, 0.0, p.z).dot(normal) > 0.0);
        }
    }
}
