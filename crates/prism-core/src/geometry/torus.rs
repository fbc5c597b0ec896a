//! Torus and torus knot mesh generation

use std::f32::consts::PI;

use glam::Vec3;

use super::Geometry;

/// Generate a torus lying in the XY plane
///
/// # Arguments
/// * `radius` - Distance from the center to the tube center
/// * `tube` - Tube radius
/// * `radial_segments` - Segments around the tube
/// * `tubular_segments` - Segments around the ring
/// * `arc` - Swept angle of the ring (`2π` for a closed torus)
pub fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
    arc: f32,
) -> Geometry {
    let radial = radial_segments.max(2);
    let tubular = tubular_segments.max(3);
    let mut geometry = Geometry::empty("Torus");

    for j in 0..=radial {
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * arc;
            let v = j as f32 / radial as f32 * 2.0 * PI;

            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);

            geometry.positions.push(position.to_array());
            geometry
                .normals
                .push((position - center).normalize_or(Vec3::Z).to_array());
            geometry
                .uvs
                .push([i as f32 / tubular as f32, 1.0 - j as f32 / radial as f32]);
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    geometry
}

/// Generate a (p, q) torus knot
pub fn generate_torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> Geometry {
    let tubular = tubular_segments.max(3);
    let radial = radial_segments.max(3);
    let (p, q) = (p as f32, q as f32);
    let mut geometry = Geometry::empty("Torus Knot");

    let curve = |u: f32| -> Vec3 {
        let q_over_p = q / p * u;
        let cs = q_over_p.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * 0.5 * u.sin(),
            radius * q_over_p.sin() * 0.5,
        )
    };

    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * p * 2.0 * PI;
        let p1 = curve(u);
        let p2 = curve(u + 0.01);

        // Frame of the tube cross-section
        let tangent = p2 - p1;
        let mut normal = p2 + p1;
        let binormal = tangent.cross(normal).normalize();
        normal = binormal.cross(tangent).normalize();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * 2.0 * PI;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let position = p1 + normal * cx + binormal * cy;

            geometry.positions.push(position.to_array());
            geometry
                .normals
                .push((position - p1).normalize_or(Vec3::Z).to_array());
            geometry
                .uvs
                .push([i as f32 / tubular as f32, 1.0 - j as f32 / radial as f32]);
        }
    }

    let row = radial + 1;
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torus_extent() {
        let torus = generate_torus(0.8, 0.3, 32, 32, 2.0 * PI);
        assert!(torus.is_valid());
        let (min, max) = torus.bounds().unwrap();
        assert!((max.x - 1.1).abs() < 1e-4);
        assert!((min.x + 1.1).abs() < 1e-4);
        assert!((max.z - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_torus_normals_point_away_from_tube_center() {
        let torus = generate_torus(1.0, 0.25, 8, 16, 2.0 * PI);
        for (p, n) in torus.positions.iter().zip(&torus.normals) {
            let p = Vec3::from_array(*p);
            let ring = Vec3::new(p.x, p.y, 0.0).normalize();
            let tube_center = ring * 1.0;
            let expected = (p - tube_center).normalize();
            assert!(expected.dot(Vec3::from_array(*n)) > 0.99);
        }
    }

    #[test]
    fn test_torus_knot_is_valid() {
        let knot = generate_torus_knot(0.7, 0.2, 64, 8, 2, 3);
        assert!(knot.is_valid());
        assert_eq!(knot.triangle_count(), 64 * 8 * 2);
    }
}
