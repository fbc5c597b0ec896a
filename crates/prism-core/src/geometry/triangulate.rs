//! Polygon triangulation by ear clipping
//!
//! Holes are merged into the outer contour through bridge edges to a
//! mutually visible vertex, then the resulting simple polygon is clipped.

use glam::Vec2;

/// Signed area (positive for counter-clockwise contours)
pub(crate) fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let a = contour[i];
            let b = contour[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

/// Even-odd point in polygon test
pub(crate) fn point_in_polygon(point: Vec2, contour: &[Vec2]) -> bool {
    let n = contour.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (contour[i], contour[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Triangulate a polygon with holes
///
/// Vertex indices of the returned triangles address the concatenation of
/// `outer` followed by every hole in order. Triangles are counter-clockwise
/// whatever the input winding.
pub fn triangulate_polygon(outer: &[Vec2], holes: &[Vec<Vec2>]) -> Vec<[u32; 3]> {
    if outer.len() < 3 {
        return Vec::new();
    }

    let mut points: Vec<Vec2> = outer.to_vec();
    let mut ring: Vec<usize> = (0..outer.len()).collect();
    if signed_area(outer) < 0.0 {
        ring.reverse();
    }

    // Each hole as an index list wound clockwise
    let mut hole_rings: Vec<Vec<usize>> = Vec::new();
    for hole in holes.iter().filter(|h| h.len() >= 3) {
        let start = points.len();
        points.extend_from_slice(hole);
        let mut indices: Vec<usize> = (start..start + hole.len()).collect();
        if signed_area(hole) > 0.0 {
            indices.reverse();
        }
        hole_rings.push(indices);
    }

    // Bridge holes from right to left
    let max_x = |ring: &Vec<usize>| {
        ring.iter()
            .map(|&i| points[i].x)
            .fold(f32::MIN, f32::max)
    };
    hole_rings.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));
    for (k, hole) in hole_rings.iter().enumerate() {
        ring = bridge_hole(&points, ring, hole, &hole_rings[k + 1..]);
    }

    clip_ears(&points, ring)
}

fn bridge_hole(
    points: &[Vec2],
    ring: Vec<usize>,
    hole: &[usize],
    pending: &[Vec<usize>],
) -> Vec<usize> {
    // Rightmost hole vertex
    let Some((hole_pos, &hole_vertex)) = hole
        .iter()
        .enumerate()
        .max_by(|a, b| points[*a.1].x.total_cmp(&points[*b.1].x))
    else {
        return ring;
    };
    let m = points[hole_vertex];

    // Candidate ring vertices, nearest first
    let mut candidates: Vec<usize> = (0..ring.len()).collect();
    candidates.sort_by(|&a, &b| {
        let da = points[ring[a]].distance_squared(m);
        let db = points[ring[b]].distance_squared(m);
        da.total_cmp(&db)
    });

    let visible = |target: Vec2| {
        let crosses = |contour: &[usize]| {
            let n = contour.len();
            (0..n).any(|i| {
                let a = points[contour[i]];
                let b = points[contour[(i + 1) % n]];
                segments_cross(m, target, a, b)
            })
        };
        !crosses(&ring) && !crosses(hole) && !pending.iter().any(|p| crosses(p))
    };

    let bridge = candidates
        .iter()
        .copied()
        .find(|&c| visible(points[ring[c]]))
        .unwrap_or(candidates[0]);

    // ring[..=bridge], hole starting at its rightmost vertex, back to the hole start, ring[bridge..]
    let mut merged = Vec::with_capacity(ring.len() + hole.len() + 2);
    merged.extend_from_slice(&ring[..=bridge]);
    for k in 0..=hole.len() {
        merged.push(hole[(hole_pos + k) % hole.len()]);
    }
    merged.extend_from_slice(&ring[bridge..]);
    merged
}

/// Proper intersection of segments (p1, p2) and (q1, q2), ignoring shared endpoints
fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    const EPS: f32 = 1e-7;
    if p1.distance_squared(q1) < EPS
        || p1.distance_squared(q2) < EPS
        || p2.distance_squared(q1) < EPS
        || p2.distance_squared(q2) < EPS
    {
        return false;
    }
    let d1 = cross(q2 - q1, p1 - q1);
    let d2 = cross(q2 - q1, p2 - q1);
    let d3 = cross(p2 - p1, q1 - p1);
    let d4 = cross(p2 - p1, q2 - p1);
    ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

fn clip_ears(points: &[Vec2], mut ring: Vec<usize>) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();
        let ear = (0..n).find(|&i| is_ear(points, &ring, i));
        // Degenerate input: clip any convex corner to guarantee progress
        let i = ear
            .or_else(|| (0..n).find(|&i| corner(points, &ring, i) > 0.0))
            .unwrap_or(0);
        let prev = ring[(i + n - 1) % n];
        let next = ring[(i + 1) % n];
        triangles.push([prev as u32, ring[i] as u32, next as u32]);
        ring.remove(i);
    }
    if ring.len() == 3 {
        triangles.push([ring[0] as u32, ring[1] as u32, ring[2] as u32]);
    }
    triangles
}

fn corner(points: &[Vec2], ring: &[usize], i: usize) -> f32 {
    let n = ring.len();
    let a = points[ring[(i + n - 1) % n]];
    let b = points[ring[i]];
    let c = points[ring[(i + 1) % n]];
    cross(b - a, c - b)
}

fn is_ear(points: &[Vec2], ring: &[usize], i: usize) -> bool {
    let n = ring.len();
    let ia = ring[(i + n - 1) % n];
    let ib = ring[i];
    let ic = ring[(i + 1) % n];
    let (a, b, c) = (points[ia], points[ib], points[ic]);

    if cross(b - a, c - b) <= 0.0 {
        return false;
    }

    ring.iter().all(|&j| {
        if j == ia || j == ib || j == ic {
            return true;
        }
        let p = points[j];
        // Bridge duplicates share positions with the corners
        if p == a || p == b || p == c {
            return true;
        }
        !point_in_triangle(p, a, b, c)
    })
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    cross(b - a, p - a) >= 0.0 && cross(c - b, p - b) >= 0.0 && cross(a - c, p - c) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ]
    }

    fn area_of(points: &[Vec2], triangles: &[[u32; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| points[i as usize]);
                cross(b - a, c - a) * 0.5
            })
            .sum()
    }

    #[test]
    fn test_square() {
        let outer = square(0.0, 1.0);
        let triangles = triangulate_polygon(&outer, &[]);
        assert_eq!(triangles.len(), 2);
        assert!((area_of(&outer, &triangles) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clockwise_input_yields_ccw_triangles() {
        let mut outer = square(0.0, 2.0);
        outer.reverse();
        let triangles = triangulate_polygon(&outer, &[]);
        assert!((area_of(&outer, &triangles) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_concave_polygon() {
        // L shape
        let outer = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        let triangles = triangulate_polygon(&outer, &[]);
        assert_eq!(triangles.len(), 4);
        assert!((area_of(&outer, &triangles) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_square_with_hole() {
        let outer = square(0.0, 4.0);
        let hole = square(1.0, 3.0);
        let triangles = triangulate_polygon(&outer, &[hole.clone()]);
        let mut points = outer.clone();
        points.extend_from_slice(&hole);
        assert!((area_of(&points, &triangles) - 12.0).abs() < 1e-4);
        assert!(triangles.iter().all(|t| {
            let [a, b, c] = t.map(|i| points[i as usize]);
            cross(b - a, c - a) >= 0.0
        }));
    }

    #[test]
    fn test_point_in_polygon() {
        let outer = square(0.0, 1.0);
        assert!(point_in_polygon(Vec2::new(0.5, 0.5), &outer));
        assert!(!point_in_polygon(Vec2::new(1.5, 0.5), &outer));
    }
}
