//! Polygon triangulation for PLY faces.
//!
//! Faces with more than three corners are split into triangles by ear
//! clipping in a 2D projection of the polygon. A polygon with `n` corners
//! always yields exactly `n - 2` triangles, so triangle counts can be known
//! before any triangulation happens.

use glam::{Vec2, Vec3};
use tracing::{debug, trace};

/// Axis-aligned plane a polygon is projected onto before ear clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionPlane {
    XY,
    XZ,
    YZ,
}

impl ProjectionPlane {
    /// Drop the dominant axis of `normal`.
    pub fn from_normal(normal: Vec3) -> Self {
        let n = normal.abs();
        if n.z >= n.x && n.z >= n.y {
            ProjectionPlane::XY
        } else if n.y >= n.x && n.y >= n.z {
            ProjectionPlane::XZ
        } else {
            ProjectionPlane::YZ
        }
    }

    pub fn project(self, p: Vec3) -> Vec2 {
        match self {
            ProjectionPlane::XY => Vec2::new(p.x, p.y),
            ProjectionPlane::XZ => Vec2::new(p.x, p.z),
            ProjectionPlane::YZ => Vec2::new(p.y, p.z),
        }
    }
}

/// Newell normal of a polygon; not normalized.
pub fn polygon_normal(corners: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, a) in corners.iter().enumerate() {
        let b = corners[(i + 1) % corners.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Pick the projection plane that best preserves the shape of a polygon.
pub fn best_projection_plane(corners: &[Vec3]) -> ProjectionPlane {
    if corners.len() < 3 {
        return ProjectionPlane::XY;
    }
    ProjectionPlane::from_normal(polygon_normal(corners))
}

/// Triangulate one face given as vertex indices into `positions`.
///
/// Triangles are appended to `out` as vertex indices; returns how many were
/// added. Callers must ensure every index is in range.
pub fn triangulate_polygon(polygon: &[u32], positions: &[Vec3], out: &mut Vec<[u32; 3]>) -> usize {
    match polygon.len() {
        0..=2 => 0,
        3 => {
            out.push([polygon[0], polygon[1], polygon[2]]);
            1
        }
        4 => {
            let p = |i: usize| positions[polygon[i] as usize];
            // Split along the shorter diagonal.
            if p(0).distance_squared(p(2)) <= p(1).distance_squared(p(3)) {
                out.push([polygon[0], polygon[1], polygon[2]]);
                out.push([polygon[0], polygon[2], polygon[3]]);
            } else {
                out.push([polygon[0], polygon[1], polygon[3]]);
                out.push([polygon[1], polygon[2], polygon[3]]);
            }
            2
        }
        _ => ear_clip(polygon, positions, out),
    }
}

fn ear_clip(polygon: &[u32], positions: &[Vec3], out: &mut Vec<[u32; 3]>) -> usize {
    let corners: Vec<Vec3> = polygon.iter().map(|&i| positions[i as usize]).collect();
    let plane = best_projection_plane(&corners);
    let points: Vec<Vec2> = corners.iter().map(|&c| plane.project(c)).collect();

    // Orientation of the projected outline; ears must turn the same way.
    let winding = signed_area(&points).signum();
    let winding = if winding == 0.0 { 1.0 } else { winding };

    let mut remaining: Vec<usize> = (0..polygon.len()).collect();
    let start = out.len();

    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            let (a, b, c) = (remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]);
            is_ear(&points, &remaining, a, b, c, winding)
        });

        let Some(i) = ear else {
            trace!("No ear found in {}-gon, fanning the remainder", n);
            break;
        };

        let (a, b, c) = (remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]);
        out.push([polygon[a], polygon[b], polygon[c]]);
        remaining.remove(i);
    }

    for pair in remaining[1..].windows(2) {
        out.push([polygon[remaining[0]], polygon[pair[0]], polygon[pair[1]]]);
    }

    let added = out.len() - start;
    debug!("Triangulated {}-gon into {} triangles (plane: {:?})", polygon.len(), added, plane);
    added
}

fn signed_area(points: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        area += a.perp_dot(b);
    }
    area * 0.5
}

fn is_ear(points: &[Vec2], remaining: &[usize], a: usize, b: usize, c: usize, winding: f32) -> bool {
    let (pa, pb, pc) = (points[a], points[b], points[c]);
    if (pb - pa).perp_dot(pc - pb) * winding <= 0.0 {
        return false;
    }

    !remaining
        .iter()
        .filter(|&&r| r != a && r != b && r != c)
        .any(|&r| point_in_triangle(points[r], pa, pb, pc))
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d0 = (b - a).perp_dot(p - a);
    let d1 = (c - b).perp_dot(p - b);
    let d2 = (a - c).perp_dot(p - c);
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_of(triangles: &[[u32; 3]], positions: &[Vec3]) -> f32 {
        triangles
            .iter()
            .map(|t| {
                let (a, b, c) = (positions[t[0] as usize], positions[t[1] as usize], positions[t[2] as usize]);
                (b - a).cross(c - a).length() * 0.5
            })
            .sum()
    }

    #[test]
    fn test_triangle_passthrough() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let mut out = Vec::new();
        assert_eq!(triangulate_polygon(&[2, 0, 1], &positions, &mut out), 1);
        assert_eq!(out, vec![[2, 0, 1]]);
    }

    #[test]
    fn test_degenerate_faces_produce_nothing() {
        let positions = vec![Vec3::ZERO, Vec3::X];
        let mut out = Vec::new();
        assert_eq!(triangulate_polygon(&[], &positions, &mut out), 0);
        assert_eq!(triangulate_polygon(&[0, 1], &positions, &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_quad_splits_on_shorter_diagonal() {
        // Kite: the 1-3 diagonal is much shorter than 0-2.
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, -0.5, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(2.0, 0.5, 0.0),
        ];
        let mut out = Vec::new();
        assert_eq!(triangulate_polygon(&[0, 1, 2, 3], &positions, &mut out), 2);
        assert_eq!(out, vec![[0, 1, 3], [1, 2, 3]]);
    }

    #[test]
    fn test_concave_polygon_ear_clipping() {
        // L-shape in the XZ plane, area 3.
        let positions = vec![
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
        ];
        let polygon = [0, 1, 2, 3, 4, 5];
        let mut out = Vec::new();
        assert_eq!(triangulate_polygon(&polygon, &positions, &mut out), 4);
        assert!((area_of(&out, &positions) - 3.0).abs() < 1e-5);
        for t in &out {
            for &i in t {
                assert!(polygon.contains(&i));
            }
        }
    }

    #[test]
    fn test_collinear_polygon_still_yields_n_minus_two() {
        let positions: Vec<Vec3> = (0..6).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let mut out = Vec::new();
        assert_eq!(triangulate_polygon(&[0, 1, 2, 3, 4, 5], &positions, &mut out), 4);
    }

    #[test]
    fn test_best_projection_plane() {
        let xz = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 0.1, 1.0), Vec3::Z];
        assert_eq!(best_projection_plane(&xz), ProjectionPlane::XZ);

        let yz = vec![Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 1.0, 1.0), Vec3::Z];
        assert_eq!(best_projection_plane(&yz), ProjectionPlane::YZ);

        assert_eq!(best_projection_plane(&[]), ProjectionPlane::XY);
    }

    #[test]
    fn test_regular_polygon() {
        let positions: Vec<Vec3> = (0..12)
            .map(|i| {
                let angle = (i as f32) * 2.0 * std::f32::consts::PI / 12.0;
                Vec3::new(angle.cos(), angle.sin(), 3.0)
            })
            .collect();
        let polygon: Vec<u32> = (0..12).collect();
        let mut out = Vec::new();
        assert_eq!(triangulate_polygon(&polygon, &positions, &mut out), 10);
        // Area of a regular 12-gon with unit circumradius is 3.
        assert!((area_of(&out, &positions) - 3.0).abs() < 1e-4);
    }
}
