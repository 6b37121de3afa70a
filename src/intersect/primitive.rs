// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Segment-triangle intersection predicate
//!
//! The crossing must be strict on both counts: the segment endpoints lie
//! on opposite sides of the supporting plane (an endpoint exactly on the
//! plane is a grazing reject), and the hit point lies strictly inside the
//! triangle (a cut on an edge or corner is rejected). Callers treat a None
//! as "no intersection".

use crate::geometry::Plane;
use nalgebra::Point3;

/// Which way the segment crosses the pierced triangle's outward normal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossSide {
    /// From the outside half-space to the inside
    Entering,
    /// From the inside half-space to the outside
    Exiting,
}

/// A strict segment-triangle crossing
#[derive(Debug, Clone, Copy)]
pub struct SegmentHit {
    pub pos: Point3<f64>,
    /// Parameter of the crossing along p1 -> p2, in (0, 1)
    pub s: f64,
    pub side: CrossSide,
}

/// Intersect the segment p1 -> p2 with a triangle given by its corners
/// and supporting plane, all in the triangle's local frame.
pub fn segment_triangle(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    corners: &[Point3<f64>; 3],
    plane: &Plane,
    interior_eps: f64,
) -> Option<SegmentHit> {
    let d1 = plane.signed_distance(p1);
    let d2 = plane.signed_distance(p2);

    // strict crossing; an endpoint on the plane grazes
    if d1 * d2 >= 0.0 {
        return None;
    }

    let s = d1 / (d1 - d2);
    let pos = p1 + (p2 - p1) * s;

    // project along the dominant normal axis for the interior test
    let n = plane.normal;
    let abs = n.map(|x| x.abs());
    let axis = if abs.x > abs.y && abs.x > abs.z {
        0
    } else if abs.y > abs.z {
        1
    } else {
        2
    };
    let uv = |p: &Point3<f64>| -> (f64, f64) {
        match axis {
            0 => (p.y, p.z),
            1 => (p.x, p.z),
            _ => (p.x, p.y),
        }
    };

    let (px, py) = uv(&pos);
    let (v0x, v0y) = uv(&corners[0]);
    let (v1x, v1y) = uv(&corners[1]);
    let (v2x, v2y) = uv(&corners[2]);

    let denom = (v1y - v2y) * (v0x - v2x) + (v2x - v1x) * (v0y - v2y);
    if denom.abs() < 1e-14 {
        return None;
    }

    let a = ((v1y - v2y) * (px - v2x) + (v2x - v1x) * (py - v2y)) / denom;
    let b = ((v2y - v0y) * (px - v2x) + (v0x - v2x) * (py - v2y)) / denom;
    let c = 1.0 - a - b;

    // strictly interior; hits on an edge or corner are rejected
    if a <= interior_eps || b <= interior_eps || c <= interior_eps {
        return None;
    }

    let side = if d1 > 0.0 {
        CrossSide::Entering
    } else {
        CrossSide::Exiting
    };

    Some(SegmentHit { pos, s, side })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f64 = 1e-6;

    fn xy_triangle() -> ([Point3<f64>; 3], Plane) {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let plane = Plane::from_points(&corners[0], &corners[1], &corners[2]).unwrap();
        (corners, plane)
    }

    #[test]
    fn test_straight_crossing() {
        let (corners, plane) = xy_triangle();
        // normal is +z: starting above the plane means crossing inward
        let hit = segment_triangle(
            &Point3::new(0.5, 0.5, 1.0),
            &Point3::new(0.5, 0.5, -3.0),
            &corners,
            &plane,
            EPS,
        )
        .unwrap();
        assert_relative_eq!(hit.s, 0.25, epsilon = 1e-12);
        assert_relative_eq!(hit.pos, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        assert_eq!(hit.side, CrossSide::Entering);
    }

    #[test]
    fn test_side_follows_direction() {
        let (corners, plane) = xy_triangle();
        // coming from below leaves through the outside half-space
        let hit = segment_triangle(
            &Point3::new(0.5, 0.5, -1.0),
            &Point3::new(0.5, 0.5, 1.0),
            &corners,
            &plane,
            EPS,
        )
        .unwrap();
        assert_eq!(hit.side, CrossSide::Exiting);
    }

    #[test]
    fn test_endpoint_on_plane_grazes() {
        let (corners, plane) = xy_triangle();
        assert!(segment_triangle(
            &Point3::new(0.5, 0.5, 0.0),
            &Point3::new(0.5, 0.5, 1.0),
            &corners,
            &plane,
            EPS,
        )
        .is_none());
    }

    #[test]
    fn test_same_side_misses() {
        let (corners, plane) = xy_triangle();
        assert!(segment_triangle(
            &Point3::new(0.5, 0.5, 0.5),
            &Point3::new(0.5, 0.5, 2.0),
            &corners,
            &plane,
            EPS,
        )
        .is_none());
    }

    #[test]
    fn test_hit_outside_triangle_misses() {
        let (corners, plane) = xy_triangle();
        assert!(segment_triangle(
            &Point3::new(1.9, 1.9, 1.0),
            &Point3::new(1.9, 1.9, -1.0),
            &corners,
            &plane,
            EPS,
        )
        .is_none());
    }

    #[test]
    fn test_hit_on_edge_rejected() {
        let (corners, plane) = xy_triangle();
        // crossing exactly on the hypotenuse midpoint
        assert!(segment_triangle(
            &Point3::new(1.0, 1.0, 1.0),
            &Point3::new(1.0, 1.0, -1.0),
            &corners,
            &plane,
            EPS,
        )
        .is_none());
    }

    #[test]
    fn test_hit_through_vertex_rejected() {
        let (corners, plane) = xy_triangle();
        assert!(segment_triangle(
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::new(0.0, 0.0, -1.0),
            &corners,
            &plane,
            EPS,
        )
        .is_none());
    }
}
