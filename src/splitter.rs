// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Planar polygon triangulation
//!
//! Clipped triangles are replaced by polygons that must be re-triangulated
//! in the supporting plane of the original triangle. The splitter is a
//! value: construct one per polygon, feed it the boundary in order, then
//! connect. A boundary that crosses itself is reported back to the caller
//! instead of being triangulated.

use crate::error::ZipperError;
use nalgebra::{Point3, Vector3};

/// Triangulates one planar polygon via ear clipping
#[derive(Debug)]
pub struct PlanarSplitter {
    u: Vector3<f64>,
    v: Vector3<f64>,
    points: Vec<(f64, f64)>,
    ids: Vec<usize>,
}

impl PlanarSplitter {
    /// Build a splitter for the plane a x + b y + c z + d = 0. Fails when
    /// the normal is near zero. The offset only positions the plane, so it
    /// does not enter the in-plane basis.
    pub fn new(a: f64, b: f64, c: f64, _d: f64) -> Result<Self, ZipperError> {
        let normal = Vector3::new(a, b, c);
        let len = normal.norm();
        if len < 1e-12 {
            return Err(ZipperError::DegeneratePlane(a, b, c));
        }
        let n = normal / len;

        // in-plane basis from the axis least aligned with the normal
        let axis = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
            Vector3::x()
        } else if n.y.abs() <= n.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let u = axis.cross(&n).normalize();
        let v = n.cross(&u);

        Ok(Self {
            u,
            v,
            points: Vec::new(),
            ids: Vec::new(),
        })
    }

    /// Append a boundary vertex. `id` is echoed back in the output
    /// triples; boundary order defines the polygon.
    pub fn add_boundary_point(&mut self, pos: &Point3<f64>, id: usize) {
        self.points
            .push((pos.coords.dot(&self.u), pos.coords.dot(&self.v)));
        self.ids.push(id);
    }

    /// Triangulate the boundary. Returns triangles as id triples with the
    /// winding of the input boundary, or an error when the boundary
    /// self-intersects or no ear can be found.
    pub fn connect(&self) -> Result<Vec<[usize; 3]>, ZipperError> {
        let n = self.points.len();
        if n < 3 {
            return Ok(Vec::new());
        }
        if self.boundary_self_intersects() {
            return Err(ZipperError::SelfIntersecting(n));
        }

        // work on an index ring, reversed if the boundary is clockwise
        let mut ring: Vec<usize> = (0..n).collect();
        let reversed = self.signed_area() < 0.0;
        if reversed {
            ring.reverse();
        }

        let eps = self.area_epsilon();
        let mut tris = Vec::with_capacity(n - 2);

        while ring.len() > 3 {
            let m = ring.len();
            let Some(ear) = (0..m).find(|&i| self.is_ear(&ring, i, eps)) else {
                return Err(ZipperError::SelfIntersecting(n));
            };
            let tri = [
                ring[(ear + m - 1) % m],
                ring[ear],
                ring[(ear + 1) % m],
            ];
            tris.push(self.emit(tri, reversed));
            ring.remove(ear);
        }
        tris.push(self.emit([ring[0], ring[1], ring[2]], reversed));
        Ok(tris)
    }

    fn emit(&self, tri: [usize; 3], reversed: bool) -> [usize; 3] {
        if reversed {
            [self.ids[tri[2]], self.ids[tri[1]], self.ids[tri[0]]]
        } else {
            [self.ids[tri[0]], self.ids[tri[1]], self.ids[tri[2]]]
        }
    }

    fn signed_area(&self) -> f64 {
        let n = self.points.len();
        let mut sum = 0.0;
        for i in 0..n {
            let (x1, y1) = self.points[i];
            let (x2, y2) = self.points[(i + 1) % n];
            sum += x1 * y2 - x2 * y1;
        }
        0.5 * sum
    }

    fn area_epsilon(&self) -> f64 {
        let mut extent: f64 = 0.0;
        for &(x, y) in &self.points {
            extent = extent.max(x.abs()).max(y.abs());
        }
        (extent * extent).max(1.0) * 1e-12
    }

    /// Vertex `i` of the ring is an ear when the corner is convex and no
    /// other ring vertex lies inside the corner triangle.
    fn is_ear(&self, ring: &[usize], i: usize, eps: f64) -> bool {
        let m = ring.len();
        let a = self.points[ring[(i + m - 1) % m]];
        let b = self.points[ring[i]];
        let c = self.points[ring[(i + 1) % m]];

        if cross2(a, b, c) <= eps {
            return false;
        }

        ring.iter().enumerate().all(|(j, &pi)| {
            if j == (i + m - 1) % m || j == i || j == (i + 1) % m {
                return true;
            }
            let p = self.points[pi];
            let s1 = cross2(a, b, p);
            let s2 = cross2(b, c, p);
            let s3 = cross2(c, a, p);
            // strictly outside at least one supporting line
            s1 < -eps || s2 < -eps || s3 < -eps
        })
    }

    fn boundary_self_intersects(&self) -> bool {
        let n = self.points.len();
        for i in 0..n {
            for j in i + 1..n {
                // skip the shared-endpoint pairs
                if j == i || (j + 1) % n == i || (i + 1) % n == j {
                    continue;
                }
                let (a, b) = (self.points[i], self.points[(i + 1) % n]);
                let (c, d) = (self.points[j], self.points[(j + 1) % n]);
                if segments_cross(a, b, c, d) {
                    return true;
                }
            }
        }
        false
    }
}

fn cross2(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Proper (strict) 2D segment crossing
fn segments_cross(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let d1 = cross2(c, d, a);
    let d2 = cross2(c, d, b);
    let d3 = cross2(a, b, c);
    let d4 = cross2(a, b, d);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}
