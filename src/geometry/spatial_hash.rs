// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Uniform spatial subdivision with hashing
//!
//! Vertices are binned into a fixed-size open hash over integer grid
//! cells. A radius query examines the 27 cells around the query point, so
//! the cell size must be at least the query radius for coverage to be
//! exact.

use super::mesh::{Mesh, MeshTag, VertexId};
use super::stamp::StampSet;
use nalgebra::Point3;

const PR1: i64 = 17;
const PR2: i64 = 101;

const TABLE_SIZE1: usize = 5003;
const TABLE_SIZE2: usize = 17003;
const TABLE_SIZE3: usize = 53003;

/// Spatial hash over a mesh's vertices
#[derive(Debug, Clone)]
pub struct SpatialHash {
    scale: f64,
    buckets: Vec<Vec<VertexId>>,
    npoints: usize,
}

impl SpatialHash {
    /// Create an empty hash with the given cell size. The table size is
    /// picked from the expected point count.
    pub fn new(cell_size: f64, expected_points: usize) -> Self {
        let table_size = if expected_points < 8_000 {
            TABLE_SIZE1
        } else if expected_points < 30_000 {
            TABLE_SIZE2
        } else {
            TABLE_SIZE3
        };
        Self {
            scale: 1.0 / cell_size,
            buckets: vec![Vec::new(); table_size],
            npoints: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.npoints
    }

    pub fn is_empty(&self) -> bool {
        self.npoints == 0
    }

    fn bucket_index(&self, a: i64, b: i64, c: i64) -> usize {
        let n = self.buckets.len() as i64;
        // rem_euclid keeps negative cells non-negative
        ((a * PR1 + b * PR2 + c).rem_euclid(n)) as usize
    }

    fn cell_of(&self, p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (self.scale * p.x).floor() as i64,
            (self.scale * p.y).floor() as i64,
            (self.scale * p.z).floor() as i64,
        )
    }

    pub fn insert(&mut self, id: VertexId, pos: &Point3<f64>) {
        let (a, b, c) = self.cell_of(pos);
        let index = self.bucket_index(a, b, c);
        self.buckets[index].push(id);
        self.npoints += 1;
    }

    /// Collect every vertex within `radius` of `pnt` into `out`, at most
    /// once per vertex per query. `seen` provides the per-query dedup and
    /// is left marked so a caller can accumulate several queries into one
    /// buffer; the caller resets it between passes. Vertices used by no
    /// triangle are skipped, as are vertices whose origin mesh equals
    /// `reject_origin`.
    pub fn verts_near(
        &self,
        mesh: &Mesh,
        pnt: &Point3<f64>,
        radius: f64,
        reject_origin: Option<MeshTag>,
        seen: &mut StampSet,
        out: &mut Vec<VertexId>,
    ) {
        let radius2 = radius * radius;
        let (aa, bb, cc) = self.cell_of(pnt);

        for a in aa - 1..=aa + 1 {
            for b in bb - 1..=bb + 1 {
                for c in cc - 1..=cc + 1 {
                    let index = self.bucket_index(a, b, c);
                    for &id in &self.buckets[index] {
                        let vert = mesh.vert(id);
                        if reject_origin.is_some() && vert.origin == reject_origin {
                            continue;
                        }
                        if vert.tris.is_empty() {
                            continue;
                        }
                        if (vert.pos - pnt).norm_squared() > radius2 {
                            continue;
                        }
                        if seen.visit(id.0 as usize) {
                            out.push(id);
                        }
                    }
                }
            }
        }
    }
}
