// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Meshzip
//!
//! A zippering engine for overlapping triangle meshes from multiple 3D
//! range scans. Given two scans whose meshes describe the same surface,
//! the engine computes the curve along which the meshes intersect,
//! inserts it as new vertices, and re-triangulates the cut triangles so
//! both meshes meet along a common clipped boundary.

pub mod config;
pub mod error;
pub mod geometry;
pub mod intersect;
pub mod scan;
pub mod splitter;

pub use config::{level_to_inc, ZipperConfig, MAX_MESH_LEVELS};
pub use error::ZipperError;
pub use geometry::{Mesh, MeshTag, Plane, Triangle, TriangleId, Vertex, VertexId};
pub use intersect::{finish_intersect_meshes, intersect_meshes, CutArena};
pub use scan::{RigidTransform, Scan};
pub use splitter::PlanarSplitter;

use anyhow::Result;
use rayon::prelude::*;

/// Zip one pair of scans: record the intersections, then clip. The merged
/// result lands in `sc1`'s mesh at the configured level of detail.
pub fn zip_meshes(sc1: &mut Scan, sc2: &mut Scan, cfg: &ZipperConfig) -> Result<()> {
    let mut arena = CutArena::new();
    intersect_meshes(sc1, sc2, cfg, &mut arena)?;
    finish_intersect_meshes(sc1, sc2, cfg, &mut arena)
}

/// Zip several disjoint pairs in parallel. Pairs share no mesh state, so
/// each runs on its own worker.
pub fn zip_pairs(pairs: &mut [(Scan, Scan)], cfg: &ZipperConfig) -> Result<()> {
    pairs
        .par_iter_mut()
        .try_for_each(|(sc1, sc2)| zip_meshes(sc1, sc2, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn square(tag: u32, y0: f64, y1: f64) -> Mesh {
        let mut mesh = Mesh::new(MeshTag(tag));
        let a = mesh.make_vertex(Point3::new(0.0, y0, 0.0));
        let b = mesh.make_vertex(Point3::new(2.0, y0, 0.0));
        let c = mesh.make_vertex(Point3::new(2.0, y1, 0.0));
        let d = mesh.make_vertex(Point3::new(0.0, y1, 0.0));
        mesh.make_triangle(a, b, c, f64::INFINITY).unwrap();
        mesh.make_triangle(a, c, d, f64::INFINITY).unwrap();
        mesh
    }

    #[test]
    fn test_zip_disjoint_meshes_is_a_no_op() {
        let cfg = ZipperConfig {
            mesh_level: 0,
            resolution: 0.1,
            ..Default::default()
        };
        let mut sc1 = Scan::new("left");
        sc1.set_mesh(0, square(1, -1.0, 1.0));
        let mut sc2 = Scan::new("right");
        sc2.set_mesh(0, square(2, 10.0, 12.0));

        zip_meshes(&mut sc1, &mut sc2, &cfg).unwrap();
        // nothing intersects: both squares survive, merged
        assert_eq!(sc1.mesh(0).unwrap().triangle_count(), 4);
        assert_eq!(sc1.mesh(0).unwrap().vertex_count(), 8);
    }

    #[test]
    fn test_zip_pairs_runs_each_pair() {
        let cfg = ZipperConfig {
            mesh_level: 0,
            resolution: 0.1,
            ..Default::default()
        };
        let mut pairs = Vec::new();
        for p in 0..3 {
            let mut sc1 = Scan::new(format!("a{}", p));
            sc1.set_mesh(0, square(p * 2, -1.0, 1.0));
            let mut sc2 = Scan::new(format!("b{}", p));
            sc2.set_mesh(0, square(p * 2 + 1, 10.0, 12.0));
            pairs.push((sc1, sc2));
        }

        zip_pairs(&mut pairs, &cfg).unwrap();
        for (sc1, _) in &pairs {
            assert_eq!(sc1.mesh(0).unwrap().triangle_count(), 4);
        }
    }
}
