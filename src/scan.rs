// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Scans and rigid coordinate transforms
//!
//! A scan is one range acquisition: a rigid transform placing its meshes
//! in world space, plus up to four meshes at decreasing levels of detail.
//! Registration of the transforms happens upstream; the zipper only reads
//! them.

use crate::config::MAX_MESH_LEVELS;
use crate::error::ZipperError;
use crate::geometry::Mesh;
use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid transform between a mesh-local frame and world space.
/// Points rotate then translate; normals only rotate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn to_world_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.rotation * p + self.translation
    }

    pub fn to_local_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.rotation.inverse() * Point3::from(p.coords - self.translation)
    }

    pub fn to_world_normal(&self, n: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * n
    }

    pub fn to_local_normal(&self, n: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse() * n
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// One depth scan: a rigid placement and its level-of-detail meshes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub name: String,
    pub xform: RigidTransform,
    meshes: [Option<Mesh>; MAX_MESH_LEVELS],
}

impl Scan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xform: RigidTransform::identity(),
            meshes: Default::default(),
        }
    }

    pub fn with_transform(name: impl Into<String>, xform: RigidTransform) -> Self {
        Self {
            name: name.into(),
            xform,
            meshes: Default::default(),
        }
    }

    pub fn set_mesh(&mut self, level: usize, mesh: Mesh) {
        self.meshes[level] = Some(mesh);
    }

    pub fn take_mesh(&mut self, level: usize) -> Option<Mesh> {
        self.meshes[level].take()
    }

    pub fn mesh(&self, level: usize) -> Result<&Mesh, ZipperError> {
        self.meshes
            .get(level)
            .and_then(|m| m.as_ref())
            .ok_or(ZipperError::MissingLevel(level))
    }

    pub fn mesh_mut(&mut self, level: usize) -> Result<&mut Mesh, ZipperError> {
        self.meshes
            .get_mut(level)
            .and_then(|m| m.as_mut())
            .ok_or(ZipperError::MissingLevel(level))
    }

    /// Re-express a point from this scan's local frame in another scan's
    /// local frame.
    pub fn point_to_scan(&self, other: &Scan, p: &Point3<f64>) -> Point3<f64> {
        other.xform.to_local_point(&self.xform.to_world_point(p))
    }

    /// Re-express a normal from this scan's local frame in another scan's
    /// local frame.
    pub fn normal_to_scan(&self, other: &Scan, n: &Vector3<f64>) -> Vector3<f64> {
        other.xform.to_local_normal(&self.xform.to_world_normal(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_point_roundtrip() {
        let xf = RigidTransform::new(
            Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
            Vector3::new(1.0, -2.0, 3.0),
        );
        let p = Point3::new(0.5, 0.25, -1.0);
        let back = xf.to_local_point(&xf.to_world_point(&p));
        assert_relative_eq!(back, p, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_ignores_translation() {
        let xf = RigidTransform::new(
            Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
            Vector3::new(100.0, 0.0, 0.0),
        );
        let n = Vector3::new(1.0, 0.0, 0.0);
        let w = xf.to_world_normal(&n);
        assert_relative_eq!(w, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(w.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scan_to_scan_composition() {
        let a = Scan::with_transform(
            "a",
            RigidTransform::new(Rotation3::identity(), Vector3::new(1.0, 0.0, 0.0)),
        );
        let b = Scan::with_transform(
            "b",
            RigidTransform::new(
                Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
                Vector3::zeros(),
            ),
        );
        let p = Point3::new(0.0, 0.0, 0.0);
        // world position is (1,0,0); b's frame rotates it onto -y
        let q = a.point_to_scan(&b, &p);
        assert_relative_eq!(q, Point3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_missing_level() {
        let scan = Scan::new("empty");
        assert!(scan.mesh(2).is_err());
    }
}
