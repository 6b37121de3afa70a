// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Geometry module - mesh representation and spatial search

mod mesh;
mod spatial_hash;
mod stamp;

pub use mesh::{Mesh, MeshTag, Plane, Triangle, TriangleId, Vertex, VertexId};
pub use spatial_hash::SpatialHash;
pub use stamp::StampSet;
