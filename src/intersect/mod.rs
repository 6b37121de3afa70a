// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Mesh-mesh intersection and clipping engine

mod clipper;
mod cuts;
mod gather;
mod primitive;
mod recorder;

pub use clipper::finish_intersect_meshes;
pub use cuts::{Cut, CutArena, CutId, ClipEdge, ClipEdges, PierceInfo, Side, TriKey, VertKey};
pub use primitive::{segment_triangle, CrossSide, SegmentHit};
pub use recorder::intersect_meshes;
