// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Error types for fatal anomalies
//!
//! Recoverable anomalies (grazing intersections, unpaired cuts,
//! self-intersecting clip polygons) never surface here; they are logged and
//! the affected triangle is left unchanged.

use crate::geometry::{TriangleId, VertexId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZipperError {
    /// A scan has no mesh at the requested level of detail.
    #[error("no mesh at level {0}")]
    MissingLevel(usize),

    /// Internal bookkeeping failure: an edge could not be located within a
    /// triangle that is supposed to own it.
    #[error("edge ({v1:?}, {v2:?}) not found in triangle {tri:?}")]
    EdgeNotFound {
        v1: VertexId,
        v2: VertexId,
        tri: TriangleId,
    },

    /// The supporting plane handed to the planar splitter has a near-zero
    /// normal.
    #[error("degenerate supporting plane ({0}, {1}, {2})")]
    DegeneratePlane(f64, f64, f64),

    /// The clipped polygon boundary crosses itself.
    #[error("self-intersecting clip polygon with {0} vertices")]
    SelfIntersecting(usize),
}
