// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Cut records for one mesh pair
//!
//! A cut is one crossing of a directed triangle edge of one mesh through a
//! triangle of the other mesh. All cuts of a pair live in a single arena;
//! the per-edge lists (`ClipEdge`) and the per-pierced-triangle lists
//! (`PierceInfo`) reference them by id, so a cut recorded on a shared edge
//! is the same object no matter which neighbor triangle it is viewed from.
//!
//! Until the two meshes are gathered into one, handles carry the side of
//! the pair they index into; `remap_b` rewrites every side-B handle into
//! the unified id space and is called exactly once, from the gather step.

use ahash::RandomState;
use crate::geometry::{Triangle, TriangleId, VertexId};
use std::collections::HashMap;

/// Hash map keyed by triangle handles; ahash keeps the recorder's hot
/// lookups cheap.
pub type TriMap<V> = HashMap<TriKey, V, RandomState>;

/// Which mesh of the pair a handle points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Triangle handle qualified by pair side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriKey {
    pub side: Side,
    pub tri: TriangleId,
}

impl TriKey {
    pub fn new(side: Side, tri: TriangleId) -> Self {
        Self { side, tri }
    }

    /// Handle into the unified (post-gather) mesh
    pub fn unified(tri: TriangleId) -> Self {
        Self {
            side: Side::A,
            tri,
        }
    }
}

/// Vertex handle qualified by pair side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertKey {
    pub side: Side,
    pub vert: VertexId,
}

impl VertKey {
    pub fn new(side: Side, vert: VertexId) -> Self {
        Self { side, vert }
    }
}

/// Index into the pair's cut arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CutId(pub u32);

/// One crossing of a directed edge through a triangle of the other mesh
#[derive(Debug, Clone)]
pub struct Cut {
    /// Endpoints of the piercing edge, in the direction it was recorded
    pub v1: VertKey,
    pub v2: VertKey,
    /// Parameter of the crossing along v1 -> v2
    pub s: f64,
    /// The pierced triangle, on the other side of the pair
    pub tri: TriKey,
    /// Vertex created at the crossing point; set once, before clipping
    pub new_vert: Option<VertexId>,
    /// True when v1 -> v2 crosses from the outside half-space of the
    /// pierced triangle to the inside
    pub inward: bool,
    /// Alignment of the two supporting planes' normals
    pub dot: f64,
}

/// Per-edge cut bookkeeping of one triangle
#[derive(Debug, Clone)]
pub struct ClipEdge {
    /// Edge endpoints in the owning triangle's cyclic order
    pub v1: VertKey,
    pub v2: VertKey,
    /// The owning triangle and, on an interior edge, its edge-neighbor
    pub t1: Option<TriKey>,
    pub t2: Option<TriKey>,
    /// Cuts along this edge; sorted by oriented parameter before clipping
    pub cuts: Vec<CutId>,
    /// Has this undirected edge been intersected against the other mesh?
    pub done: bool,
}

/// The three clip edges of a triangle, in cyclic order
#[derive(Debug, Clone)]
pub struct ClipEdges(pub [ClipEdge; 3]);

impl ClipEdges {
    pub fn new(side: Side, tri: &Triangle) -> Self {
        let edge = |k: usize| {
            let (v1, v2) = tri.edge(k);
            ClipEdge {
                v1: VertKey::new(side, v1),
                v2: VertKey::new(side, v2),
                t1: None,
                t2: None,
                cuts: Vec::with_capacity(2),
                done: false,
            }
        };
        Self([edge(0), edge(1), edge(2)])
    }

    pub fn cut_count(&self) -> usize {
        self.0.iter().map(|e| e.cuts.len()).sum()
    }
}

/// Cuts passing through a triangle's interior, plus clipping output
#[derive(Debug, Clone, Default)]
pub struct PierceInfo {
    pub cuts: Vec<CutId>,
    /// Ordered polygon that will replace the triangle
    pub clip_verts: Vec<VertexId>,
    pub clip_flag: bool,
}

/// All intersection scratch for one mesh pair
#[derive(Debug, Default)]
pub struct CutArena {
    cuts: Vec<Cut>,
    pub clips: TriMap<ClipEdges>,
    pub pierce: TriMap<PierceInfo>,
}

impl CutArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cut(&self, id: CutId) -> &Cut {
        &self.cuts[id.0 as usize]
    }

    pub fn cut_mut(&mut self, id: CutId) -> &mut Cut {
        &mut self.cuts[id.0 as usize]
    }

    pub fn push_cut(&mut self, cut: Cut) -> CutId {
        let id = CutId(self.cuts.len() as u32);
        self.cuts.push(cut);
        id
    }

    pub fn cuts(&self) -> impl Iterator<Item = &Cut> {
        self.cuts.iter()
    }

    pub fn cut_count(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty() && self.clips.is_empty() && self.pierce.is_empty()
    }

    /// Discard every record; called at the end of finish.
    pub fn clear(&mut self) {
        self.cuts.clear();
        self.clips.clear();
        self.pierce.clear();
    }

    /// Rewrite every side-B handle into the unified id space produced by
    /// gathering mesh B into mesh A with the given offsets.
    pub fn remap_b(&mut self, voff: u32, toff: u32) {
        for cut in &mut self.cuts {
            remap_vert(&mut cut.v1, voff);
            remap_vert(&mut cut.v2, voff);
            remap_tri(&mut cut.tri, toff);
        }
        let clips = std::mem::take(&mut self.clips);
        self.clips = clips
            .into_iter()
            .map(|(mut key, mut edges)| {
                remap_tri(&mut key, toff);
                for e in &mut edges.0 {
                    remap_vert(&mut e.v1, voff);
                    remap_vert(&mut e.v2, voff);
                    if let Some(t) = &mut e.t1 {
                        remap_tri(t, toff);
                    }
                    if let Some(t) = &mut e.t2 {
                        remap_tri(t, toff);
                    }
                }
                (key, edges)
            })
            .collect();
        let pierce = std::mem::take(&mut self.pierce);
        self.pierce = pierce
            .into_iter()
            .map(|(mut key, info)| {
                remap_tri(&mut key, toff);
                (key, info)
            })
            .collect();
    }
}

fn remap_tri(key: &mut TriKey, toff: u32) {
    if key.side == Side::B {
        key.side = Side::A;
        key.tri.0 += toff;
    }
}

fn remap_vert(key: &mut VertKey, voff: u32) {
    if key.side == Side::B {
        key.side = Side::A;
        key.vert.0 += voff;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_moves_only_side_b() {
        let mut arena = CutArena::new();
        let id = arena.push_cut(Cut {
            v1: VertKey::new(Side::B, VertexId(1)),
            v2: VertKey::new(Side::B, VertexId(2)),
            s: 0.5,
            tri: TriKey::new(Side::A, TriangleId(3)),
            new_vert: None,
            inward: true,
            dot: 0.1,
        });
        arena.remap_b(10, 20);
        let cut = arena.cut(id);
        assert_eq!(cut.v1, VertKey::new(Side::A, VertexId(11)));
        assert_eq!(cut.v2, VertKey::new(Side::A, VertexId(12)));
        // side-A handles are untouched
        assert_eq!(cut.tri, TriKey::new(Side::A, TriangleId(3)));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut arena = CutArena::new();
        arena.push_cut(Cut {
            v1: VertKey::new(Side::A, VertexId(0)),
            v2: VertKey::new(Side::A, VertexId(1)),
            s: 0.25,
            tri: TriKey::new(Side::B, TriangleId(0)),
            new_vert: None,
            inward: false,
            dot: 0.0,
        });
        arena
            .pierce
            .entry(TriKey::new(Side::B, TriangleId(0)))
            .or_default();
        assert!(!arena.is_empty());
        arena.clear();
        assert!(arena.is_empty());
    }
}
