// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Intersection recorder
//!
//! Walks every triangle of one mesh, finds nearby triangles of the other
//! mesh through its spatial hash, and intersects each directed edge
//! against them. Each hit becomes one Cut, recorded on the clip edge of
//! every triangle sharing the piercing edge and on the pierced triangle's
//! pierce list. Triangles are visited in arena order and edges in cyclic
//! order 0 -> 1 -> 2; the done flag on shared edges relies on that
//! determinism.

use super::cuts::{Cut, CutArena, ClipEdges, Side, TriKey, VertKey};
use super::primitive::{segment_triangle, CrossSide};
use crate::config::ZipperConfig;
use crate::error::ZipperError;
use crate::geometry::{Mesh, StampSet, TriangleId, VertexId};
use crate::scan::{RigidTransform, Scan};
use anyhow::Result;

/// Record the intersections between two scans' meshes at the active level
/// of detail, in both directions. The arena must be empty or carry records
/// of the same pair from an earlier call.
pub fn intersect_meshes(
    sc1: &mut Scan,
    sc2: &mut Scan,
    cfg: &ZipperConfig,
    arena: &mut CutArena,
) -> Result<()> {
    let level = cfg.mesh_level;
    let cell = cfg.edge_length_max();

    for sc in [&mut *sc1, &mut *sc2] {
        let mesh = sc.mesh_mut(level)?;
        if mesh.hash().is_none() {
            mesh.build_hash(cell);
        }
    }

    mark_intersected_tris(sc1, sc2, Side::A, cfg, arena)?;
    mark_intersected_tris(sc2, sc1, Side::B, cfg, arena)?;

    // drop the clip edges of triangles that were examined but never
    // involved in an actual cut
    let m1 = sc1.mesh(level)?;
    let m2 = sc2.mesh(level)?;
    arena.clips.retain(|key, _| {
        let mesh = match key.side {
            Side::A => m1,
            Side::B => m2,
        };
        mesh.tri(key.tri).pierced
    });

    Ok(())
}

/// One direction of the recording pass: edges of `sc_cut` against
/// triangles of `sc_near`.
fn mark_intersected_tris(
    sc_cut: &mut Scan,
    sc_near: &mut Scan,
    cut_side: Side,
    cfg: &ZipperConfig,
    arena: &mut CutArena,
) -> Result<()> {
    let level = cfg.mesh_level;
    let radius = cfg.edge_length_max();
    let x_cut = sc_cut.xform;
    let x_near = sc_near.xform;
    let m1 = sc_cut.mesh_mut(level)?;
    let m2 = sc_near.mesh_mut(level)?;

    let mut vert_seen = StampSet::new(m2.vertex_count());
    let mut tri_seen = StampSet::new(m2.triangle_ids());
    let mut near: Vec<VertexId> = Vec::new();

    let tri_ids: Vec<TriangleId> = m1.live_triangles().collect();
    for tid in tri_ids {
        // nearby vertices of the other mesh, pooled over all three corners
        near.clear();
        vert_seen.reset();
        for k in 0..3 {
            let v = m1.tri(tid).verts[k];
            let coord = x_near.to_local_point(&x_cut.to_world_point(&m1.vert(v).pos));
            let hash = m2.hash().expect("spatial hash built above");
            hash.verts_near(m2, &coord, radius, None, &mut vert_seen, &mut near);
        }
        if near.is_empty() {
            continue;
        }

        for k in 0..3 {
            intersect_edge_with_near_tris(
                m1, m2, &x_cut, &x_near, tid, k, cut_side, &near, &mut tri_seen, cfg, arena,
            )?;
        }
    }
    Ok(())
}

/// Intersect one directed edge of `tid` against every triangle adjacent to
/// a nearby vertex.
#[allow(clippy::too_many_arguments)]
fn intersect_edge_with_near_tris(
    m1: &mut Mesh,
    m2: &mut Mesh,
    x_cut: &RigidTransform,
    x_near: &RigidTransform,
    tid: TriangleId,
    edge: usize,
    cut_side: Side,
    near: &[VertexId],
    tri_seen: &mut StampSet,
    cfg: &ZipperConfig,
    arena: &mut CutArena,
) -> Result<()> {
    let (v1, v2) = m1.tri(tid).edge(edge);
    let sharing = m1.tris_sharing_edge(v1, v2);

    for &t in &sharing {
        arena
            .clips
            .entry(TriKey::new(cut_side, t))
            .or_insert_with(|| ClipEdges::new(cut_side, m1.tri(t)));
    }

    // another triangle of the fan may have processed this edge already
    if arena.clips[&TriKey::new(cut_side, tid)].0[edge].done {
        return Ok(());
    }
    for &t in &sharing {
        let k = m1
            .tri(t)
            .edge_index_undirected(v1, v2)
            .ok_or(ZipperError::EdgeNotFound { v1, v2, tri: t })?;
        arena
            .clips
            .get_mut(&TriKey::new(cut_side, t))
            .expect("clip edges created above")
            .0[k]
            .done = true;
    }

    // edge endpoints and the cutting triangle's normal in the other
    // mesh's frame
    let ct_norm = x_near.to_local_normal(&x_cut.to_world_normal(&m1.tri(tid).plane.normal));
    let c1 = x_near.to_local_point(&x_cut.to_world_point(&m1.vert(v1).pos));
    let c2 = x_near.to_local_point(&x_cut.to_world_point(&m1.vert(v2).pos));

    tri_seen.reset();
    let mut hits = Vec::new();
    for &nv in near {
        for &t2 in &m2.vert(nv).tris {
            if !tri_seen.visit(t2.0 as usize) {
                continue;
            }
            let dot = ct_norm.dot(&m2.tri(t2).plane.normal);
            // near-parallel planes produce unstable slicing cuts
            if dot.abs() > cfg.tangency_cos {
                continue;
            }
            let corners = m2.positions(t2);
            if let Some(hit) =
                segment_triangle(&c1, &c2, &corners, &m2.tri(t2).plane, cfg.interior_epsilon)
            {
                hits.push((t2, hit, dot));
            }
        }
    }
    tri_seen.reset();

    for (t2, hit, dot) in hits {
        new_tri_intersection(m1, m2, cut_side, v1, v2, &sharing, t2, hit.s, hit.side, dot, arena)?;
    }
    Ok(())
}

/// Record one intersection: create the Cut once and share it across every
/// clip edge of the piercing-edge fan, plus the pierced triangle's pierce
/// list.
#[allow(clippy::too_many_arguments)]
fn new_tri_intersection(
    m1: &mut Mesh,
    m2: &mut Mesh,
    cut_side: Side,
    v1: VertexId,
    v2: VertexId,
    sharing: &[TriangleId],
    near_tri: TriangleId,
    s: f64,
    side: CrossSide,
    dot: f64,
    arena: &mut CutArena,
) -> Result<()> {
    m2.tri_mut(near_tri).pierced = true;
    for &t in sharing {
        m1.tri_mut(t).pierced = true;
    }

    let cut_id = arena.push_cut(Cut {
        v1: VertKey::new(cut_side, v1),
        v2: VertKey::new(cut_side, v2),
        s,
        tri: TriKey::new(cut_side.opposite(), near_tri),
        new_vert: None,
        inward: side == CrossSide::Entering,
        dot,
    });

    let first = sharing.first().copied().map(|t| TriKey::new(cut_side, t));
    let second = sharing.get(1).copied().map(|t| TriKey::new(cut_side, t));
    for &t in sharing {
        let k = m1
            .tri(t)
            .edge_index_undirected(v1, v2)
            .ok_or(ZipperError::EdgeNotFound { v1, v2, tri: t })?;
        let key = TriKey::new(cut_side, t);
        let clip = &mut arena
            .clips
            .get_mut(&key)
            .expect("clip edges exist for every sharing triangle")
            .0[k];
        clip.t1 = Some(key);
        clip.t2 = if first == Some(key) { second } else { first };
        clip.cuts.push(cut_id);
    }

    arena
        .pierce
        .entry(TriKey::new(cut_side.opposite(), near_tri))
        .or_default()
        .cuts
        .push(cut_id);

    Ok(())
}
