// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Polygon clipper
//!
//! Finishing a mesh intersection happens in phases: gather the second mesh
//! into the first, create one new vertex per cut, then replace each cut
//! triangle with the polygon bounded by its exit cut, the surviving
//! corners, its entry cut, and the chain of interior cut points
//! contributed by the other mesh. Anomalous triangles (no entry/exit pair,
//! a failed chain walk, a self-intersecting polygon) are logged and left
//! exactly as they were.

use super::cuts::{CutArena, CutId, TriKey};
use super::gather::gather_scans;
use crate::config::ZipperConfig;
use crate::geometry::{Mesh, TriangleId, VertexId};
use crate::scan::Scan;
use crate::splitter::PlanarSplitter;
use anyhow::Result;

/// Finish the intersection started by `intersect_meshes`: gather, insert
/// the new vertices, clip, and tear the cut records down.
pub fn finish_intersect_meshes(
    sc1: &mut Scan,
    sc2: &mut Scan,
    cfg: &ZipperConfig,
    arena: &mut CutArena,
) -> Result<()> {
    let level = cfg.mesh_level;
    gather_scans(sc1, sc2, level, arena)?;

    let mesh = sc1.mesh_mut(level)?;
    add_intersect_points(mesh, arena);
    perform_intersect_clipping(mesh, arena);

    arena.clear();
    Ok(())
}

/// One entry of the candidate boundary of a triangle being clipped
#[derive(Debug, Clone, Copy)]
enum ClipVertex {
    Corner {
        vert: VertexId,
    },
    Cut {
        cut: CutId,
        vert: VertexId,
        /// Crossing direction reinterpreted for the owning triangle's
        /// cyclic edge order
        inward: bool,
        /// Edge (0, 1 or 2) the cut lies on
        side: usize,
    },
}

impl ClipVertex {
    fn vert(&self) -> VertexId {
        match *self {
            ClipVertex::Corner { vert } | ClipVertex::Cut { vert, .. } => vert,
        }
    }
}

/// Create a vertex at every recorded cut position and insert it into the
/// mesh and its spatial hash.
pub(super) fn add_intersect_points(mesh: &mut Mesh, arena: &mut CutArena) {
    let mut pierced: Vec<TriangleId> = arena.pierce.keys().map(|k| k.tri).collect();
    pierced.sort_unstable();

    let mut count = 0usize;
    for tid in pierced {
        let cut_ids = arena.pierce[&TriKey::unified(tid)].cuts.clone();
        for cid in cut_ids {
            let (p1, p2, s) = {
                let cut = arena.cut(cid);
                debug_assert!(cut.new_vert.is_none());
                (mesh.vert(cut.v1.vert).pos, mesh.vert(cut.v2.vert).pos, cut.s)
            };
            let vert = mesh.make_vertex(p1 + (p2 - p1) * s);
            mesh.add_to_hash(vert);
            arena.cut_mut(cid).new_vert = Some(vert);
            count += 1;
        }
    }
    log::info!("{} new vertices added", count);
}

/// Replace every cut triangle with its clipped polygon.
pub(super) fn perform_intersect_clipping(mesh: &mut Mesh, arena: &mut CutArena) {
    // first pass: work out the replacement polygon of each cut triangle
    let mut targets: Vec<TriangleId> = arena.clips.keys().map(|k| k.tri).collect();
    targets.sort_unstable();

    for tid in targets {
        let key = TriKey::unified(tid);
        if arena.clips[&key].cut_count() == 0 {
            continue;
        }
        sort_triangle_cuts(mesh, arena, tid);
        let clist = potential_vertices(mesh, arena, tid);

        let mut in_vert = None;
        let mut out_vert = None;
        for (i, cv) in clist.iter().enumerate() {
            if let ClipVertex::Cut { inward, side, .. } = *cv {
                log::debug!(
                    "cut on side {} of triangle {:?}, inward: {}",
                    side,
                    tid,
                    inward
                );
                if inward {
                    in_vert = Some(i);
                } else {
                    out_vert = Some(i);
                }
            }
        }
        let (Some(in_vert), Some(out_vert)) = (in_vert, out_vert) else {
            log::warn!(
                "no entry/exit pair for triangle {:?}; leaving it unclipped",
                tid
            );
            continue;
        };

        let Some(between) = between_cuts(arena, tid, &clist, in_vert, out_vert) else {
            log::warn!(
                "intersection chain walk failed for triangle {:?}; leaving it unclipped",
                tid
            );
            continue;
        };

        // retained boundary: exit cut, forward around the triangle to the
        // entry cut, then back along the other mesh's intersection chain
        let mut verts = Vec::new();
        let mut j = out_vert;
        while j != in_vert {
            verts.push(clist[j].vert());
            j = (j + 1) % clist.len();
        }
        verts.push(clist[in_vert].vert());
        verts.extend(between);

        let info = arena.pierce.entry(key).or_default();
        info.clip_verts = verts;
        info.clip_flag = true;
    }

    // second pass: re-triangulate and commit
    let mut flagged: Vec<TriangleId> = arena
        .pierce
        .iter()
        .filter(|(_, info)| info.clip_flag)
        .map(|(k, _)| k.tri)
        .collect();
    flagged.sort_unstable();

    for tid in flagged {
        let cv = arena.pierce[&TriKey::unified(tid)].clip_verts.clone();
        let plane = mesh.tri(tid).plane;

        let mut splitter =
            match PlanarSplitter::new(plane.normal.x, plane.normal.y, plane.normal.z, plane.d) {
                Ok(s) => s,
                Err(err) => {
                    log::warn!("{}; leaving triangle {:?} unclipped", err, tid);
                    continue;
                }
            };
        for (j, &v) in cv.iter().enumerate() {
            splitter.add_boundary_point(&mesh.vert(v).pos, j);
        }
        let tris = match splitter.connect() {
            Ok(tris) => tris,
            Err(err) => {
                log::warn!("{}; leaving triangle {:?} unclipped", err, tid);
                continue;
            }
        };

        mesh.delete_triangle(tid);
        for [p1, p2, p3] in tris {
            // the factory rejects degenerate triples on its own
            mesh.make_triangle(cv[p1], cv[p2], cv[p3], f64::INFINITY);
        }
        for &v in &cv {
            mesh.vertex_edge_test(v);
            mesh.find_vertex_normal(v);
        }
    }
}

/// Order the cuts of each clip edge by their parameter along the owning
/// triangle's cyclic direction.
fn sort_triangle_cuts(mesh: &Mesh, arena: &mut CutArena, tid: TriangleId) {
    let key = TriKey::unified(tid);
    for k in 0..3 {
        let (a, _) = mesh.tri(tid).edge(k);
        let cuts = arena.clips[&key].0[k].cuts.clone();
        if cuts.len() < 2 {
            continue;
        }
        let mut keyed: Vec<(f64, CutId)> = cuts
            .into_iter()
            .map(|cid| {
                let cut = arena.cut(cid);
                let s = if cut.v1.vert == a { cut.s } else { 1.0 - cut.s };
                (s, cid)
            })
            .collect();
        keyed.sort_by(|x, y| x.0.total_cmp(&y.0));
        if let Some(edges) = arena.clips.get_mut(&key) {
            edges.0[k].cuts = keyed.into_iter().map(|(_, cid)| cid).collect();
        }
    }
}

/// Walk the triangle's boundary in cyclic order, emitting original
/// corners and cut points. Cut direction and parameter are reinterpreted
/// when the recorded edge runs opposite to this triangle's cyclic order.
fn potential_vertices(mesh: &Mesh, arena: &CutArena, tid: TriangleId) -> Vec<ClipVertex> {
    let key = TriKey::unified(tid);
    let mut list = Vec::new();
    for k in 0..3 {
        let (a, _) = mesh.tri(tid).edge(k);
        list.push(ClipVertex::Corner { vert: a });
        for &cid in &arena.clips[&key].0[k].cuts {
            let cut = arena.cut(cid);
            let forward = cut.v1.vert == a;
            list.push(ClipVertex::Cut {
                cut: cid,
                vert: cut
                    .new_vert
                    .expect("new vertices are created before clipping"),
                inward: if forward { cut.inward } else { !cut.inward },
                side: k,
            });
        }
    }
    list
}

/// Collect the interior chain of cut vertices between the entry and exit
/// cuts of `target`: starting from the other-mesh triangle pierced by the
/// entry cut, hop across shared edges whose cuts pass through `target`
/// until reaching the triangle pierced by the exit cut. Each hop
/// contributes one vertex. Returns None when the walk cannot complete.
fn between_cuts(
    arena: &CutArena,
    target: TriangleId,
    clist: &[ClipVertex],
    in_vert: usize,
    out_vert: usize,
) -> Option<Vec<VertexId>> {
    let (ClipVertex::Cut { cut: cut1, .. }, ClipVertex::Cut { cut: cut2, .. }) =
        (clist[in_vert], clist[out_vert])
    else {
        return None;
    };
    let expected = arena
        .pierce
        .get(&TriKey::unified(target))
        .map(|info| info.cuts.len())
        .unwrap_or(0);

    let tri_last = arena.cut(cut2).tri.tri;
    let mut tri_cur = arena.cut(cut1).tri.tri;
    let mut tri_old: Option<TriangleId> = None;
    let mut chain = Vec::new();

    while tri_cur != tri_last {
        if chain.len() > expected + 2 {
            log::warn!("chain walk is not converging after {} hops", chain.len());
            return None;
        }

        let candidates = tri_cut_by_tri(arena, target, tri_cur);
        if candidates.is_empty() {
            log::warn!("no continuing cut found on triangle {:?}", tri_cur);
            return None;
        }

        // exactly one unexamined neighbor must continue the chain; a
        // non-manifold edge would offer more and is treated as a failure
        let mut next = None;
        let mut found = 0;
        for (cid, other) in candidates {
            if let Some(other) = other {
                if tri_old != Some(other) {
                    next = Some((cid, other));
                    found += 1;
                }
            }
        }
        if found != 1 {
            log::warn!(
                "{} continuation triangles from {:?}, expected exactly 1",
                found,
                tri_cur
            );
            return None;
        }
        let (cid, other) = next?;

        chain.push(
            arena
                .cut(cid)
                .new_vert
                .expect("new vertices are created before clipping"),
        );
        tri_old = Some(tri_cur);
        tri_cur = other;
    }

    if chain.len() != expected {
        log::warn!(
            "chain_count mismatch: {} hops but {} interior cuts",
            chain.len(),
            expected
        );
    }
    Some(chain)
}

/// Cuts along `cur`'s edges that pass through `target`, each paired with
/// the triangle sharing the cut edge with `cur` (if any).
fn tri_cut_by_tri(
    arena: &CutArena,
    target: TriangleId,
    cur: TriangleId,
) -> Vec<(CutId, Option<TriangleId>)> {
    let cur_key = TriKey::unified(cur);
    let Some(clips) = arena.clips.get(&cur_key) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for clip in &clips.0 {
        for &cid in &clip.cuts {
            if arena.cut(cid).tri.tri != target {
                continue;
            }
            let other = if clip.t1 == Some(cur_key) {
                clip.t2
            } else if clip.t2 == Some(cur_key) {
                clip.t1
            } else {
                None
            };
            found.push((cid, other.map(|k| k.tri)));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZipperConfig;
    use crate::geometry::{Mesh, MeshTag};
    use crate::intersect::recorder::intersect_meshes;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// Square in the xy plane: x in [0,2], y in [-1,1].
    fn floor() -> Mesh {
        let mut mesh = Mesh::new(MeshTag(1));
        let a = mesh.make_vertex(Point3::new(0.0, -1.0, 0.0));
        let b = mesh.make_vertex(Point3::new(2.0, -1.0, 0.0));
        let c = mesh.make_vertex(Point3::new(2.0, 1.0, 0.0));
        let d = mesh.make_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.make_triangle(a, b, c, f64::INFINITY).unwrap();
        mesh.make_triangle(a, c, d, f64::INFINITY).unwrap();
        mesh
    }

    /// Square in the y = 0 plane: x in [-0.3, 2.1], z in [-1,1]. The x
    /// offsets keep every crossing away from edges and diagonals.
    fn sheet() -> Mesh {
        let mut mesh = Mesh::new(MeshTag(2));
        let a = mesh.make_vertex(Point3::new(-0.3, 0.0, -1.0));
        let b = mesh.make_vertex(Point3::new(2.1, 0.0, -1.0));
        let c = mesh.make_vertex(Point3::new(2.1, 0.0, 1.0));
        let d = mesh.make_vertex(Point3::new(-0.3, 0.0, 1.0));
        mesh.make_triangle(a, b, c, f64::INFINITY).unwrap();
        mesh.make_triangle(a, c, d, f64::INFINITY).unwrap();
        mesh
    }

    fn test_config() -> ZipperConfig {
        // unit-scale geometry: proximity radius of 2
        ZipperConfig {
            mesh_level: 0,
            resolution: 0.5,
            ..Default::default()
        }
    }

    fn crossing_scans() -> (Scan, Scan) {
        let mut sc1 = Scan::new("floor");
        sc1.set_mesh(0, floor());
        let mut sc2 = Scan::new("sheet");
        sc2.set_mesh(0, sheet());
        (sc1, sc2)
    }

    #[test]
    fn test_new_vertices_interpolate_their_cuts() {
        let cfg = test_config();
        let (mut sc1, mut sc2) = crossing_scans();
        let mut arena = CutArena::new();
        intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();
        gather_scans(&mut sc1, &mut sc2, 0, &mut arena).unwrap();

        let mesh = sc1.mesh_mut(0).unwrap();
        add_intersect_points(mesh, &mut arena);

        let mesh = sc1.mesh(0).unwrap();
        assert_eq!(arena.cut_count(), 4);
        for cut in arena.cuts() {
            let vert = cut.new_vert.expect("every cut gets a vertex");
            let p1 = mesh.vert(cut.v1.vert).pos;
            let p2 = mesh.vert(cut.v2.vert).pos;
            assert_relative_eq!(
                mesh.vert(vert).pos,
                p1 + (p2 - p1) * cut.s,
                epsilon = 1e-15
            );
            // the whole intersection curve lies on y = 0, z = 0
            assert_relative_eq!(mesh.vert(vert).pos.y, 0.0, epsilon = 1e-12);
            assert_relative_eq!(mesh.vert(vert).pos.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_clipping_replaces_balanced_triangles() {
        let cfg = test_config();
        let (mut sc1, mut sc2) = crossing_scans();
        let mut arena = CutArena::new();
        intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();
        finish_intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();

        let mesh = sc1.mesh(0).unwrap();
        // floor triangles 0 and 1 are replaced by two triangles each; the
        // sheet carries a single unpaired cut and stays whole
        assert!(!mesh.tri(TriangleId(0)).alive);
        assert!(!mesh.tri(TriangleId(1)).alive);
        assert!(mesh.tri(TriangleId(2)).alive);
        assert!(mesh.tri(TriangleId(3)).alive);
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(mesh.vertex_count(), 12);

        // the retained floor half is y <= 0
        for tid in mesh.live_triangles() {
            if tid.0 >= 4 {
                for p in mesh.positions(tid) {
                    assert!(p.y <= 1e-12, "kept vertex on the wrong side: {:?}", p);
                }
            }
        }
    }

    #[test]
    fn test_interior_chain_vertex_is_stitched_in() {
        let cfg = test_config();
        let (mut sc1, mut sc2) = crossing_scans();
        let mut arena = CutArena::new();
        intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();
        finish_intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();

        // the sheet's diagonal pierces the floor at (0.9, 0, 0); the
        // clipped floor must reference that vertex
        let mesh = sc1.mesh(0).unwrap();
        let chain_vert = (0..mesh.vertex_count() as u32)
            .map(VertexId)
            .find(|&v| (mesh.vert(v).pos - Point3::new(0.9, 0.0, 0.0)).norm() < 1e-9)
            .expect("chain vertex exists");
        assert!(!mesh.vert(chain_vert).tris.is_empty());
    }

    #[test]
    fn test_anomalous_triangles_keep_their_flags() {
        let cfg = test_config();
        let (mut sc1, mut sc2) = crossing_scans();
        let mut arena = CutArena::new();
        intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();
        finish_intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();

        let mesh = sc1.mesh(0).unwrap();
        // the unclippable sheet triangles stay, still marked pierced
        assert!(mesh.tri(TriangleId(2)).pierced);
        assert!(mesh.tri(TriangleId(3)).pierced);
    }

    #[test]
    fn test_finish_tears_down_the_arena() {
        let cfg = test_config();
        let (mut sc1, mut sc2) = crossing_scans();
        let mut arena = CutArena::new();
        intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();
        assert!(!arena.is_empty());
        finish_intersect_meshes(&mut sc1, &mut sc2, &cfg, &mut arena).unwrap();
        assert!(arena.is_empty());
    }
}
