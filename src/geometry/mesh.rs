// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Mesh representation and factories
//!
//! A mesh owns its vertices and triangles in arenas addressed by stable
//! ids; deleting a triangle tombstones it so that ids recorded elsewhere
//! (cut records, adjacency lists of other meshes) stay valid. Triangle
//! edges follow the cyclic order edge0 = (v0,v1), edge1 = (v1,v2),
//! edge2 = (v2,v0).

use super::spatial_hash::SpatialHash;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Stable index into a mesh's vertex arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// Stable index into a mesh's triangle arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriangleId(pub u32);

/// Identifies the mesh a vertex originally came from, before any merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshTag(pub u32);

/// Supporting plane n . p + d = 0 with unit outward normal n.
/// Points with n . p + d > 0 lie on the outside.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub d: f64,
}

impl Plane {
    /// Plane through three points with outward normal following the
    /// right-hand rule. Returns None for a degenerate triangle.
    pub fn from_points(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Option<Self> {
        let normal = (p1 - p0).cross(&(p2 - p0));
        let len = normal.norm();
        if len < 1e-14 {
            return None;
        }
        let normal = normal / len;
        Some(Self {
            normal,
            d: -normal.dot(&p0.coords),
        })
    }

    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) + self.d
    }
}

/// Vertex with position, normal, and incidence lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub pos: Point3<f64>,
    pub normal: Vector3<f64>,
    /// Triangles incident to this vertex
    pub tris: Vec<TriangleId>,
    /// Vertices that share an edge with this vertex
    pub verts: Vec<VertexId>,
    /// Does the vertex lie on the boundary of the mesh?
    pub on_edge: bool,
    /// Mesh this vertex belonged to before being absorbed
    pub origin: Option<MeshTag>,
}

impl Vertex {
    fn new(pos: Point3<f64>) -> Self {
        Self {
            pos,
            normal: Vector3::zeros(),
            tris: Vec::new(),
            verts: Vec::new(),
            on_edge: false,
            origin: None,
        }
    }
}

/// Triangle with cyclic vertex order and supporting plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    pub verts: [VertexId; 3],
    pub plane: Plane,
    /// Set when this triangle is involved in a mesh-mesh intersection
    pub pierced: bool,
    /// Cleared when the triangle is deleted; ids are never reused
    pub alive: bool,
}

impl Triangle {
    /// Endpoints of edge k in cyclic order
    pub fn edge(&self, k: usize) -> (VertexId, VertexId) {
        (self.verts[k], self.verts[(k + 1) % 3])
    }

    /// Index of the directed edge v1 -> v2 within this triangle
    pub fn edge_index_directed(&self, v1: VertexId, v2: VertexId) -> Option<usize> {
        (0..3).find(|&k| self.edge(k) == (v1, v2))
    }

    /// Index of the undirected edge {v1, v2} within this triangle
    pub fn edge_index_undirected(&self, v1: VertexId, v2: VertexId) -> Option<usize> {
        (0..3).find(|&k| {
            let e = self.edge(k);
            e == (v1, v2) || e == (v2, v1)
        })
    }
}

/// Triangle mesh with stable-id arenas and an optional spatial hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub tag: MeshTag,
    verts: Vec<Vertex>,
    tris: Vec<Triangle>,
    live_tris: usize,
    #[serde(skip)]
    hash: Option<SpatialHash>,
}

impl Mesh {
    pub fn new(tag: MeshTag) -> Self {
        Self {
            tag,
            verts: Vec::new(),
            tris: Vec::new(),
            live_tris: 0,
            hash: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    /// Number of live (non-deleted) triangles
    pub fn triangle_count(&self) -> usize {
        self.live_tris
    }

    /// Upper bound of the triangle id space, deleted ids included
    pub fn triangle_ids(&self) -> usize {
        self.tris.len()
    }

    pub fn vert(&self, id: VertexId) -> &Vertex {
        &self.verts[id.0 as usize]
    }

    pub fn vert_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.verts[id.0 as usize]
    }

    pub fn tri(&self, id: TriangleId) -> &Triangle {
        &self.tris[id.0 as usize]
    }

    pub fn tri_mut(&mut self, id: TriangleId) -> &mut Triangle {
        &mut self.tris[id.0 as usize]
    }

    /// Live triangle ids in arena order
    pub fn live_triangles(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.tris
            .iter()
            .enumerate()
            .filter(|(_, t)| t.alive)
            .map(|(i, _)| TriangleId(i as u32))
    }

    /// Vertex positions of a triangle, in cyclic order
    pub fn positions(&self, id: TriangleId) -> [Point3<f64>; 3] {
        let t = self.tri(id);
        [
            self.vert(t.verts[0]).pos,
            self.vert(t.verts[1]).pos,
            self.vert(t.verts[2]).pos,
        ]
    }

    /// Add a vertex and return its id
    pub fn make_vertex(&mut self, pos: Point3<f64>) -> VertexId {
        let id = VertexId(self.verts.len() as u32);
        self.verts.push(Vertex::new(pos));
        id
    }

    /// Add a triangle, maintaining vertex adjacency. Returns None and
    /// leaves the mesh unchanged when an edge exceeds max_edge or the
    /// corners are collinear.
    pub fn make_triangle(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        v3: VertexId,
        max_edge: f64,
    ) -> Option<TriangleId> {
        if v1 == v2 || v2 == v3 || v1 == v3 {
            return None;
        }
        let p = [self.vert(v1).pos, self.vert(v2).pos, self.vert(v3).pos];
        for k in 0..3 {
            if (p[(k + 1) % 3] - p[k]).norm() > max_edge {
                return None;
            }
        }
        let plane = Plane::from_points(&p[0], &p[1], &p[2])?;

        let id = TriangleId(self.tris.len() as u32);
        self.tris.push(Triangle {
            verts: [v1, v2, v3],
            plane,
            pierced: false,
            alive: true,
        });
        self.live_tris += 1;

        for &v in &[v1, v2, v3] {
            self.vert_mut(v).tris.push(id);
        }
        for &(a, b) in &[(v1, v2), (v2, v3), (v3, v1)] {
            if !self.vert(a).verts.contains(&b) {
                self.vert_mut(a).verts.push(b);
                self.vert_mut(b).verts.push(a);
            }
        }
        Some(id)
    }

    /// Tombstone a triangle and unlink it from its vertices. Neighbor
    /// links are dropped only when no other live triangle still uses the
    /// edge.
    pub fn delete_triangle(&mut self, id: TriangleId) {
        if !self.tri(id).alive {
            return;
        }
        self.tri_mut(id).alive = false;
        self.live_tris -= 1;

        let verts = self.tri(id).verts;
        for &v in &verts {
            self.vert_mut(v).tris.retain(|&t| t != id);
        }
        for k in 0..3 {
            let (a, b) = (verts[k], verts[(k + 1) % 3]);
            if self.tris_sharing_edge(a, b).is_empty() {
                self.vert_mut(a).verts.retain(|&v| v != b);
                self.vert_mut(b).verts.retain(|&v| v != a);
            }
        }
    }

    /// Live triangles that contain both endpoints of an edge
    /// (1 on a boundary edge, 2 on an interior edge)
    pub fn tris_sharing_edge(&self, v1: VertexId, v2: VertexId) -> Vec<TriangleId> {
        self.vert(v1)
            .tris
            .iter()
            .copied()
            .filter(|&t| self.tri(t).alive && self.tri(t).verts.contains(&v2))
            .collect()
    }

    /// Recompute the boundary flag of a vertex: it is on the mesh edge if
    /// it has no triangles, or if any incident edge belongs to fewer than
    /// two triangles.
    pub fn vertex_edge_test(&mut self, v: VertexId) {
        let on_edge = if self.vert(v).tris.is_empty() {
            true
        } else {
            let neighbors = self.vert(v).verts.clone();
            neighbors
                .iter()
                .any(|&n| self.tris_sharing_edge(v, n).len() < 2)
        };
        self.vert_mut(v).on_edge = on_edge;
    }

    /// Recompute a vertex normal as the area-weighted average of its
    /// incident triangle normals. A vertex with no triangles keeps its
    /// current normal.
    pub fn find_vertex_normal(&mut self, v: VertexId) {
        let mut sum = Vector3::zeros();
        for &t in &self.vert(v).tris {
            let p = self.positions(t);
            // cross product magnitude carries the area weight
            sum += (p[1] - p[0]).cross(&(p[2] - p[0]));
        }
        let len = sum.norm();
        if len > 1e-14 {
            self.vert_mut(v).normal = sum / len;
        }
    }

    /// Recompute a triangle's supporting plane from its current vertex
    /// positions.
    pub fn recompute_plane(&mut self, id: TriangleId) {
        let p = self.positions(id);
        if let Some(plane) = Plane::from_points(&p[0], &p[1], &p[2]) {
            self.tri_mut(id).plane = plane;
        }
    }

    /// Build (or rebuild) the spatial hash over all current vertices.
    pub fn build_hash(&mut self, cell_size: f64) {
        let mut hash = SpatialHash::new(cell_size, self.verts.len());
        for (i, v) in self.verts.iter().enumerate() {
            hash.insert(VertexId(i as u32), &v.pos);
        }
        self.hash = Some(hash);
    }

    pub fn hash(&self) -> Option<&SpatialHash> {
        self.hash.as_ref()
    }

    /// Insert a single vertex into the spatial hash, if one is built.
    pub fn add_to_hash(&mut self, v: VertexId) {
        let pos = self.vert(v).pos;
        if let Some(hash) = &mut self.hash {
            hash.insert(v, &pos);
        }
    }

    /// Absorb another mesh into this one, re-expressing its geometry via
    /// the supplied point and normal maps (typically: other-local to world
    /// to self-local). Absorbed vertices are tagged with their origin and
    /// inserted into this mesh's spatial hash. Returns the id offsets
    /// applied to the absorbed vertices and triangles.
    pub fn absorb<P, N>(&mut self, other: &mut Mesh, map_point: P, map_normal: N) -> (u32, u32)
    where
        P: Fn(&Point3<f64>) -> Point3<f64>,
        N: Fn(&Vector3<f64>) -> Vector3<f64>,
    {
        let voff = self.verts.len() as u32;
        let toff = self.tris.len() as u32;
        let other_tag = other.tag;

        for mut v in other.verts.drain(..) {
            v.pos = map_point(&v.pos);
            v.normal = map_normal(&v.normal);
            v.origin = Some(v.origin.unwrap_or(other_tag));
            for t in &mut v.tris {
                t.0 += toff;
            }
            for n in &mut v.verts {
                n.0 += voff;
            }
            self.verts.push(v);
        }
        for mut t in other.tris.drain(..) {
            for v in &mut t.verts {
                v.0 += voff;
            }
            self.tris.push(t);
        }
        self.live_tris += other.live_tris;
        other.live_tris = 0;
        other.hash = None;

        for i in voff..self.verts.len() as u32 {
            self.add_to_hash(VertexId(i));
        }
        for i in toff..self.tris.len() as u32 {
            if self.tris[i as usize].alive {
                self.recompute_plane(TriangleId(i));
            }
        }
        (voff, toff)
    }
}
