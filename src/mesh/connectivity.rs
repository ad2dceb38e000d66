//! Mesh connectivity tables.
//!
//! The adjacency store driving edge contraction: flat tables of vertices,
//! edges and triangles keyed by dense integer ids, plus a canonical
//! `(v0, v1)` hash lookup for edges and a per-vertex incidence list. The
//! graph is inherently cyclic (edges reference triangles, triangles
//! reference edges, vertices reference edges), so entities never hold
//! pointers to each other; every hop goes through the tables and removals
//! stay local.
//!
//! Rows are invalidated in place rather than deleted, keeping ids stable
//! while the simplifier destructively contracts edges. Dead rows persist
//! until a fresh mesh is rebuilt from the survivors.
//!
//! # Failure model
//!
//! Removing an already-removed id is a silent no-op. Structurally
//! impossible operations (attaching a third triangle to an edge in manifold
//! mode, naming a vertex that is not on the edge, updating an unknown edge)
//! panic: they indicate a caller bug, not bad user data.

use std::collections::HashMap;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::index::{EdgeId, TriangleId, VertexId};
use crate::mesh::triangle_mesh::TriangleMesh;

#[derive(Debug, Clone)]
struct VertexEntry {
    position: Point3<f64>,
    valid: bool,
}

#[derive(Debug, Clone)]
struct EdgeEntry {
    /// Endpoints, canonically `vertices[0] < vertices[1]`.
    vertices: [VertexId; 2],
    /// Incident triangles; `triangles[1]` is invalid for boundary edges and
    /// the pair is kept sorted ascending.
    triangles: [TriangleId; 2],
    valid: bool,
    /// Contraction cost cached by the simplifier.
    cost: f32,
    /// Optimal contraction point cached by the simplifier.
    optimal: Point3<f64>,
}

#[derive(Debug, Clone)]
struct TriangleEntry {
    vertices: [VertexId; 3],
    edges: [EdgeId; 3],
    face: u32,
    valid: bool,
}

/// Adjacency store for a triangle mesh under destructive edge contraction.
#[derive(Debug, Clone)]
pub struct MeshConnectivity {
    vertices: Vec<VertexEntry>,
    edges: Vec<EdgeEntry>,
    triangles: Vec<TriangleEntry>,
    /// Canonical `(min, max)` endpoint pair to edge id.
    edge_lookup: HashMap<(VertexId, VertexId), EdgeId>,
    /// Incident edges per vertex, in registration order.
    vertex_edges: Vec<Vec<EdgeId>>,
    allow_non_manifold: bool,
    valid_triangles: usize,
}

impl MeshConnectivity {
    /// Create an empty connectivity.
    ///
    /// With `allow_non_manifold` set, an edge silently tolerates a third
    /// incident triangle (only two are recorded); otherwise such an attach
    /// panics. The simplifier always runs in manifold mode.
    pub fn new(allow_non_manifold: bool) -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            triangles: Vec::new(),
            edge_lookup: HashMap::new(),
            vertex_edges: Vec::new(),
            allow_non_manifold,
            valid_triangles: 0,
        }
    }

    /// Build the connectivity for a validated mesh, in manifold mode.
    ///
    /// Rejects meshes that fail [`TriangleMesh::validate`] and meshes that
    /// already contain a non-manifold edge.
    pub fn from_mesh(mesh: &TriangleMesh) -> Result<Self> {
        mesh.validate()?;

        // Count undirected edge multiplicity up front so a bad input
        // surfaces as an error instead of a manifold-mode panic.
        let mut multiplicity: HashMap<(usize, usize), u32> = HashMap::new();
        for tri in mesh.triangles() {
            for k in 0..3 {
                let a = tri.vertices[k];
                let b = tri.vertices[(k + 1) % 3];
                let key = if a < b { (a, b) } else { (b, a) };
                let count = multiplicity.entry(key).or_insert(0);
                *count += 1;
                if *count > 2 {
                    return Err(MeshError::NonManifoldEdge { v0: key.0, v1: key.1 });
                }
            }
        }

        let mut conn = Self::new(false);
        for &p in mesh.positions() {
            conn.add_vertex(p);
        }
        for tri in mesh.triangles() {
            conn.add_triangle(
                tri.face,
                VertexId::new(tri.vertices[0]),
                VertexId::new(tri.vertices[1]),
                VertexId::new(tri.vertices[2]),
            );
        }
        Ok(conn)
    }

    // ==================== Construction & mutation ====================

    /// Append a vertex and return its id.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let v = VertexId::new(self.vertices.len());
        self.vertices.push(VertexEntry {
            position,
            valid: true,
        });
        self.vertex_edges.push(Vec::new());
        v
    }

    /// Add a triangle over three existing vertices, creating or attaching
    /// its edges, and return the new triangle id.
    ///
    /// Degenerate input (a repeated vertex) is rejected by returning the
    /// invalid sentinel.
    pub fn add_triangle(
        &mut self,
        face: u32,
        v0: VertexId,
        v1: VertexId,
        v2: VertexId,
    ) -> TriangleId {
        assert!(
            self.is_valid_vertex(v0) && self.is_valid_vertex(v1) && self.is_valid_vertex(v2),
            "add_triangle references an unknown or invalidated vertex"
        );
        if v0 == v1 || v1 == v2 || v0 == v2 {
            return TriangleId::invalid();
        }

        let t = TriangleId::new(self.triangles.len());
        self.triangles.push(TriangleEntry {
            vertices: [v0, v1, v2],
            edges: [EdgeId::invalid(); 3],
            face,
            valid: true,
        });

        let e0 = self.attach(v0, v1, t);
        let e1 = self.attach(v1, v2, t);
        let e2 = self.attach(v2, v0, t);
        self.triangles[t.index()].edges = [e0, e1, e2];
        self.valid_triangles += 1;
        t
    }

    /// Remove a triangle, detaching it from its edges. Edges left with no
    /// incident triangle are removed as well. No-op for ids already
    /// removed.
    pub fn remove_triangle(&mut self, t: TriangleId) {
        if !t.is_valid() || !self.triangles[t.index()].valid {
            return;
        }
        self.triangles[t.index()].valid = false;
        self.valid_triangles -= 1;

        let edges = std::mem::replace(&mut self.triangles[t.index()].edges, [EdgeId::invalid(); 3]);
        for e in edges {
            if e.is_valid() && self.edges[e.index()].valid {
                self.detach(e, t);
            }
        }
    }

    /// Remove an edge and null it out of every triangle that referenced
    /// it. A triangle whose edge slots thereby become all-invalid, or
    /// contain a duplicate reference, is removed too. No-op for ids
    /// already removed.
    pub fn remove_edge(&mut self, e: EdgeId) {
        if !e.is_valid() || !self.edges[e.index()].valid {
            return;
        }
        let incident = self.edges[e.index()].triangles;
        self.unregister_edge(e);

        for t in incident {
            if !t.is_valid() || !self.triangles[t.index()].valid {
                continue;
            }
            let entry = &mut self.triangles[t.index()];
            for slot in entry.edges.iter_mut() {
                if *slot == e {
                    *slot = EdgeId::invalid();
                }
            }
            let es = entry.edges;
            let all_gone = es.iter().all(|x| !x.is_valid());
            let duplicated = (es[0].is_valid() && es[0] == es[1])
                || (es[1].is_valid() && es[1] == es[2])
                || (es[0].is_valid() && es[0] == es[2]);
            if all_gone || duplicated {
                self.remove_triangle(t);
            }
        }
    }

    /// Rewrite `old` to `new` in a triangle's vertex triple and re-attach
    /// its edges accordingly.
    ///
    /// If the rewrite makes the triangle degenerate it is removed and
    /// `false` is returned. Returns `false` without touching anything when
    /// the triangle has already been removed.
    ///
    /// # Panics
    /// Panics if `old` is not a vertex of the triangle or `new` is not a
    /// valid vertex.
    pub fn replace_triangle_vertex(&mut self, t: TriangleId, old: VertexId, new: VertexId) -> bool {
        if !t.is_valid() || !self.triangles[t.index()].valid {
            return false;
        }
        assert!(
            self.is_valid_vertex(new),
            "replacement vertex {:?} is unknown or invalidated",
            new
        );
        let vertices = self.triangles[t.index()].vertices;
        assert!(
            vertices.contains(&old),
            "vertex {:?} is not a corner of triangle {:?}",
            old,
            t
        );

        let rewritten = vertices.map(|v| if v == old { new } else { v });
        if rewritten[0] == rewritten[1]
            || rewritten[1] == rewritten[2]
            || rewritten[0] == rewritten[2]
        {
            self.remove_triangle(t);
            return false;
        }

        let edges = std::mem::replace(&mut self.triangles[t.index()].edges, [EdgeId::invalid(); 3]);
        for e in edges {
            if e.is_valid() && self.edges[e.index()].valid {
                self.detach(e, t);
            }
        }

        self.triangles[t.index()].vertices = rewritten;
        let e0 = self.attach(rewritten[0], rewritten[1], t);
        let e1 = self.attach(rewritten[1], rewritten[2], t);
        let e2 = self.attach(rewritten[2], rewritten[0], t);
        self.triangles[t.index()].edges = [e0, e1, e2];
        true
    }

    /// Rewrite `old` to `new` in an edge's endpoint pair, updating the
    /// canonical key and the vertex-edge incidence.
    ///
    /// # Panics
    /// Panics if the edge is unknown or removed, if `old` is not one of
    /// its endpoints, if the rewrite would give the edge equal endpoints,
    /// or if an edge with the new endpoint pair already exists.
    pub fn replace_edge_vertex(&mut self, e: EdgeId, old: VertexId, new: VertexId) {
        assert!(self.is_valid_edge(e), "unknown or removed edge {:?}", e);
        let [a, b] = self.edges[e.index()].vertices;
        let other = if a == old {
            b
        } else if b == old {
            a
        } else {
            panic!("vertex {:?} is not on edge {:?}", old, e);
        };
        assert!(
            other != new,
            "rewriting {:?} to {:?} would collapse edge {:?}",
            old,
            new,
            e
        );

        self.edge_lookup.remove(&canonical(a, b));
        self.vertex_edges[old.index()].retain(|&x| x != e);

        let key = canonical(other, new);
        assert!(
            !self.edge_lookup.contains_key(&key),
            "edge ({:?}, {:?}) already exists",
            key.0,
            key.1
        );
        self.edge_lookup.insert(key, e);
        self.edges[e.index()].vertices = [key.0, key.1];
        self.vertex_edges[new.index()].push(e);
    }

    /// Mark a vertex as retired. The caller must have detached every edge
    /// and triangle first; the flag only excludes the row from rebuild.
    pub fn invalidate_vertex(&mut self, v: VertexId) {
        self.vertices[v.index()].valid = false;
    }

    // ==================== Lookup & accessors ====================

    /// Find the edge between two vertices, or the invalid sentinel.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> EdgeId {
        self.edge_lookup
            .get(&canonical(a, b))
            .copied()
            .unwrap_or_else(EdgeId::invalid)
    }

    /// Endpoints of an edge, canonically ordered.
    #[inline]
    pub fn edge_vertices(&self, e: EdgeId) -> [VertexId; 2] {
        self.edges[e.index()].vertices
    }

    /// Incident triangles of an edge; the second slot is invalid for a
    /// boundary edge.
    #[inline]
    pub fn edge_triangles(&self, e: EdgeId) -> [TriangleId; 2] {
        self.edges[e.index()].triangles
    }

    /// Edges incident on a vertex, in registration order.
    #[inline]
    pub fn vertex_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vertex_edges[v.index()]
    }

    /// Triangles incident on a vertex (deduplicated).
    pub fn vertex_triangles(&self, v: VertexId) -> Vec<TriangleId> {
        let mut out = Vec::new();
        for &e in &self.vertex_edges[v.index()] {
            for t in self.edges[e.index()].triangles {
                if t.is_valid() && !out.contains(&t) {
                    out.push(t);
                }
            }
        }
        out
    }

    /// The endpoint of `e` that is not `v`.
    ///
    /// # Panics
    /// Panics if `v` is not on the edge.
    pub fn other_vertex(&self, e: EdgeId, v: VertexId) -> VertexId {
        let [a, b] = self.edges[e.index()].vertices;
        if a == v {
            b
        } else if b == v {
            a
        } else {
            panic!("vertex {:?} is not on edge {:?}", v, e);
        }
    }

    /// Vertex triple of a triangle, in winding order.
    #[inline]
    pub fn triangle_vertices(&self, t: TriangleId) -> [VertexId; 3] {
        self.triangles[t.index()].vertices
    }

    /// Edge triple of a triangle.
    #[inline]
    pub fn triangle_edges(&self, t: TriangleId) -> [EdgeId; 3] {
        self.triangles[t.index()].edges
    }

    /// Face tag of a triangle.
    #[inline]
    pub fn triangle_face(&self, t: TriangleId) -> u32 {
        self.triangles[t.index()].face
    }

    /// Whether `v` is a corner of triangle `t`.
    #[inline]
    pub fn triangle_has_vertex(&self, t: TriangleId, v: VertexId) -> bool {
        self.triangles[t.index()].vertices.contains(&v)
    }

    /// Whether an edge has exactly one incident triangle.
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId) -> bool {
        !self.edges[e.index()].triangles[1].is_valid()
    }

    /// Whether a vertex lies on the mesh boundary. Isolated vertices count
    /// as boundary.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let edges = &self.vertex_edges[v.index()];
        edges.is_empty() || edges.iter().any(|&e| self.is_boundary_edge(e))
    }

    /// Whether the id names a live vertex.
    #[inline]
    pub fn is_valid_vertex(&self, v: VertexId) -> bool {
        v.is_valid() && v.index() < self.vertices.len() && self.vertices[v.index()].valid
    }

    /// Whether the id names a live edge.
    #[inline]
    pub fn is_valid_edge(&self, e: EdgeId) -> bool {
        e.is_valid() && e.index() < self.edges.len() && self.edges[e.index()].valid
    }

    /// Whether the id names a live triangle.
    #[inline]
    pub fn is_valid_triangle(&self, t: TriangleId) -> bool {
        t.is_valid() && t.index() < self.triangles.len() && self.triangles[t.index()].valid
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertices[v.index()].position
    }

    /// Move a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, position: Point3<f64>) {
        self.vertices[v.index()].position = position;
    }

    /// Cached contraction cost of an edge.
    #[inline]
    pub fn edge_cost(&self, e: EdgeId) -> f32 {
        self.edges[e.index()].cost
    }

    /// Cached optimal contraction point of an edge.
    #[inline]
    pub fn edge_optimal(&self, e: EdgeId) -> Point3<f64> {
        self.edges[e.index()].optimal
    }

    /// Cache the contraction cost and optimal point for an edge.
    #[inline]
    pub fn set_edge_metrics(&mut self, e: EdgeId, cost: f32, optimal: Point3<f64>) {
        let entry = &mut self.edges[e.index()];
        entry.cost = cost;
        entry.optimal = optimal;
    }

    /// Number of live triangles.
    #[inline]
    pub fn valid_triangle_count(&self) -> usize {
        self.valid_triangles
    }

    /// Number of vertex table rows, live or dead.
    #[inline]
    pub fn vertex_table_len(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edge table rows, live or dead.
    #[inline]
    pub fn edge_table_len(&self) -> usize {
        self.edges.len()
    }

    /// Number of triangle table rows, live or dead.
    #[inline]
    pub fn triangle_table_len(&self) -> usize {
        self.triangles.len()
    }

    /// Ids of all live vertices.
    pub fn valid_vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.valid)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Ids of all live edges.
    pub fn valid_edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.valid)
            .map(|(i, _)| EdgeId::new(i))
    }

    /// Ids of all live triangles.
    pub fn valid_triangle_ids(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.valid)
            .map(|(i, _)| TriangleId::new(i))
    }

    // ==================== Integrity ====================

    /// Exhaustive structural check of the adjacency invariants: canonical
    /// unique edge keys, triangle/edge closure, at most two triangles per
    /// edge, vertex-edge duality and triangle non-degeneracy. Intended for
    /// tests and debugging, not hot paths.
    pub fn is_consistent(&self) -> bool {
        // Canonical, uniquely registered edge keys.
        for e in self.valid_edge_ids() {
            let [a, b] = self.edge_vertices(e);
            if a >= b {
                return false;
            }
            if self.edge_lookup.get(&(a, b)) != Some(&e) {
                return false;
            }
            // Both endpoints live and listing the edge.
            for v in [a, b] {
                if !self.is_valid_vertex(v) || !self.vertex_edges[v.index()].contains(&e) {
                    return false;
                }
            }
            // Triangle slots: sorted, at least one, each listing the edge.
            let [t0, t1] = self.edge_triangles(e);
            if !t0.is_valid() {
                return false;
            }
            if t1.is_valid() && t1 <= t0 {
                return false;
            }
            for t in [t0, t1] {
                if t.is_valid()
                    && (!self.is_valid_triangle(t) || !self.triangle_edges(t).contains(&e))
                {
                    return false;
                }
            }
        }

        // Incidence lists only reference live edges at the right vertex.
        for (vi, edges) in self.vertex_edges.iter().enumerate() {
            for &e in edges {
                if !self.is_valid_edge(e) {
                    return false;
                }
                if !self.edge_vertices(e).contains(&VertexId::new(vi)) {
                    return false;
                }
            }
        }

        // Triangles close over live vertices and matching edges.
        for t in self.valid_triangle_ids() {
            let vs = self.triangle_vertices(t);
            if vs[0] == vs[1] || vs[1] == vs[2] || vs[0] == vs[2] {
                return false;
            }
            if vs.iter().any(|&v| !self.is_valid_vertex(v)) {
                return false;
            }
            let es = self.triangle_edges(t);
            for k in 0..3 {
                let e = es[k];
                if !self.is_valid_edge(e) {
                    return false;
                }
                let expected = canonical(vs[k], vs[(k + 1) % 3]);
                if self.edge_vertices(e) != [expected.0, expected.1] {
                    return false;
                }
                if !self.edge_triangles(e).contains(&t) {
                    return false;
                }
            }
        }

        true
    }

    // ==================== Internals ====================

    /// Attach triangle `t` to the edge between `a` and `b`, creating the
    /// edge on first observation.
    fn attach(&mut self, a: VertexId, b: VertexId, t: TriangleId) -> EdgeId {
        let key = canonical(a, b);
        if let Some(&e) = self.edge_lookup.get(&key) {
            let entry = &mut self.edges[e.index()];
            if !entry.triangles[1].is_valid() {
                if t < entry.triangles[0] {
                    entry.triangles[1] = entry.triangles[0];
                    entry.triangles[0] = t;
                } else {
                    entry.triangles[1] = t;
                }
            } else if !self.allow_non_manifold {
                panic!(
                    "non-manifold attach: edge ({:?}, {:?}) already has two triangles",
                    key.0, key.1
                );
            }
            // In non-manifold mode a third incidence is tolerated but the
            // edge keeps recording only two triangles.
            e
        } else {
            let e = EdgeId::new(self.edges.len());
            self.edges.push(EdgeEntry {
                vertices: [key.0, key.1],
                triangles: [t, TriangleId::invalid()],
                valid: true,
                cost: 0.0,
                optimal: Point3::origin(),
            });
            self.edge_lookup.insert(key, e);
            self.vertex_edges[key.0.index()].push(e);
            self.vertex_edges[key.1.index()].push(e);
            e
        }
    }

    /// Detach triangle `t` from edge `e`, promoting the second slot and
    /// removing the edge once no triangle is left.
    fn detach(&mut self, e: EdgeId, t: TriangleId) {
        let entry = &mut self.edges[e.index()];
        if entry.triangles[0] == t {
            entry.triangles[0] = entry.triangles[1];
            entry.triangles[1] = TriangleId::invalid();
        } else if entry.triangles[1] == t {
            entry.triangles[1] = TriangleId::invalid();
        }
        if !entry.triangles[0].is_valid() {
            self.unregister_edge(e);
        }
    }

    /// Drop an edge from the lookup and incidence structures and mark it
    /// dead. Does not touch triangles.
    fn unregister_edge(&mut self, e: EdgeId) {
        let [a, b] = self.edges[e.index()].vertices;
        self.edge_lookup.remove(&(a, b));
        self.vertex_edges[a.index()].retain(|&x| x != e);
        self.vertex_edges[b.index()].retain(|&x| x != e);
        self.edges[e.index()].valid = false;
    }
}

#[inline]
fn canonical(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles sharing the edge (1, 2).
    fn quad() -> MeshConnectivity {
        let mut conn = MeshConnectivity::new(false);
        let v0 = conn.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = conn.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let v2 = conn.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let v3 = conn.add_vertex(Point3::new(1.0, 1.0, 0.0));
        conn.add_triangle(0, v0, v1, v2);
        conn.add_triangle(0, v1, v3, v2);
        conn
    }

    fn tetrahedron_mesh() -> TriangleMesh {
        let mut mesh = TriangleMesh::with_precision(1e-5);
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
        mesh.add_triangle(0, 0, 2, 1);
        mesh.add_triangle(1, 0, 1, 3);
        mesh.add_triangle(2, 1, 2, 3);
        mesh.add_triangle(3, 2, 0, 3);
        mesh
    }

    #[test]
    fn test_quad_topology() {
        let conn = quad();
        assert_eq!(conn.valid_triangle_count(), 2);
        assert_eq!(conn.edge_table_len(), 5);
        assert!(conn.is_consistent());

        let shared = conn.find_edge(VertexId::new(1), VertexId::new(2));
        assert!(shared.is_valid());
        assert!(!conn.is_boundary_edge(shared));

        let rim = conn.find_edge(VertexId::new(0), VertexId::new(1));
        assert!(conn.is_boundary_edge(rim));
        assert!(conn.is_boundary_vertex(VertexId::new(0)));
        assert!(conn.is_boundary_vertex(VertexId::new(1)));
    }

    #[test]
    fn test_find_edge_absent_is_sentinel() {
        let conn = quad();
        assert!(!conn.find_edge(VertexId::new(0), VertexId::new(3)).is_valid());
    }

    #[test]
    fn test_degenerate_add_returns_sentinel() {
        let mut conn = quad();
        let t = conn.add_triangle(0, VertexId::new(0), VertexId::new(0), VertexId::new(1));
        assert!(!t.is_valid());
        assert_eq!(conn.valid_triangle_count(), 2);
    }

    #[test]
    fn test_remove_triangle_prunes_orphan_edges() {
        let mut conn = quad();
        conn.remove_triangle(TriangleId::new(0));

        assert_eq!(conn.valid_triangle_count(), 1);
        // The shared edge survives on the second triangle and is now
        // boundary; the two rim edges of triangle 0 are gone.
        let shared = conn.find_edge(VertexId::new(1), VertexId::new(2));
        assert!(shared.is_valid());
        assert!(conn.is_boundary_edge(shared));
        assert!(!conn.find_edge(VertexId::new(0), VertexId::new(1)).is_valid());
        assert!(!conn.find_edge(VertexId::new(0), VertexId::new(2)).is_valid());
        assert!(conn.is_consistent());

        // Removing it again is a no-op.
        conn.remove_triangle(TriangleId::new(0));
        assert_eq!(conn.valid_triangle_count(), 1);
    }

    #[test]
    fn test_remove_edge_detaches_from_triangles() {
        let mut conn = quad();
        let shared = conn.find_edge(VertexId::new(1), VertexId::new(2));
        conn.remove_edge(shared);

        // Both triangles referenced the shared edge; each loses one slot
        // and survives, still holding its two rim edges.
        assert_eq!(conn.valid_triangle_count(), 2);
        assert!(!conn.is_valid_edge(shared));

        conn.remove_edge(shared); // idempotent
        assert_eq!(conn.valid_triangle_count(), 2);
    }

    #[test]
    #[should_panic(expected = "non-manifold attach")]
    fn test_manifold_mode_rejects_third_triangle() {
        let mut conn = quad();
        let v4 = conn.add_vertex(Point3::new(0.5, 0.5, 1.0));
        conn.add_triangle(0, VertexId::new(1), VertexId::new(2), v4);
    }

    #[test]
    fn test_non_manifold_mode_tolerates_third_triangle() {
        let mut conn = MeshConnectivity::new(true);
        let v0 = conn.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = conn.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let v2 = conn.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let v3 = conn.add_vertex(Point3::new(1.0, 1.0, 0.0));
        let v4 = conn.add_vertex(Point3::new(0.5, 0.5, 1.0));
        conn.add_triangle(0, v0, v1, v2);
        conn.add_triangle(0, v1, v3, v2);
        let t = conn.add_triangle(0, v1, v2, v4);
        assert!(t.is_valid());
        assert_eq!(conn.valid_triangle_count(), 3);
    }

    #[test]
    fn test_replace_triangle_vertex() {
        let mut conn = quad();
        let v4 = conn.add_vertex(Point3::new(2.0, 0.0, 0.0));

        // Move the lone corner of triangle 1 from v3 to v4.
        assert!(conn.replace_triangle_vertex(TriangleId::new(1), VertexId::new(3), v4));
        assert!(conn.is_consistent());
        assert!(conn.find_edge(VertexId::new(1), v4).is_valid());
        assert!(conn.find_edge(VertexId::new(2), v4).is_valid());
        assert!(!conn.find_edge(VertexId::new(1), VertexId::new(3)).is_valid());
        assert_eq!(conn.vertex_triangles(v4), vec![TriangleId::new(1)]);
    }

    #[test]
    fn test_replace_triangle_vertex_degenerate_removes() {
        let mut conn = quad();
        // Rewriting v3 to v1 gives triangle (v1, v1, v2).
        assert!(!conn.replace_triangle_vertex(
            TriangleId::new(1),
            VertexId::new(3),
            VertexId::new(1)
        ));
        assert_eq!(conn.valid_triangle_count(), 1);
        assert!(conn.is_consistent());
    }

    #[test]
    #[should_panic(expected = "not a corner")]
    fn test_replace_triangle_vertex_unknown_corner_panics() {
        let mut conn = quad();
        conn.replace_triangle_vertex(TriangleId::new(0), VertexId::new(3), VertexId::new(0));
    }

    #[test]
    fn test_replace_edge_vertex() {
        let mut conn = quad();
        let v4 = conn.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let rim = conn.find_edge(VertexId::new(0), VertexId::new(1));

        conn.replace_edge_vertex(rim, VertexId::new(0), v4);
        assert_eq!(conn.find_edge(VertexId::new(1), v4), rim);
        assert!(!conn.find_edge(VertexId::new(0), VertexId::new(1)).is_valid());
        assert!(conn.vertex_edges(v4).contains(&rim));
        assert!(!conn.vertex_edges(VertexId::new(0)).contains(&rim));
    }

    #[test]
    #[should_panic(expected = "is not on edge")]
    fn test_replace_edge_vertex_wrong_vertex_panics() {
        let mut conn = quad();
        let rim = conn.find_edge(VertexId::new(0), VertexId::new(1));
        conn.replace_edge_vertex(rim, VertexId::new(3), VertexId::new(0));
    }

    #[test]
    #[should_panic(expected = "is not on edge")]
    fn test_other_vertex_panics_for_off_edge_vertex() {
        let conn = quad();
        let rim = conn.find_edge(VertexId::new(0), VertexId::new(1));
        conn.other_vertex(rim, VertexId::new(3));
    }

    #[test]
    fn test_from_mesh() {
        let conn = MeshConnectivity::from_mesh(&tetrahedron_mesh()).unwrap();
        assert_eq!(conn.valid_triangle_count(), 4);
        assert_eq!(conn.edge_table_len(), 6);
        assert!(conn.is_consistent());
        // A closed surface has no boundary.
        for e in conn.valid_edge_ids() {
            assert!(!conn.is_boundary_edge(e));
        }
    }

    #[test]
    fn test_from_mesh_rejects_non_manifold() {
        let mut mesh = tetrahedron_mesh();
        // A fifth triangle over an existing interior edge makes (1, 2)
        // three-sided.
        mesh.add_vertex(Point3::new(1.0, 1.0, 1.0));
        mesh.add_triangle(4, 1, 2, 4);
        assert!(matches!(
            MeshConnectivity::from_mesh(&mesh),
            Err(MeshError::NonManifoldEdge { v0: 1, v1: 2 })
        ));
    }

    #[test]
    fn test_vertex_triangles_deduplicates() {
        let conn = quad();
        let tris = conn.vertex_triangles(VertexId::new(1));
        assert_eq!(tris.len(), 2);
        let tris = conn.vertex_triangles(VertexId::new(0));
        assert_eq!(tris, vec![TriangleId::new(0)]);
    }
}
