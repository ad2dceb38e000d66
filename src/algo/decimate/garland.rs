//! Garland-Heckbert edge-contraction driver.

use nalgebra::{Point3, Vector3};

use crate::error::Result;
use crate::heap::IndexedMinHeap;
use crate::math::Quadric;
use crate::mesh::{EdgeId, MeshConnectivity, TriangleId, TriangleMesh, VertexId};
use crate::tolerance::{MIN_CROSS_LENGTH, NORMAL_FLIP_MIN_DOT};

use super::SimplifyOptions;

/// Simplify a mesh toward the target triangle count of `options`.
///
/// Returns a fresh mesh with at most the target number of triangles where
/// the safety checks allow it; when no further contraction is feasible the
/// best achievable mesh is returned, which the caller can detect by
/// comparing triangle counts. Face tags and boundary vertex positions are
/// preserved.
///
/// # Errors
///
/// Rejects empty meshes, meshes with out-of-range or repeated vertex
/// indices, and meshes that already contain a non-manifold edge. Behaviour
/// on such inputs is otherwise undefined, so they are refused up front.
pub fn simplify(mesh: &TriangleMesh, options: &SimplifyOptions) -> Result<TriangleMesh> {
    let target = options.compute_target(mesh.triangle_count());
    let mut conn = MeshConnectivity::from_mesh(mesh)?;

    // Phase A: accumulate area-weighted plane quadrics per vertex.
    let mut quadrics = vec![Quadric::zero(); conn.vertex_table_len()];
    accumulate_plane_quadrics(&conn, &mut quadrics);

    // Phase B: price every edge and queue it.
    let mut heap = IndexedMinHeap::with_capacity(conn.edge_table_len());
    let edges: Vec<EdgeId> = conn.valid_edge_ids().collect();
    for e in edges {
        price_edge(&mut conn, &quadrics, e);
        heap.push(e.index(), conn.edge_cost(e));
    }

    // Phase C: contract cheapest-first until the target is reached or no
    // candidate survives the safety checks.
    let mut contracted = 0usize;
    let mut infeasible = 0usize;
    while conn.valid_triangle_count() > target {
        let Some((id, _)) = heap.pop_min() else {
            break;
        };
        let e = EdgeId::new(id);
        if !conn.is_valid_edge(e) {
            // Stale entry: the edge died in an earlier contraction.
            continue;
        }
        if !contraction_is_safe(&conn, e) {
            infeasible += 1;
            continue;
        }
        contract(&mut conn, &mut quadrics, &mut heap, e);
        contracted += 1;
    }
    log::debug!(
        "simplify: {} -> {} triangles ({} contractions, {} infeasible candidates)",
        mesh.triangle_count(),
        conn.valid_triangle_count(),
        contracted,
        infeasible
    );

    // Phase D: rebuild a fresh mesh from the survivors.
    Ok(rebuild(&conn, mesh.precision()))
}

/// Compute each valid triangle's plane quadric and accumulate it,
/// area-weighted, onto the triangle's three vertices.
fn accumulate_plane_quadrics(conn: &MeshConnectivity, quadrics: &mut [Quadric]) {
    for t in conn.valid_triangle_ids() {
        let [v0, v1, v2] = conn.triangle_vertices(t);
        let p0 = conn.position(v0);
        let p1 = conn.position(v1);
        let p2 = conn.position(v2);

        let cross = (p1 - p0).cross(&(p2 - p0));
        let len = cross.norm();
        if len < MIN_CROSS_LENGTH {
            continue;
        }
        let normal = cross / len;
        let centroid = Point3::from((p0.coords + p1.coords + p2.coords) / 3.0);

        let mut q = Quadric::from_plane(&normal, &centroid);
        q.scale(0.5 * len);
        quadrics[v0.index()] += q;
        quadrics[v1.index()] += q;
        quadrics[v2.index()] += q;
    }
}

/// Choose the contraction point for an edge and cache its cost.
///
/// Boundary edges contract to their midpoint and an interior edge with
/// exactly one boundary endpoint is pinned to that endpoint, so boundary
/// geometry survives; everything else gets the quadric minimizer.
fn price_edge(conn: &mut MeshConnectivity, quadrics: &[Quadric], e: EdgeId) {
    let [v0, v1] = conn.edge_vertices(e);
    let q = quadrics[v0.index()] + quadrics[v1.index()];
    let p0 = *conn.position(v0);
    let p1 = *conn.position(v1);

    let optimal = if conn.is_boundary_edge(e) {
        Point3::from((p0.coords + p1.coords) * 0.5)
    } else {
        let b0 = conn.is_boundary_vertex(v0);
        let b1 = conn.is_boundary_vertex(v1);
        if b0 && !b1 {
            p0
        } else if b1 && !b0 {
            p1
        } else {
            q.optimal(&p0, &p1)
        }
    };

    conn.set_edge_metrics(e, q.evaluate(&optimal) as f32, optimal);
}

/// The vertex of `t` that is on neither end of the contracted edge.
fn third_vertex(conn: &MeshConnectivity, t: TriangleId, v0: VertexId, v1: VertexId) -> VertexId {
    for v in conn.triangle_vertices(t) {
        if v != v0 && v != v1 {
            return v;
        }
    }
    panic!("triangle {:?} has no vertex besides {:?} and {:?}", t, v0, v1);
}

/// One-ring neighbours of `v` through its incident edges.
fn edge_neighbours(conn: &MeshConnectivity, v: VertexId) -> Vec<VertexId> {
    conn.vertex_edges(v)
        .iter()
        .map(|&e| conn.other_vertex(e, v))
        .collect()
}

/// One-ring neighbours of `v` through its incident triangles.
fn triangle_neighbours(conn: &MeshConnectivity, v: VertexId) -> Vec<VertexId> {
    let mut out = Vec::new();
    for t in conn.vertex_triangles(v) {
        for w in conn.triangle_vertices(t) {
            if w != v && !out.contains(&w) {
                out.push(w);
            }
        }
    }
    out
}

/// The full safety gauntlet. A contraction may proceed only when every
/// topological and geometric check passes.
fn contraction_is_safe(conn: &MeshConnectivity, e: EdgeId) -> bool {
    let [v0, v1] = conn.edge_vertices(e);
    let [t0, t1] = conn.edge_triangles(e);
    let interior = t1.is_valid();

    // Merging two boundary vertices either shortens the boundary loop or
    // pinches two loops together; both destroy the surface outline.
    if conn.is_boundary_vertex(v0) && conn.is_boundary_vertex(v1) {
        return false;
    }

    let w0 = third_vertex(conn, t0, v0, v1);
    let w1 = interior.then(|| third_vertex(conn, t1, v0, v1));

    // Identical third vertices would fuse the two faces into a sliver.
    if w1 == Some(w0) {
        return false;
    }

    let is_wing = |n: VertexId| n == w0 || w1 == Some(n);

    // Any shared neighbour beyond the wing vertices means the contracted
    // edge would be shared by three triangles.
    let n0 = edge_neighbours(conn, v0);
    let n1 = edge_neighbours(conn, v1);
    for &n in &n0 {
        if n != v1 && n1.contains(&n) && !is_wing(n) {
            return false;
        }
    }

    // A valence-3 interior vertex whose opposite edge separates v0 from v1
    // would have its one-ring split by the contraction.
    if interior && !conn.is_boundary_vertex(v0) && conn.vertex_edges(v0).len() == 3 {
        if let Some(w1) = w1 {
            let opposite = conn.find_edge(w0, w1);
            if opposite.is_valid() && !conn.is_boundary_edge(opposite) {
                let [a, b] = conn.edge_triangles(opposite);
                let separates = (conn.triangle_has_vertex(a, v0) && conn.triangle_has_vertex(b, v1))
                    || (conn.triangle_has_vertex(a, v1) && conn.triangle_has_vertex(b, v0));
                if separates {
                    return false;
                }
            }
        }
    }

    // A boundary edge whose triangle carries a second boundary edge would
    // seal a boundary hole when contracted.
    if !interior {
        for oe in conn.triangle_edges(t0) {
            if oe != e && oe.is_valid() && conn.is_boundary_edge(oe) {
                return false;
            }
        }
    }

    // Normal-flip check over the surviving ring: moving v0 and v1 to the
    // contraction point must not rotate any neighbouring triangle past the
    // angular bound.
    let p_star = conn.edge_optimal(e);
    let mut ring = conn.vertex_triangles(v0);
    for t in conn.vertex_triangles(v1) {
        if !ring.contains(&t) {
            ring.push(t);
        }
    }
    for t in ring {
        if t == t0 || (interior && t == t1) {
            continue;
        }
        let vs = conn.triangle_vertices(t);
        let current = triangle_cross(conn, vs, None, v0, v1);
        let current_len = current.norm();
        if current_len < MIN_CROSS_LENGTH {
            continue;
        }
        let moved = triangle_cross(conn, vs, Some(p_star), v0, v1);
        let moved_len = moved.norm();
        if moved_len < MIN_CROSS_LENGTH {
            return false;
        }
        if current.dot(&moved) / (current_len * moved_len) < NORMAL_FLIP_MIN_DOT {
            return false;
        }
    }

    // Link condition: a vertex adjacent to both endpoints through the
    // triangle one-rings must belong to one of the edge's own triangles.
    let r0 = triangle_neighbours(conn, v0);
    let r1 = triangle_neighbours(conn, v1);
    for &n in &r0 {
        if n != v1 && r1.contains(&n) && !is_wing(n) {
            return false;
        }
    }

    true
}

/// Cross product of a triangle's edges, optionally substituting the
/// contraction point for either endpoint of the contracted edge.
fn triangle_cross(
    conn: &MeshConnectivity,
    vertices: [VertexId; 3],
    replace: Option<Point3<f64>>,
    v0: VertexId,
    v1: VertexId,
) -> Vector3<f64> {
    let pos = |v: VertexId| -> Point3<f64> {
        match replace {
            Some(p) if v == v0 || v == v1 => p,
            _ => *conn.position(v),
        }
    };
    let p0 = pos(vertices[0]);
    let p1 = pos(vertices[1]);
    let p2 = pos(vertices[2]);
    (p1 - p0).cross(&(p2 - p0))
}

/// Contract `e`: retire its second endpoint onto the cached optimal point
/// of the first, rewire the surviving ring and re-price it.
fn contract(
    conn: &mut MeshConnectivity,
    quadrics: &mut [Quadric],
    heap: &mut IndexedMinHeap,
    e: EdgeId,
) {
    let [v0, v1] = conn.edge_vertices(e);
    let p_star = conn.edge_optimal(e);
    let [t0, t1] = conn.edge_triangles(e);

    // The edge's own triangles collapse first; once both are gone the edge
    // itself has no incident triangle left and is removed with them. The
    // removal order matters: ring triangles must not be rewired while a
    // doomed wing triangle still occupies an edge slot they need.
    conn.remove_triangle(t0);
    conn.remove_triangle(t1);
    debug_assert!(!conn.is_valid_edge(e));

    conn.set_position(v0, p_star);
    let absorbed = quadrics[v1.index()];
    quadrics[v0.index()] += absorbed;

    // Rewire the remaining ring of v1 onto v0. A rewrite that degenerates
    // a triangle removes it instead.
    for t in conn.vertex_triangles(v1) {
        conn.replace_triangle_vertex(t, v1, v0);
    }

    // Every triangle of an edge at v1 contained v1, so after the rewiring
    // pass any edge still registered there has lost all of its triangles;
    // sweep the stragglers and retire the vertex.
    for stale in conn.vertex_edges(v1).to_vec() {
        conn.remove_edge(stale);
    }
    conn.invalidate_vertex(v1);

    // Re-price the surviving ring around v0.
    for re in conn.vertex_edges(v0).to_vec() {
        price_edge(conn, quadrics, re);
        let cost = conn.edge_cost(re);
        if heap.contains(re.index()) {
            heap.update(re.index(), cost);
        } else {
            heap.push(re.index(), cost);
        }
    }
}

/// Build a fresh, densely indexed mesh from the surviving vertices and
/// triangles, preserving face tags.
fn rebuild(conn: &MeshConnectivity, precision: f64) -> TriangleMesh {
    let mut out = TriangleMesh::with_capacity(
        precision,
        conn.vertex_table_len(),
        conn.valid_triangle_count(),
    );

    let mut remap = vec![usize::MAX; conn.vertex_table_len()];
    for v in conn.valid_vertex_ids() {
        remap[v.index()] = out.add_vertex(*conn.position(v));
    }
    for t in conn.valid_triangle_ids() {
        let [v0, v1, v2] = conn.triangle_vertices(t);
        out.add_triangle(
            conn.triangle_face(t),
            remap[v0.index()],
            remap[v1.index()],
            remap[v2.index()],
        );
    }

    out.unify_orientation();
    out
}
