//! Indexed triangle mesh.
//!
//! The exchange format at the crate boundary: an ordered sequence of vertex
//! positions plus a set of face-tagged triangles, accompanied by a linear
//! precision in model units. The simplifier consumes and produces this
//! type; the connectivity structure is built from it.

use std::collections::{HashMap, VecDeque};

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::math::BoundingBox;
use crate::tolerance::MIN_CROSS_LENGTH;

/// A triangle of a [`TriangleMesh`].
///
/// The face tag is an opaque integer identifying which original surface the
/// triangle belongs to; it survives simplification unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTriangle {
    /// Opaque face tag.
    pub face: u32,
    /// Vertex indices in winding order.
    pub vertices: [usize; 3],
}

/// An indexed triangle mesh with per-triangle face tags.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    positions: Vec<Point3<f64>>,
    triangles: Vec<MeshTriangle>,
    precision: f64,
}

impl TriangleMesh {
    /// Create an empty mesh with the given linear precision (model units).
    pub fn with_precision(precision: f64) -> Self {
        Self {
            positions: Vec::new(),
            triangles: Vec::new(),
            precision,
        }
    }

    /// Create an empty mesh with pre-allocated storage.
    pub fn with_capacity(precision: f64, num_vertices: usize, num_triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(num_vertices),
            triangles: Vec::with_capacity(num_triangles),
            precision,
        }
    }

    // ==================== Construction ====================

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.positions.push(position);
        self.positions.len() - 1
    }

    /// Append a triangle with the given face tag and vertex indices.
    pub fn add_triangle(&mut self, face: u32, v0: usize, v1: usize, v2: usize) {
        self.triangles.push(MeshTriangle {
            face,
            vertices: [v0, v1, v2],
        });
    }

    // ==================== Accessors ====================

    /// The mesh precision (linear tolerance in model units).
    #[inline]
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no vertices or no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangles.is_empty()
    }

    /// All vertex positions.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// All triangles.
    #[inline]
    pub fn triangles(&self) -> &[MeshTriangle] {
        &self.triangles
    }

    /// Position of vertex `v`.
    #[inline]
    pub fn position(&self, v: usize) -> &Point3<f64> {
        &self.positions[v]
    }

    // ==================== Validation ====================

    /// Check that every triangle references existing vertices and has three
    /// distinct corners.
    pub fn validate(&self) -> Result<()> {
        if self.triangles.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        for (ti, tri) in self.triangles.iter().enumerate() {
            for &vi in &tri.vertices {
                if vi >= self.positions.len() {
                    return Err(MeshError::InvalidVertexIndex {
                        triangle: ti,
                        vertex: vi,
                    });
                }
            }
            let [v0, v1, v2] = tri.vertices;
            if v0 == v1 || v1 == v2 || v0 == v2 {
                return Err(MeshError::DegenerateTriangle { triangle: ti });
            }
        }
        Ok(())
    }

    // ==================== Geometry ====================

    /// Un-normalized normal of triangle `t` (cross product of its edges).
    pub fn triangle_cross(&self, t: usize) -> Vector3<f64> {
        let [v0, v1, v2] = self.triangles[t].vertices;
        let e1 = self.positions[v1] - self.positions[v0];
        let e2 = self.positions[v2] - self.positions[v0];
        e1.cross(&e2)
    }

    /// Unit normal of triangle `t`, or `None` when the triangle is too
    /// small to orient.
    pub fn triangle_normal(&self, t: usize) -> Option<Vector3<f64>> {
        let cross = self.triangle_cross(t);
        let len = cross.norm();
        if len < MIN_CROSS_LENGTH {
            None
        } else {
            Some(cross / len)
        }
    }

    /// Area of triangle `t`.
    pub fn triangle_area(&self, t: usize) -> f64 {
        0.5 * self.triangle_cross(t).norm()
    }

    /// The smallest axis-aligned box containing all vertices, or `None`
    /// when the mesh has none.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.positions)
    }

    // ==================== Orientation ====================

    /// Make triangle windings consistent across each connected component.
    ///
    /// Flood-fills over shared manifold edges, flipping any triangle that
    /// traverses a shared edge in the same direction as its already-visited
    /// neighbour. Boundary and non-manifold edges are left as seams; the
    /// first triangle of each component fixes that component's orientation.
    pub fn unify_orientation(&mut self) {
        let n = self.triangles.len();
        let mut edge_triangles: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (ti, tri) in self.triangles.iter().enumerate() {
            for k in 0..3 {
                let a = tri.vertices[k];
                let b = tri.vertices[(k + 1) % 3];
                let key = if a < b { (a, b) } else { (b, a) };
                edge_triangles.entry(key).or_default().push(ti);
            }
        }

        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        for seed in 0..n {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            queue.push_back(seed);

            while let Some(ti) = queue.pop_front() {
                let tri = self.triangles[ti].vertices;
                for k in 0..3 {
                    let a = tri[k];
                    let b = tri[(k + 1) % 3];
                    let key = if a < b { (a, b) } else { (b, a) };
                    let incident = &edge_triangles[&key];
                    if incident.len() != 2 {
                        continue;
                    }
                    for &tj in incident {
                        if tj == ti || visited[tj] {
                            continue;
                        }
                        // `ti` walks a -> b; a consistent neighbour walks b -> a.
                        if has_directed_edge(&self.triangles[tj].vertices, a, b) {
                            self.triangles[tj].vertices.swap(1, 2);
                        }
                        visited[tj] = true;
                        queue.push_back(tj);
                    }
                }
            }
        }
    }
}

fn has_directed_edge(vertices: &[usize; 3], a: usize, b: usize) -> bool {
    (0..3).any(|k| vertices[k] == a && vertices[(k + 1) % 3] == b)
}
