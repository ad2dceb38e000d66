//! Mesh decimation (simplification).
//!
//! This module reduces the triangle count of an indexed mesh toward a
//! caller-supplied target while preserving the perceptual shape, the
//! surface boundary and per-triangle face tags.
//!
//! # Quadric Error Metrics
//!
//! The driver implements the Garland & Heckbert (1997) algorithm: each
//! vertex accumulates the area-weighted quadrics of its incident triangle
//! planes, each edge is priced by the error of its optimal contraction
//! point, and the cheapest edge is contracted repeatedly until the target
//! is reached. Every candidate contraction must first pass a battery of
//! topological and geometric safety checks; an edge that fails is skipped
//! and the loop moves on to the next-cheapest candidate, so the result is
//! the best achievable mesh when the target cannot be met.
//!
//! # Example
//!
//! ```
//! use chamfer::algo::decimate::{simplify, SimplifyOptions};
//! use chamfer::mesh::TriangleMesh;
//! use nalgebra::Point3;
//!
//! let mut mesh = TriangleMesh::with_precision(1e-5);
//! mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
//! mesh.add_triangle(0, 0, 2, 1);
//! mesh.add_triangle(1, 0, 1, 3);
//! mesh.add_triangle(2, 1, 2, 3);
//! mesh.add_triangle(3, 2, 0, 3);
//!
//! let options = SimplifyOptions::with_target_triangles(4);
//! let simplified = simplify(&mesh, &options).unwrap();
//! assert_eq!(simplified.triangle_count(), 4);
//! ```
//!
//! # References
//!
//! - Garland, M. & Heckbert, P. (1997). "Surface Simplification Using
//!   Quadric Error Metrics." SIGGRAPH '97.

mod garland;

pub use garland::simplify;

/// Options for mesh simplification.
#[derive(Debug, Clone)]
pub struct SimplifyOptions {
    /// Target number of triangles after simplification.
    /// If None, uses target_ratio instead.
    pub target_triangles: Option<usize>,

    /// Target ratio of triangles to keep (0.0 to 1.0).
    /// Only used if target_triangles is None.
    pub target_ratio: f64,
}

impl SimplifyOptions {
    /// Create options to reduce to a target number of triangles.
    pub fn with_target_triangles(target: usize) -> Self {
        Self {
            target_triangles: Some(target),
            target_ratio: 0.5,
        }
    }

    /// Create options to reduce to a ratio of the original triangle count.
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target_triangles: None,
            target_ratio: ratio.clamp(0.0, 1.0),
        }
    }

    /// Compute the target triangle count given the original count.
    pub fn compute_target(&self, original_triangles: usize) -> usize {
        if let Some(target) = self.target_triangles {
            target.min(original_triangles)
        } else {
            ((original_triangles as f64) * self.target_ratio).round() as usize
        }
    }
}
