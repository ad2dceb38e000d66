//! # Chamfer
//!
//! A mesh level-of-detail kernel for BIM geometry pipelines.
//!
//! Building models are dominated by swept solids: columns, beams, pipes,
//! mullions. Chamfer attacks their triangle budgets from two directions:
//!
//! - **Decimation** ([`algo::decimate`]): Garland-Heckbert quadric-error
//!   edge contraction over an indexed triangle mesh, with safety checks
//!   that keep the surface a 2-manifold, keep boundary vertex positions
//!   fixed, reject normal flips, and preserve the per-triangle face tags
//!   downstream consumers rely on.
//! - **Dynamic deflection** ([`deflect`]): a pre-tessellation policy that
//!   detects slender runs from profile metadata and coarsens the linear
//!   and angular deflection handed to the external tessellator, so excess
//!   perimeter facets are never generated at all.
//!
//! ## Quick Start
//!
//! ```
//! use chamfer::prelude::*;
//! use nalgebra::Point3;
//!
//! // A tetrahedron with one face tag per triangle.
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
//!
//! assert_eq!(simplified.triangle_count(), 4);
//! assert_eq!(simplified.vertex_count(), 4);
//! ```
//!
//! ## Scope
//!
//! Chamfer is a library with no process boundary: no file formats, no CLI,
//! no solid modelling. IFC interpretation, booleans and tessellation live
//! in the surrounding pipeline; this crate only consumes their indexed
//! meshes and shape metadata.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod deflect;
pub mod error;
pub mod heap;
pub mod math;
pub mod mesh;
pub mod tolerance;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use chamfer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::decimate::{simplify, SimplifyOptions};
    pub use crate::deflect::{
        CurveEvaluator, CurveRef, DeflectionPolicy, DeflectionSettings, FacetCountLattice,
        SectionProfile, SweptSolid,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::math::{BoundingBox, Quadric};
    pub use crate::mesh::{
        EdgeId, MeshConnectivity, MeshTriangle, TriangleId, TriangleMesh, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
