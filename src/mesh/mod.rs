//! Core mesh data structures.
//!
//! This module provides the indexed triangle mesh exchanged at the crate
//! boundary and the connectivity tables used during simplification.
//!
//! # Overview
//!
//! [`TriangleMesh`] is a flat face-vertex representation: vertex positions,
//! face-tagged index triples and a linear precision. [`MeshConnectivity`]
//! is built from it once and then mutated destructively by the simplifier;
//! it keeps triangles, edges and vertex-edge incidence mutually consistent
//! under edge contraction.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an edge
//! - [`TriangleId`] - Identifies a triangle
//!
//! All wrap a `u32` whose maximum value is the invalid sentinel. Dead rows
//! keep their ids until a fresh mesh is rebuilt, so ids observed before a
//! mutation stay meaningful (but may turn invalid) after it.

mod connectivity;
mod index;
mod triangle_mesh;

pub use connectivity::MeshConnectivity;
pub use index::{EdgeId, TriangleId, VertexId};
pub use triangle_mesh::{MeshTriangle, TriangleMesh};
