//! Error types for chamfer.
//!
//! This module defines all error types used throughout the library.
//!
//! Programmer errors (passing an unknown edge id to the connectivity,
//! pushing a duplicate key into the heap, replacing a vertex that is not on
//! the edge) are contract violations and panic instead of returning an
//! error; everything a caller can trigger with ordinary input data is
//! reported through [`MeshError`].

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A triangle references a vertex index outside the vertex table.
    #[error("triangle {triangle} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The triangle index.
        triangle: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A triangle has duplicate vertex indices.
    #[error("triangle {triangle} is degenerate (has duplicate vertices)")]
    DegenerateTriangle {
        /// The triangle index.
        triangle: usize,
    },

    /// An edge has more than two incident triangles.
    #[error("edge ({v0}, {v1}) has more than two incident triangles")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
