//! Mesh processing algorithms.
//!
//! The only algorithm family the kernel carries is decimation: greedy
//! quadric-error edge contraction with manifold-preserving safety checks.
//! Adaptive tessellation ahead of meshing is handled separately by
//! [`crate::deflect`].

pub mod decimate;
