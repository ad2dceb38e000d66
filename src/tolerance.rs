//! Centralized numeric tolerances.
//!
//! Every fixed threshold used by the kernel lives here so that the
//! algorithms themselves stay free of magic numbers. These values are
//! design-level constants, not runtime-tunable parameters.

/// Determinant magnitude at or below which the quadric system matrix is
/// treated as singular and the contraction point falls back to the best of
/// the two endpoints and their midpoint.
pub const SINGULAR_DET: f64 = 1000.0 * 1e-10;

/// Minimum length of a triangle's edge cross product. Triangles below this
/// threshold contribute no quadric, and vectors shorter than this are left
/// untouched by normalization.
pub const MIN_CROSS_LENGTH: f64 = 1e-12;

/// Minimum dot product between a triangle's unit normal before and after a
/// contraction. Anything below rejects the contraction; 0.8 bounds the
/// orientation change of each neighbouring triangle to roughly 37 degrees.
pub const NORMAL_FLIP_MIN_DOT: f64 = 0.8;

/// Equality tolerance between control-point coordinates in the facet-count
/// lattice.
pub const CONTROL_POINT_EPS: f64 = 1e-6;
