//! Numeric primitives shared by the decimation and deflection kernels.
//!
//! The heavy lifting is done by [nalgebra](https://nalgebra.org) types
//! (`Point3<f64>`, `Vector3<f64>`, `Matrix3<f64>`); this module adds the
//! quadric error metric and a small axis-aligned bounding box on top.

mod bbox;
mod quadric;

pub use bbox::BoundingBox;
pub use quadric::Quadric;
