//! Dynamic deflection policy.
//!
//! Decides, ahead of tessellation, how finely a parametric swept solid
//! should be faceted along its perimeter. Long thin runs (pipes, mullions,
//! railings) waste most of their triangles on cross-section roundness that
//! is invisible at typical viewing distances; this policy detects them by
//! their slenderness ratio and relaxes the linear and angular deflection
//! accordingly, so the external tessellator produces fewer perimeter
//! facets in the first place.
//!
//! The policy complements [`crate::algo::decimate`]: decimation reduces
//! triangles after meshing, the deflection policy avoids generating them.
//!
//! # Example
//!
//! ```
//! use chamfer::deflect::{
//!     CurveEvaluator, CurveRef, DeflectionPolicy, DeflectionSettings, SectionProfile,
//!     SweptSolid,
//! };
//! use chamfer::math::BoundingBox;
//! use nalgebra::Point3;
//!
//! struct NoCurves;
//! impl CurveEvaluator for NoCurves {
//!     fn length(&self, _: CurveRef) -> Option<f64> {
//!         None
//!     }
//!     fn extents(&self, _: CurveRef) -> Option<(f64, f64)> {
//!         None
//!     }
//! }
//!
//! let policy = DeflectionPolicy::new(DeflectionSettings::default(), NoCurves);
//! let column = SweptSolid::Extrusion {
//!     profile: SectionProfile::Rectangle { x_dim: 0.1, y_dim: 0.1 },
//!     depth: 3.0,
//! };
//! let bbox = BoundingBox::new(Point3::origin(), Point3::new(0.1, 0.1, 3.0));
//!
//! // A 3 m column with a 100 mm section is slender: the policy coarsens
//! // the model defaults.
//! let (linear, angular) = policy.deflection_for(&column, &bbox, 1000.0, 0.001, 0.5);
//! assert!(linear >= 0.001 && angular >= 0.5);
//! ```

mod lattice;
mod policy;
mod profile;
mod settings;

pub use lattice::{ControlPoint, FacetCountLattice, DEFAULT_EMPTY_LATTICE_FACETS};
pub use policy::DeflectionPolicy;
pub use profile::{CurveEvaluator, CurveRef, SectionProfile, SweptSolid};
pub use settings::{DeflectionSettings, MIN_PERIMETER_FACET_FLOOR};
