//! Swept-solid and cross-section descriptions.
//!
//! The deflection policy never talks to the CAD kernel directly: the
//! caller classifies each swept solid into one of the variants below and
//! hands curve geometry over through the [`CurveEvaluator`] seam. Profile
//! kinds form a closed set; anything the caller cannot classify becomes
//! [`SectionProfile::Unknown`] and degrades gracefully to the default
//! tolerances instead of guessing.

use nalgebra::{Point3, Vector3};

/// Identifier of a curve entity owned by the external CAD kernel.
///
/// Used as the key of the policy's length and extent caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveRef(pub u64);

/// Access to curve geometry owned by the external CAD kernel.
///
/// Both operations may fail (a curve may be unbounded or broken); the
/// policy treats `None` as "no dynamic adjustment" for the affected shape.
pub trait CurveEvaluator {
    /// Arc length of the curve.
    fn length(&self, curve: CurveRef) -> Option<f64>;

    /// Width and height of the curve's bounding box.
    fn extents(&self, curve: CurveRef) -> Option<(f64, f64)>;
}

/// Cross-section profile of a swept solid, reduced to what the policy
/// needs: a characteristic width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionProfile {
    /// Rectangular profile.
    Rectangle {
        /// Extent along the profile x axis.
        x_dim: f64,
        /// Extent along the profile y axis.
        y_dim: f64,
    },
    /// Circular profile.
    Circle {
        /// Circle radius.
        radius: f64,
    },
    /// Elliptical profile.
    Ellipse {
        /// First semi-axis.
        semi_axis1: f64,
        /// Second semi-axis.
        semi_axis2: f64,
    },
    /// Parameterized structural sections (I, L, T, U and C shapes),
    /// reduced to their overall envelope.
    Flanged {
        /// Flange or overall width.
        width: f64,
        /// Overall depth.
        depth: f64,
    },
    /// A profile bounded by an arbitrary closed curve; its extents come
    /// from the outer curve's bounding box and are cached per curve.
    ArbitraryClosed {
        /// The outer boundary curve.
        outer: CurveRef,
    },
    /// A profile kind the caller could not classify.
    Unknown,
}

/// A swept solid classified for the deflection policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweptSolid {
    /// A profile extruded along a straight direction.
    Extrusion {
        /// Cross-section profile.
        profile: SectionProfile,
        /// Extrusion depth in model units.
        depth: f64,
    },
    /// A profile revolved around an axis.
    Revolution {
        /// Cross-section profile.
        profile: SectionProfile,
        /// A point on the axis of revolution.
        axis_origin: Point3<f64>,
        /// Direction of the axis of revolution.
        axis_dir: Vector3<f64>,
        /// Revolution angle in radians.
        angle: f64,
        /// Origin of the profile placement; its perpendicular distance to
        /// the axis is the revolution radius.
        profile_origin: Point3<f64>,
    },
    /// A profile swept along a trimmed directrix (covers surface-curve and
    /// fixed-reference sweeps).
    CurveSweep {
        /// Cross-section profile.
        profile: SectionProfile,
        /// Trim parameter at the start of the directrix.
        param_start: f64,
        /// Trim parameter at the end of the directrix.
        param_end: f64,
    },
    /// A disk swept along a directrix (pipes and rebars).
    SweptDisk {
        /// Disk radius.
        radius: f64,
        /// Explicit trim parameter range, when present.
        param_range: Option<(f64, f64)>,
        /// The directrix curve.
        directrix: CurveRef,
    },
}

impl SweptSolid {
    /// The cross-section profile of this solid; a swept disk reports a
    /// circular profile of its own radius.
    pub fn profile(&self) -> SectionProfile {
        match *self {
            SweptSolid::Extrusion { profile, .. }
            | SweptSolid::Revolution { profile, .. }
            | SweptSolid::CurveSweep { profile, .. } => profile,
            SweptSolid::SweptDisk { radius, .. } => SectionProfile::Circle { radius },
        }
    }
}
