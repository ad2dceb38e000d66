//! Facet-count control lattice.
//!
//! A scattered set of `(section width, slenderness) -> facet count`
//! control points, queried by bilinear interpolation over the bracketing
//! corners. The points need not form a full grid: when the four corners of
//! a query's bracket are not all present the lookup falls back to the
//! Euclidean-nearest control point, and an empty lattice answers with a
//! fixed default.

use crate::tolerance::CONTROL_POINT_EPS;

/// Facet count returned by an empty lattice.
pub const DEFAULT_EMPTY_LATTICE_FACETS: f64 = 6.0;

/// One control point of a [`FacetCountLattice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    /// Smallest cross-section dimension, in millimetres.
    pub section_width_mm: f64,
    /// Slenderness ratio (sweep length over smallest section dimension).
    pub slenderness: f64,
    /// Target perimeter facet count at this point.
    pub facet_count: f64,
}

/// User-supplied lattice mapping section size and slenderness to a target
/// perimeter facet count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetCountLattice {
    points: Vec<ControlPoint>,
}

impl FacetCountLattice {
    /// Create an empty lattice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lattice from a list of control points.
    pub fn from_points(points: Vec<ControlPoint>) -> Self {
        Self { points }
    }

    /// Add a control point.
    pub fn insert(&mut self, section_width_mm: f64, slenderness: f64, facet_count: f64) {
        self.points.push(ControlPoint {
            section_width_mm,
            slenderness,
            facet_count,
        });
    }

    /// Whether the lattice has no control points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Look up the target facet count for a section width (millimetres)
    /// and slenderness ratio.
    ///
    /// Bilinear interpolation over the bracketing corners when both axes
    /// carry at least two distinct values and all four corners exist;
    /// otherwise the Euclidean-nearest control point. An empty lattice
    /// returns [`DEFAULT_EMPTY_LATTICE_FACETS`].
    pub fn facet_count(&self, section_width_mm: f64, slenderness: f64) -> f64 {
        if self.points.is_empty() {
            return DEFAULT_EMPTY_LATTICE_FACETS;
        }
        self.bilinear(section_width_mm, slenderness)
            .unwrap_or_else(|| self.nearest(section_width_mm, slenderness))
    }

    fn bilinear(&self, x: f64, y: f64) -> Option<f64> {
        let xs = distinct_sorted(self.points.iter().map(|p| p.section_width_mm));
        let ys = distinct_sorted(self.points.iter().map(|p| p.slenderness));
        if xs.len() < 2 || ys.len() < 2 {
            return None;
        }

        let (x1, x2) = bracket(&xs, x);
        let (y1, y2) = bracket(&ys, y);

        let q11 = self.value_at(x1, y1)?;
        let q21 = self.value_at(x2, y1)?;
        let q12 = self.value_at(x1, y2)?;
        let q22 = self.value_at(x2, y2)?;

        // A degenerate bracket (query on a knot) collapses that axis to
        // plain linear interpolation along the other one.
        let tx = fraction(x, x1, x2);
        let ty = fraction(y, y1, y2);

        Some(
            q11 * (1.0 - tx) * (1.0 - ty)
                + q21 * tx * (1.0 - ty)
                + q12 * (1.0 - tx) * ty
                + q22 * tx * ty,
        )
    }

    fn nearest(&self, x: f64, y: f64) -> f64 {
        let mut best = self.points[0];
        let mut best_dist = f64::INFINITY;
        for p in &self.points {
            let dx = p.section_width_mm - x;
            let dy = p.slenderness - y;
            let dist = dx * dx + dy * dy;
            if dist < best_dist {
                best_dist = dist;
                best = *p;
            }
        }
        best.facet_count
    }

    fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| {
                (p.section_width_mm - x).abs() <= CONTROL_POINT_EPS
                    && (p.slenderness - y).abs() <= CONTROL_POINT_EPS
            })
            .map(|p| p.facet_count)
    }
}

/// Sorted distinct values of one lattice axis.
fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| (*a - *b).abs() <= CONTROL_POINT_EPS);
    out
}

/// Bracket `x` between two consecutive knots. Queries below the range
/// snap to the first two sorted values, queries above to the last two; a
/// query on a knot gets a degenerate bracket. `values` holds at least two
/// distinct ascending knots.
fn bracket(values: &[f64], x: f64) -> (f64, f64) {
    let lower = values
        .iter()
        .copied()
        .filter(|v| *v <= x + CONTROL_POINT_EPS)
        .last();
    let upper = values
        .iter()
        .copied()
        .find(|v| *v >= x - CONTROL_POINT_EPS);
    match (lower, upper) {
        (Some(l), Some(u)) => (l, u),
        (None, _) => (values[0], values[1]),
        (_, None) => (values[values.len() - 2], values[values.len() - 1]),
    }
}

/// Interpolation fraction of `x` in `[x1, x2]`, clamped so out-of-range
/// queries do not extrapolate; 0 when the bracket is degenerate.
fn fraction(x: f64, x1: f64, x2: f64) -> f64 {
    if (x2 - x1).abs() <= CONTROL_POINT_EPS {
        0.0
    } else {
        ((x - x1) / (x2 - x1)).clamp(0.0, 1.0)
    }
}
