//! Axis-aligned bounding box.

use nalgebra::Point3;

/// An axis-aligned bounding box in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Create a bounding box from its two corners.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Compute the smallest box containing all given points.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some(Self { min, max })
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }

    /// Extent of the box along each axis.
    pub fn extents(&self) -> [f64; 3] {
        let d = self.max - self.min;
        [d.x, d.y, d.z]
    }
}
