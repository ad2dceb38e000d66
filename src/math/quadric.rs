//! Quadric error metric.
//!
//! A quadric measures the sum of squared distances from a point to a set of
//! planes (Garland & Heckbert, 1997). It is stored in `(A, b, c)` form: a
//! symmetric 3x3 matrix, a linear term and a constant, so that the error at
//! a point `p` is `p'Ap + 2b'p + c`. Summing quadrics sums the underlying
//! plane sets.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::tolerance::SINGULAR_DET;

/// A quadric error metric in `(A, b, c)` form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric {
    /// Symmetric quadratic term.
    a: Matrix3<f64>,
    /// Linear term.
    b: Vector3<f64>,
    /// Constant term.
    c: f64,
}

impl Quadric {
    /// The zero quadric, which reports zero error everywhere.
    pub fn zero() -> Self {
        Self {
            a: Matrix3::zeros(),
            b: Vector3::zeros(),
            c: 0.0,
        }
    }

    /// Create the quadric of the plane with unit normal `n` through `p`.
    ///
    /// The error of a point `q` against this quadric is the squared
    /// perpendicular distance from `q` to the plane. `n` must already be
    /// unit length.
    pub fn from_plane(n: &Vector3<f64>, p: &Point3<f64>) -> Self {
        let a = n * n.transpose();
        let ap = a * p.coords;
        Self {
            a,
            b: -ap,
            c: ap.dot(&p.coords),
        }
    }

    /// Evaluate the quadric error at `p`: `p'Ap + 2b'p + c`.
    pub fn evaluate(&self, p: &Point3<f64>) -> f64 {
        (self.a * p.coords).dot(&p.coords) + 2.0 * self.b.dot(&p.coords) + self.c
    }

    /// Scale the quadric in place, typically by a triangle area when
    /// accumulating per-vertex quadrics.
    pub fn scale(&mut self, s: f64) {
        self.a *= s;
        self.b *= s;
        self.c *= s;
    }

    /// Find the point minimizing this quadric, constrained to be finite.
    ///
    /// Solves `Ax = -b` through the closed-form inverse. When `A` is
    /// singular (determinant magnitude at most [`SINGULAR_DET`]) the
    /// minimizer is not unique; the error is then evaluated at `p0`, `p1`
    /// and their midpoint, and the cheapest of the three is returned. On a
    /// tie the midpoint wins, so two coplanar triangles contract onto the
    /// middle of their shared edge.
    pub fn optimal(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> Point3<f64> {
        if self.a.determinant().abs() > SINGULAR_DET {
            if let Some(inv) = self.a.try_inverse() {
                return Point3::from(inv * -self.b);
            }
        }

        let mid = Point3::from((p0.coords + p1.coords) * 0.5);
        let e0 = self.evaluate(p0);
        let e1 = self.evaluate(p1);
        let em = self.evaluate(&mid);

        if em <= e0 && em <= e1 {
            mid
        } else if e0 <= e1 {
            *p0
        } else {
            *p1
        }
    }
}

impl std::ops::Add for Quadric {
    type Output = Quadric;

    fn add(self, other: Quadric) -> Quadric {
        Quadric {
            a: self.a + other.a,
            b: self.b + other.b,
            c: self.c + other.c,
        }
    }
}

impl std::ops::AddAssign for Quadric {
    fn add_assign(&mut self, other: Quadric) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
    }
}
