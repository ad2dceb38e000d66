//! The dynamic deflection policy.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Mutex;

use crate::math::BoundingBox;
use crate::tolerance::MIN_CROSS_LENGTH;

use super::profile::{CurveEvaluator, CurveRef, SectionProfile, SweptSolid};
use super::settings::{DeflectionSettings, MIN_PERIMETER_FACET_FLOOR};

/// Decides how finely a swept solid should be faceted along its perimeter.
///
/// The policy is a pure function of its settings and the shape metadata:
/// slender runs (sweep length large against the smallest cross-section
/// dimension) get a coarser pair of deflection tolerances, everything else
/// keeps the caller's defaults. The only mutable state is a pair of
/// per-curve caches (arc length and bounding-box extents), guarded by
/// mutexes so one policy instance can serve concurrent readers.
#[derive(Debug)]
pub struct DeflectionPolicy<E> {
    settings: DeflectionSettings,
    evaluator: E,
    length_cache: Mutex<HashMap<CurveRef, Option<f64>>>,
    extent_cache: Mutex<HashMap<CurveRef, Option<(f64, f64)>>>,
}

impl<E: CurveEvaluator> DeflectionPolicy<E> {
    /// Create a policy over the given settings and curve evaluator.
    pub fn new(settings: DeflectionSettings, evaluator: E) -> Self {
        Self {
            settings,
            evaluator,
            length_cache: Mutex::new(HashMap::new()),
            extent_cache: Mutex::new(HashMap::new()),
        }
    }

    /// The settings this policy was built with.
    pub fn settings(&self) -> &DeflectionSettings {
        &self.settings
    }

    /// Compute the (linear, angular) deflection pair for a swept solid.
    ///
    /// `mm_per_unit` converts model units to millimetres for the facet
    /// lookup; `default_linear` and `default_angular` are the model-wide
    /// tolerances. The result is never finer than those defaults: dynamic
    /// deflection may only coarsen. Shapes that cannot be interpreted
    /// (unknown profile kind, uncomputable curve bounds) keep the defaults
    /// unchanged.
    pub fn deflection_for(
        &self,
        solid: &SweptSolid,
        bbox: &BoundingBox,
        mm_per_unit: f64,
        default_linear: f64,
        default_angular: f64,
    ) -> (f64, f64) {
        let defaults = (default_linear, default_angular);

        let Some((width, height)) = self.section_dimensions(solid) else {
            return defaults;
        };
        let min_dim = width.min(height);
        if min_dim <= 0.0 {
            log::warn!(
                "dynamic deflection: non-positive section dimension {}, keeping defaults",
                min_dim
            );
            return defaults;
        }

        let sweep_length = self.sweep_length(solid, bbox);
        let slenderness = sweep_length / min_dim;
        if slenderness < self.settings.critical_slenderness {
            return defaults;
        }

        let target = match &self.settings.custom_strategy {
            Some(lattice) => lattice.facet_count(min_dim * mm_per_unit, slenderness),
            None => {
                self.settings.min_perimeter_facets
                    * (min_dim * mm_per_unit / self.settings.baseline_section_width_mm)
            }
        };
        let target = target.clamp(MIN_PERIMETER_FACET_FLOOR, self.settings.max_perimeter_facets);

        let angular = (4.0 * PI / target).min(self.settings.max_angular_deflection);
        let radius = min_dim / 2.0;
        let linear = (radius * (1.0 - (angular / 2.0).cos()))
            .min(radius * self.settings.max_linear_deflection_ratio);

        (linear.max(default_linear), angular.max(default_angular))
    }

    /// Characteristic (width, height) of the solid's cross section, in
    /// model units.
    fn section_dimensions(&self, solid: &SweptSolid) -> Option<(f64, f64)> {
        match solid.profile() {
            SectionProfile::Rectangle { x_dim, y_dim } => Some((x_dim, y_dim)),
            SectionProfile::Circle { radius } => Some((2.0 * radius, 2.0 * radius)),
            SectionProfile::Ellipse {
                semi_axis1,
                semi_axis2,
            } => Some((2.0 * semi_axis1, 2.0 * semi_axis2)),
            SectionProfile::Flanged { width, depth } => Some((width, depth)),
            SectionProfile::ArbitraryClosed { outer } => {
                let extents = self.cached_extents(outer);
                if extents.is_none() {
                    log::warn!(
                        "dynamic deflection: bounds of outer curve {:?} are uncomputable, \
                         keeping defaults",
                        outer
                    );
                }
                extents
            }
            SectionProfile::Unknown => {
                log::warn!("dynamic deflection: unknown profile kind, keeping defaults");
                None
            }
        }
    }

    /// Length of the solid along its directrix, in model units. Falls back
    /// to the bounding-box diagonal when nothing better is known.
    fn sweep_length(&self, solid: &SweptSolid, bbox: &BoundingBox) -> f64 {
        match *solid {
            SweptSolid::Extrusion { depth, .. } => depth,
            SweptSolid::CurveSweep {
                param_start,
                param_end,
                ..
            } => (param_end - param_start).abs(),
            SweptSolid::Revolution {
                axis_origin,
                axis_dir,
                angle,
                profile_origin,
                ..
            } => {
                let axis_len = axis_dir.norm();
                if axis_len < MIN_CROSS_LENGTH {
                    return bbox.diagonal();
                }
                let axis = axis_dir / axis_len;
                let offset = profile_origin - axis_origin;
                let radius = (offset - axis * offset.dot(&axis)).norm();
                radius * angle.abs()
            }
            SweptSolid::SweptDisk {
                param_range,
                directrix,
                ..
            } => param_range
                .map(|(start, end)| (end - start).abs())
                .or_else(|| self.cached_length(directrix))
                .unwrap_or_else(|| bbox.diagonal()),
        }
    }

    fn cached_length(&self, curve: CurveRef) -> Option<f64> {
        let mut cache = lock(&self.length_cache);
        *cache
            .entry(curve)
            .or_insert_with(|| self.evaluator.length(curve))
    }

    fn cached_extents(&self, curve: CurveRef) -> Option<(f64, f64)> {
        let mut cache = lock(&self.extent_cache);
        *cache
            .entry(curve)
            .or_insert_with(|| self.evaluator.extents(curve))
    }
}

/// Lock a cache, recovering from poisoning (the caches hold no invariants
/// beyond their own entries).
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use nalgebra::{Point3, Vector3};

    use super::super::lattice::FacetCountLattice;
    use super::*;

    /// Evaluator with fixed answers and call counting.
    #[derive(Default)]
    struct FixedCurves {
        length: Option<f64>,
        extents: Option<(f64, f64)>,
        length_calls: AtomicUsize,
        extent_calls: AtomicUsize,
    }

    impl CurveEvaluator for &FixedCurves {
        fn length(&self, _curve: CurveRef) -> Option<f64> {
            self.length_calls.fetch_add(1, Ordering::Relaxed);
            self.length
        }

        fn extents(&self, _curve: CurveRef) -> Option<(f64, f64)> {
            self.extent_calls.fetch_add(1, Ordering::Relaxed);
            self.extents
        }
    }

    fn unit_bbox() -> BoundingBox {
        BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    fn square_extrusion(side: f64, depth: f64) -> SweptSolid {
        SweptSolid::Extrusion {
            profile: SectionProfile::Rectangle {
                x_dim: side,
                y_dim: side,
            },
            depth,
        }
    }

    #[test]
    fn test_slender_extrusion_worked_example() {
        // 300 mm extrusion of a 10 mm square, 6 facets at a 20 mm
        // baseline: target 6 * (10 / 20) = 3, angular 4pi/3, linear
        // 5 * (1 - cos(2pi/3)) = 7.5.
        let curves = FixedCurves::default();
        let settings = DeflectionSettings::for_target_facet_count(6.0, 20.0, 1000.0, 5.0).unwrap();
        let policy = DeflectionPolicy::new(settings, &curves);

        let (linear, angular) =
            policy.deflection_for(&square_extrusion(10.0, 300.0), &unit_bbox(), 1.0, 0.1, 0.5);

        assert!((angular - 4.0 * PI / 3.0).abs() < 1e-12);
        assert!((linear - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_stocky_shape_keeps_defaults() {
        let curves = FixedCurves::default();
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        // Slenderness 40 / 10 = 4 is below the critical 5.
        let result =
            policy.deflection_for(&square_extrusion(10.0, 40.0), &unit_bbox(), 1.0, 0.1, 0.5);
        assert_eq!(result, (0.1, 0.5));
    }

    #[test]
    fn test_never_refines_below_defaults() {
        let curves = FixedCurves::default();
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        // Large defaults dominate whatever the policy derives.
        let (linear, angular) =
            policy.deflection_for(&square_extrusion(10.0, 300.0), &unit_bbox(), 1.0, 50.0, 10.0);
        assert_eq!((linear, angular), (50.0, 10.0));
    }

    #[test]
    fn test_monotone_in_sweep_length() {
        let curves = FixedCurves::default();
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        let mut last = (0.0, 0.0);
        for depth in [10.0, 40.0, 60.0, 120.0, 500.0, 2000.0] {
            let result =
                policy.deflection_for(&square_extrusion(10.0, depth), &unit_bbox(), 1.0, 0.1, 0.5);
            assert!(result.0 >= last.0 && result.1 >= last.1);
            assert!(result.0 >= 0.1 && result.1 >= 0.5);
            last = result;
        }
    }

    #[test]
    fn test_angular_clamp() {
        // Floor target of 3 gives 4pi/3, below the 1.5pi clamp; a custom
        // lattice cannot push it under the floor either.
        let curves = FixedCurves::default();
        let mut lattice = FacetCountLattice::new();
        lattice.insert(10.0, 10.0, 1.0);
        let policy = DeflectionPolicy::new(DeflectionSettings::with_custom_strategy(lattice), &curves);

        let (_, angular) =
            policy.deflection_for(&square_extrusion(10.0, 300.0), &unit_bbox(), 1.0, 0.0, 0.0);
        assert!((angular - 4.0 * PI / 3.0).abs() < 1e-12);
        assert!(angular <= 1.5 * PI);
    }

    #[test]
    fn test_revolution_sweep_is_arc_length() {
        // Profile origin 100 units from a z axis, revolved half a turn:
        // sweep length 100pi, circle section 10 across.
        let curves = FixedCurves::default();
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        let solid = SweptSolid::Revolution {
            profile: SectionProfile::Circle { radius: 5.0 },
            axis_origin: Point3::origin(),
            axis_dir: Vector3::z(),
            angle: PI,
            profile_origin: Point3::new(100.0, 0.0, 0.0),
        };
        let (linear, angular) = policy.deflection_for(&solid, &unit_bbox(), 1.0, 0.0, 0.0);

        // Target 3 * (10 / 20) clamps to the floor of 3.
        assert!((angular - 4.0 * PI / 3.0).abs() < 1e-12);
        assert!((linear - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_swept_disk_uses_cached_directrix_length() {
        let curves = FixedCurves {
            length: Some(500.0),
            ..Default::default()
        };
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        let solid = SweptSolid::SweptDisk {
            radius: 5.0,
            param_range: None,
            directrix: CurveRef(42),
        };
        let first = policy.deflection_for(&solid, &unit_bbox(), 1.0, 0.1, 0.5);
        let second = policy.deflection_for(&solid, &unit_bbox(), 1.0, 0.1, 0.5);

        assert_eq!(first, second);
        assert!(first.0 > 0.1 && first.1 > 0.5);
        assert_eq!(curves.length_calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_swept_disk_prefers_explicit_param_range() {
        let curves = FixedCurves {
            length: Some(500.0),
            ..Default::default()
        };
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        let solid = SweptSolid::SweptDisk {
            radius: 5.0,
            param_range: Some((0.0, 300.0)),
            directrix: CurveRef(42),
        };
        policy.deflection_for(&solid, &unit_bbox(), 1.0, 0.1, 0.5);
        assert_eq!(curves.length_calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_arbitrary_profile_extents_are_cached() {
        let curves = FixedCurves {
            extents: Some((10.0, 15.0)),
            ..Default::default()
        };
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        let solid = SweptSolid::Extrusion {
            profile: SectionProfile::ArbitraryClosed { outer: CurveRef(7) },
            depth: 300.0,
        };
        let first = policy.deflection_for(&solid, &unit_bbox(), 1.0, 0.1, 0.5);
        policy.deflection_for(&solid, &unit_bbox(), 1.0, 0.1, 0.5);

        assert!(first.0 > 0.1);
        assert_eq!(curves.extent_calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unknown_profile_keeps_defaults() {
        let curves = FixedCurves::default();
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        let solid = SweptSolid::Extrusion {
            profile: SectionProfile::Unknown,
            depth: 300.0,
        };
        let result = policy.deflection_for(&solid, &unit_bbox(), 1.0, 0.1, 0.5);
        assert_eq!(result, (0.1, 0.5));
    }

    #[test]
    fn test_uncomputable_curve_bounds_keep_defaults() {
        let curves = FixedCurves::default(); // extents: None
        let policy = DeflectionPolicy::new(DeflectionSettings::default(), &curves);

        let solid = SweptSolid::Extrusion {
            profile: SectionProfile::ArbitraryClosed { outer: CurveRef(9) },
            depth: 300.0,
        };
        let result = policy.deflection_for(&solid, &unit_bbox(), 1.0, 0.1, 0.5);
        assert_eq!(result, (0.1, 0.5));
    }

    #[test]
    fn test_custom_lattice_drives_target() {
        // A lattice that answers 12 facets: angular pi/3, linear
        // 5 * (1 - cos(pi/6)).
        let curves = FixedCurves::default();
        let mut lattice = FacetCountLattice::new();
        lattice.insert(5.0, 10.0, 12.0);
        lattice.insert(20.0, 10.0, 12.0);
        lattice.insert(5.0, 50.0, 12.0);
        lattice.insert(20.0, 50.0, 12.0);
        let policy = DeflectionPolicy::new(DeflectionSettings::with_custom_strategy(lattice), &curves);

        let (linear, angular) =
            policy.deflection_for(&square_extrusion(10.0, 300.0), &unit_bbox(), 1.0, 0.0, 0.0);
        assert!((angular - PI / 3.0).abs() < 1e-12);
        assert!((linear - 5.0 * (1.0 - (PI / 6.0).cos())).abs() < 1e-12);
    }
}
