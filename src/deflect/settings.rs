//! Deflection policy settings.

use std::f64::consts::PI;

use crate::error::{MeshError, Result};

use super::lattice::FacetCountLattice;

/// Smallest facet count a closed perimeter can be tessellated with. The
/// computed target is never clamped below this, even when
/// [`DeflectionSettings::min_perimeter_facets`] asks for more at the
/// baseline width.
pub const MIN_PERIMETER_FACET_FLOOR: f64 = 3.0;

/// Settings bundle for the dynamic deflection policy.
#[derive(Debug, Clone, PartialEq)]
pub struct DeflectionSettings {
    /// Section width at which `min_perimeter_facets` applies, in
    /// millimetres.
    pub baseline_section_width_mm: f64,
    /// Perimeter facet count for a section at the baseline width; narrower
    /// sections scale down proportionally (but never below
    /// [`MIN_PERIMETER_FACET_FLOOR`]).
    pub min_perimeter_facets: f64,
    /// Upper clamp on the target facet count.
    pub max_perimeter_facets: f64,
    /// Slenderness ratio below which no dynamic adjustment happens.
    pub critical_slenderness: f64,
    /// Upper clamp on the linear deflection, as a ratio of the section
    /// half-width.
    pub max_linear_deflection_ratio: f64,
    /// Upper clamp on the angular deflection, in radians.
    pub max_angular_deflection: f64,
    /// Optional control-point lattice overriding the proportional facet
    /// count.
    pub custom_strategy: Option<FacetCountLattice>,
}

impl Default for DeflectionSettings {
    fn default() -> Self {
        Self {
            baseline_section_width_mm: 20.0,
            min_perimeter_facets: 3.0,
            max_perimeter_facets: 1000.0,
            critical_slenderness: 5.0,
            max_linear_deflection_ratio: 1.5,
            max_angular_deflection: 1.5 * PI,
            custom_strategy: None,
        }
    }
}

impl DeflectionSettings {
    /// Settings targeting `target` perimeter facets for sections at
    /// `baseline_mm` width. Conventional values are 1000 for `max_facets`
    /// and 10 for `critical_slenderness`.
    ///
    /// # Errors
    /// Rejects a target below [`MIN_PERIMETER_FACET_FLOOR`], a
    /// non-positive baseline width or critical slenderness, and a maximum
    /// below the target.
    pub fn for_target_facet_count(
        target: f64,
        baseline_mm: f64,
        max_facets: f64,
        critical_slenderness: f64,
    ) -> Result<Self> {
        if target.is_nan() || target < MIN_PERIMETER_FACET_FLOOR {
            return Err(MeshError::invalid_param(
                "target",
                target,
                "must be at least 3",
            ));
        }
        if baseline_mm.is_nan() || baseline_mm <= 0.0 {
            return Err(MeshError::invalid_param(
                "baseline_mm",
                baseline_mm,
                "must be positive",
            ));
        }
        if max_facets.is_nan() || max_facets < target {
            return Err(MeshError::invalid_param(
                "max_facets",
                max_facets,
                "must be at least the target",
            ));
        }
        if critical_slenderness.is_nan() || critical_slenderness <= 0.0 {
            return Err(MeshError::invalid_param(
                "critical_slenderness",
                critical_slenderness,
                "must be positive",
            ));
        }
        Ok(Self {
            baseline_section_width_mm: baseline_mm,
            min_perimeter_facets: target,
            max_perimeter_facets: max_facets,
            critical_slenderness,
            ..Self::default()
        })
    }

    /// Default settings with a custom control-point lattice attached.
    pub fn with_custom_strategy(lattice: FacetCountLattice) -> Self {
        Self {
            custom_strategy: Some(lattice),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DeflectionSettings::default();
        assert_eq!(settings.baseline_section_width_mm, 20.0);
        assert_eq!(settings.min_perimeter_facets, 3.0);
        assert_eq!(settings.max_perimeter_facets, 1000.0);
        assert_eq!(settings.critical_slenderness, 5.0);
        assert_eq!(settings.max_linear_deflection_ratio, 1.5);
        assert_eq!(settings.max_angular_deflection, 1.5 * PI);
        assert!(settings.custom_strategy.is_none());
    }

    #[test]
    fn test_for_target_facet_count() {
        let settings = DeflectionSettings::for_target_facet_count(6.0, 20.0, 1000.0, 10.0).unwrap();
        assert_eq!(settings.min_perimeter_facets, 6.0);
        assert_eq!(settings.baseline_section_width_mm, 20.0);
        assert_eq!(settings.critical_slenderness, 10.0);
    }

    #[test]
    fn test_for_target_facet_count_validation() {
        assert!(DeflectionSettings::for_target_facet_count(2.0, 20.0, 1000.0, 10.0).is_err());
        assert!(DeflectionSettings::for_target_facet_count(6.0, 0.0, 1000.0, 10.0).is_err());
        assert!(DeflectionSettings::for_target_facet_count(6.0, 20.0, 5.0, 10.0).is_err());
        assert!(DeflectionSettings::for_target_facet_count(6.0, 20.0, 1000.0, 0.0).is_err());
        assert!(DeflectionSettings::for_target_facet_count(f64::NAN, 20.0, 1000.0, 10.0).is_err());
    }

    #[test]
    fn test_with_custom_strategy() {
        let settings = DeflectionSettings::with_custom_strategy(FacetCountLattice::new());
        assert!(settings.custom_strategy.is_some());
        assert_eq!(settings.min_perimeter_facets, 3.0);
    }
}
