//! Two-body orbit model: dual state representation, anomaly conversions, the
//! universal-variable propagator, and the patched-conic insertion burn.

pub mod anomaly;
pub mod elements;
pub mod propagator;
pub mod stumpff;

use thiserror::Error;

pub use elements::{OrbitType, OrbitalElements, StateVector};
pub use propagator::{PropagationError, Propagated, Propagator, UniversalPropagator, propagate};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrbitError {
    #[error("gravitational parameter must be positive and finite, got {0}")]
    InvalidGravitationalParameter(f64),
    #[error("state has zero radius or no orbital plane")]
    DegenerateState,
    #[error("semi-major axis {semi_major_axis} is inconsistent with eccentricity {eccentricity}")]
    InconsistentElements {
        semi_major_axis: f64,
        eccentricity: f64,
    },
    #[error("true anomaly {true_anomaly} rad is unreachable for eccentricity {eccentricity}")]
    UnreachableTrueAnomaly { true_anomaly: f64, eccentricity: f64 },
    #[error("insertion needs a closed target orbit, got eccentricity {0}")]
    OpenTargetOrbit(f64),
    #[error("periapsis radius must be positive, got {0} km")]
    InvalidPeriapsis(f64),
}

/// Impulse at periapsis that captures an arrival hyperbola with excess speed `vinf_km_s`
/// into a closed orbit of semi-major axis `semi_major_axis_km` and eccentricity `eccentricity`.
pub fn insertion_delta_v(
    mu_km3_s2: f64,
    semi_major_axis_km: f64,
    eccentricity: f64,
    vinf_km_s: f64,
) -> Result<f64, OrbitError> {
    elements::check_mu(mu_km3_s2)?;
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(OrbitError::OpenTargetOrbit(eccentricity));
    }
    let periapsis = semi_major_axis_km * (1.0 - eccentricity);
    if !(periapsis > 0.0 && periapsis.is_finite()) {
        return Err(OrbitError::InvalidPeriapsis(periapsis));
    }
    let hyperbolic_speed = (vinf_km_s * vinf_km_s + 2.0 * mu_km3_s2 / periapsis).sqrt();
    let captured_speed = (mu_km3_s2 * (1.0 + eccentricity) / periapsis).sqrt();
    Ok((hyperbolic_speed - captured_speed).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU_MARS: f64 = 42_828.37;

    #[test]
    fn circular_insertion_is_periapsis_speed_difference() {
        let rp = 3_396.19 + 400.0;
        let dv = insertion_delta_v(MU_MARS, rp, 0.0, 2.5).unwrap();
        let arrival = (2.5_f64.powi(2) + 2.0 * MU_MARS / rp).sqrt();
        let circular = (MU_MARS / rp).sqrt();
        assert!((dv - (arrival - circular)).abs() < 1e-12, "{dv}");
    }

    #[test]
    fn eccentric_target_costs_less_than_circular() {
        let rp = 3_796.19;
        let circular = insertion_delta_v(MU_MARS, rp, 0.0, 3.0).unwrap();
        let eccentric = insertion_delta_v(MU_MARS, rp / (1.0 - 0.7), 0.7, 3.0).unwrap();
        assert!(eccentric < circular, "{eccentric} vs {circular}");
    }

    #[test]
    fn open_target_orbit_is_rejected() {
        assert_eq!(
            insertion_delta_v(MU_MARS, 10_000.0, 1.2, 3.0),
            Err(OrbitError::OpenTargetOrbit(1.2))
        );
    }
}
