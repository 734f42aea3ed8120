//! Unpowered gravity-assist model.
//!
//! The incoming excess velocity is rotated by the hyperbolic turn angle
//! `δ = 2·asin(1/e)`, `e = 1 + r_p·v∞²/μ`, inside the plane selected by the B-plane angle.
//! The magnitude of the excess velocity is unchanged, so no Δv is spent.

use solar_core::vector::{self, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlybyError {
    #[error("periapsis radius must be positive, got {0} km")]
    InvalidPeriapsis(f64),
    #[error("gravitational parameter must be positive and finite, got {0}")]
    InvalidGravitationalParameter(f64),
    #[error("approach velocity equals the body velocity; no hyperbola to turn")]
    ZeroExcessVelocity,
}

/// Physical data of the body being flown by, at the encounter epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlybyBody {
    pub velocity_km_s: Vector3,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
}

/// Flyby capability: approach velocity in, departure velocity out.
pub trait FlybyModel {
    fn flyby(
        &self,
        approach_velocity_km_s: &Vector3,
        body: &FlybyBody,
        periapsis_altitude_km: f64,
        b_plane_angle_rad: f64,
    ) -> Result<Vector3, FlybyError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnpoweredFlyby;

impl FlybyModel for UnpoweredFlyby {
    fn flyby(
        &self,
        approach_velocity_km_s: &Vector3,
        body: &FlybyBody,
        periapsis_altitude_km: f64,
        b_plane_angle_rad: f64,
    ) -> Result<Vector3, FlybyError> {
        if !(body.mu_km3_s2 > 0.0 && body.mu_km3_s2.is_finite()) {
            return Err(FlybyError::InvalidGravitationalParameter(body.mu_km3_s2));
        }
        let rp = body.radius_km + periapsis_altitude_km;
        if !(rp > 0.0 && rp.is_finite()) {
            return Err(FlybyError::InvalidPeriapsis(rp));
        }

        let v_rel_in = vector::sub(approach_velocity_km_s, &body.velocity_km_s);
        let vinf = vector::norm(&v_rel_in);
        let e_hat = vector::unit(&v_rel_in).ok_or(FlybyError::ZeroExcessVelocity)?;
        if vinf <= 1e-12 {
            return Err(FlybyError::ZeroExcessVelocity);
        }

        let b_hat = vector::unit(&vector::cross(&e_hat, &body.velocity_km_s))
            .unwrap_or_else(|| perpendicular(&e_hat));
        let c_hat = vector::cross(&e_hat, &b_hat);

        let ecc = 1.0 + rp * vinf * vinf / body.mu_km3_s2;
        let delta = 2.0 * (1.0 / ecc).asin();
        let (sin_d, cos_d) = delta.sin_cos();
        let (sin_b, cos_b) = b_plane_angle_rad.sin_cos();

        let mut v_out = body.velocity_km_s;
        for i in 0..3 {
            v_out[i] += vinf * (cos_d * e_hat[i] + cos_b * sin_d * b_hat[i] + sin_b * sin_d * c_hat[i]);
        }
        Ok(v_out)
    }
}

/// Any unit vector perpendicular to `u`; used when the approach is parallel to the body velocity.
fn perpendicular(u: &Vector3) -> Vector3 {
    let reference = if u[2].abs() < 0.9 {
        [0.0, 0.0, 1.0]
    } else {
        [1.0, 0.0, 0.0]
    };
    vector::unit(&vector::cross(u, &reference)).unwrap_or([0.0, 1.0, 0.0])
}
