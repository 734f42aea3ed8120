//! Impulsive-manoeuvre building blocks: the Lambert boundary-value solver, the unpowered
//! flyby model, and the spherical parameterisation of design-vector impulses.

pub mod flyby;
pub mod lambert;

use solar_core::vector::Vector3;

pub use flyby::{FlybyBody, FlybyError, FlybyModel, UnpoweredFlyby};
pub use lambert::{
    Direction, IzzoLambert, LambertError, LambertSolution, LambertSolver, solve as lambert_solve,
};

/// Convert a `(magnitude, p, q)` impulse with `p, q ∈ [0, 1]` to Cartesian components.
///
/// `φ = acos(2p − 1)` is the polar angle and `θ = 2πq` the azimuth, which samples
/// directions uniformly on the sphere.
pub fn spherical_delta_v(magnitude_km_s: f64, p: f64, q: f64) -> Vector3 {
    let phi = (2.0 * p - 1.0).clamp(-1.0, 1.0).acos();
    let theta = std::f64::consts::TAU * q;
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    [
        magnitude_km_s * sin_phi * cos_theta,
        magnitude_km_s * sin_phi * sin_theta,
        magnitude_km_s * cos_phi,
    ]
}
