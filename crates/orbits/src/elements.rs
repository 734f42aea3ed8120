//! Dual representation of a two-body state: classical elements and Cartesian vectors.
//!
//! Both views carry the same six degrees of freedom. The conversions here are pure and,
//! up to floating-point error, mutual inverses for circular, elliptical, parabolic and
//! hyperbolic orbits.
//!
//! Degenerate angle conventions:
//! - circular orbits (`e < ECCENTRICITY_TOLERANCE`) set ω = 0 and measure ν from the
//!   ascending node, or from +x when the orbit is also equatorial;
//! - equatorial orbits (`sin i < INCLINATION_TOLERANCE`) set Ω = 0 and measure ω from +x;
//!   retrograde equatorial orbits mirror the sign of those angles.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use solar_core::vector::{self, Vector3};

use crate::OrbitError;

/// Below this eccentricity an orbit is treated as circular.
pub const ECCENTRICITY_TOLERANCE: f64 = 1e-10;
/// Distance of the eccentricity from 1 below which an orbit is treated as parabolic.
pub const PARABOLIC_TOLERANCE: f64 = 1e-9;
/// Below this `sin(i)` an orbit is treated as equatorial.
pub const INCLINATION_TOLERANCE: f64 = 1e-10;

/// Orbit-type classification shared by every iterative branch in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitType {
    Circular,
    Elliptical,
    Parabolic,
    Hyperbolic,
}

impl OrbitType {
    /// Classify an orbit from its eccentricity.
    pub fn classify(eccentricity: f64) -> Self {
        if eccentricity < ECCENTRICITY_TOLERANCE {
            OrbitType::Circular
        } else if (eccentricity - 1.0).abs() < PARABOLIC_TOLERANCE {
            OrbitType::Parabolic
        } else if eccentricity < 1.0 {
            OrbitType::Elliptical
        } else {
            OrbitType::Hyperbolic
        }
    }

    /// Closed orbits repeat with a finite period.
    pub fn is_closed(self) -> bool {
        matches!(self, OrbitType::Circular | OrbitType::Elliptical)
    }
}

/// Position and velocity in a common inertial frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
}

impl StateVector {
    pub fn new(position_km: Vector3, velocity_km_s: Vector3) -> Self {
        Self {
            position_km,
            velocity_km_s,
        }
    }

    pub fn radius_km(&self) -> f64 {
        vector::norm(&self.position_km)
    }

    pub fn speed_km_s(&self) -> f64 {
        vector::norm(&self.velocity_km_s)
    }

    /// Specific angular momentum vector `r × v`.
    pub fn angular_momentum(&self) -> Vector3 {
        vector::cross(&self.position_km, &self.velocity_km_s)
    }

    /// Specific orbital energy `v²/2 − μ/r`.
    pub fn specific_energy(&self, mu_km3_s2: f64) -> f64 {
        let v = self.speed_km_s();
        0.5 * v * v - mu_km3_s2 / self.radius_km()
    }

    /// Convert to classical elements under the gravitational parameter `mu_km3_s2`.
    pub fn to_elements(&self, mu_km3_s2: f64) -> Result<OrbitalElements, OrbitError> {
        state_to_elements(self, mu_km3_s2)
    }
}

/// Classical orbital elements. Angles in radians, lengths in kilometres.
///
/// `semi_major_axis` is negative for hyperbolic orbits. A parabola has no finite
/// semi-major axis, so for [`OrbitType::Parabolic`] the field holds the periapsis
/// distance instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub true_anomaly: f64,
    pub inclination: f64,
    pub argument_of_periapsis: f64,
    pub ascending_node: f64,
}

impl OrbitalElements {
    pub fn orbit_type(&self) -> OrbitType {
        OrbitType::classify(self.eccentricity)
    }

    /// Semi-latus rectum `p`.
    pub fn semi_latus_rectum(&self) -> f64 {
        match self.orbit_type() {
            OrbitType::Parabolic => 2.0 * self.semi_major_axis,
            _ => self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity),
        }
    }

    pub fn periapsis_radius(&self) -> f64 {
        match self.orbit_type() {
            OrbitType::Parabolic => self.semi_major_axis,
            _ => self.semi_major_axis * (1.0 - self.eccentricity),
        }
    }

    /// Orbital period in seconds; `None` for open orbits.
    pub fn period(&self, mu_km3_s2: f64) -> Option<f64> {
        if self.orbit_type().is_closed() && self.semi_major_axis > 0.0 {
            Some(TAU * (self.semi_major_axis.powi(3) / mu_km3_s2).sqrt())
        } else {
            None
        }
    }

    /// Check that `a` and `e` agree with the orbit-type classification.
    pub fn validate(&self) -> Result<(), OrbitError> {
        let finite = [
            self.semi_major_axis,
            self.eccentricity,
            self.true_anomaly,
            self.inclination,
            self.argument_of_periapsis,
            self.ascending_node,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite || self.eccentricity < 0.0 {
            return Err(OrbitError::InconsistentElements {
                semi_major_axis: self.semi_major_axis,
                eccentricity: self.eccentricity,
            });
        }
        let consistent = match self.orbit_type() {
            OrbitType::Circular | OrbitType::Elliptical | OrbitType::Parabolic => {
                self.semi_major_axis > 0.0
            }
            OrbitType::Hyperbolic => self.semi_major_axis < 0.0,
        };
        if consistent {
            Ok(())
        } else {
            Err(OrbitError::InconsistentElements {
                semi_major_axis: self.semi_major_axis,
                eccentricity: self.eccentricity,
            })
        }
    }

    /// Convert to a Cartesian state under the gravitational parameter `mu_km3_s2`.
    pub fn to_state(&self, mu_km3_s2: f64) -> Result<StateVector, OrbitError> {
        elements_to_state(self, mu_km3_s2)
    }
}

pub(crate) fn check_mu(mu_km3_s2: f64) -> Result<(), OrbitError> {
    if mu_km3_s2 > 0.0 && mu_km3_s2.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::InvalidGravitationalParameter(mu_km3_s2))
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_two_pi(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wrap an angle into `(−π, π]`.
pub fn wrap_pi(angle: f64) -> f64 {
    let wrapped = wrap_two_pi(angle);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Cartesian state to classical elements.
pub fn state_to_elements(
    state: &StateVector,
    mu_km3_s2: f64,
) -> Result<OrbitalElements, OrbitError> {
    check_mu(mu_km3_s2)?;
    let r_vec = state.position_km;
    let v_vec = state.velocity_km_s;
    let r = vector::norm(&r_vec);
    let v = vector::norm(&v_vec);
    let h_vec = vector::cross(&r_vec, &v_vec);
    let h = vector::norm(&h_vec);
    if r <= 0.0 || !r.is_finite() || !v.is_finite() {
        return Err(OrbitError::DegenerateState);
    }
    if h <= f64::EPSILON * r * v.max(f64::MIN_POSITIVE) {
        // Rectilinear motion has no orbital plane.
        return Err(OrbitError::DegenerateState);
    }
    let h_hat = vector::scale(&h_vec, 1.0 / h);

    let rv = vector::dot(&r_vec, &v_vec);
    let e_vec = vector::scale(
        &vector::combine(&r_vec, v * v - mu_km3_s2 / r, &v_vec, -rv),
        1.0 / mu_km3_s2,
    );
    let e = vector::norm(&e_vec);
    let orbit_type = OrbitType::classify(e);

    let semi_major_axis = match orbit_type {
        OrbitType::Parabolic => 0.5 * h * h / mu_km3_s2,
        _ => {
            let energy = 0.5 * v * v - mu_km3_s2 / r;
            -mu_km3_s2 / (2.0 * energy)
        }
    };

    let inclination = (h_vec[2] / h).clamp(-1.0, 1.0).acos();
    let node_vec = [-h_vec[1], h_vec[0], 0.0];
    let n = vector::norm(&node_vec);
    let equatorial = n <= INCLINATION_TOLERANCE * h;
    let retrograde = h_vec[2] < 0.0;
    let circular = orbit_type == OrbitType::Circular;

    let ascending_node = if equatorial {
        0.0
    } else {
        wrap_two_pi(node_vec[1].atan2(node_vec[0]))
    };

    let signed_planar = |angle: f64| if retrograde { -angle } else { angle };

    let argument_of_periapsis = if circular {
        0.0
    } else if equatorial {
        wrap_two_pi(signed_planar(e_vec[1].atan2(e_vec[0])))
    } else {
        let sin_w = vector::dot(&h_hat, &vector::cross(&node_vec, &e_vec));
        let cos_w = vector::dot(&node_vec, &e_vec);
        wrap_two_pi(sin_w.atan2(cos_w))
    };

    let raw_anomaly = if circular {
        if equatorial {
            signed_planar(r_vec[1].atan2(r_vec[0]))
        } else {
            let sin_u = vector::dot(&h_hat, &vector::cross(&node_vec, &r_vec));
            let cos_u = vector::dot(&node_vec, &r_vec);
            sin_u.atan2(cos_u)
        }
    } else {
        let sin_nu = vector::dot(&h_hat, &vector::cross(&e_vec, &r_vec));
        let cos_nu = vector::dot(&e_vec, &r_vec);
        sin_nu.atan2(cos_nu)
    };
    let true_anomaly = if orbit_type.is_closed() {
        wrap_two_pi(raw_anomaly)
    } else {
        wrap_pi(raw_anomaly)
    };

    Ok(OrbitalElements {
        semi_major_axis,
        eccentricity: e,
        true_anomaly,
        inclination,
        argument_of_periapsis,
        ascending_node,
    })
}

/// Classical elements to Cartesian state.
pub fn elements_to_state(
    elements: &OrbitalElements,
    mu_km3_s2: f64,
) -> Result<StateVector, OrbitError> {
    check_mu(mu_km3_s2)?;
    elements.validate()?;

    let e = elements.eccentricity;
    let nu = elements.true_anomaly;
    let p = elements.semi_latus_rectum();
    let (sin_nu, cos_nu) = nu.sin_cos();
    let denom = 1.0 + e * cos_nu;
    if denom <= 0.0 {
        return Err(OrbitError::UnreachableTrueAnomaly {
            true_anomaly: nu,
            eccentricity: e,
        });
    }

    let r = p / denom;
    let r_pqw = [r * cos_nu, r * sin_nu, 0.0];
    let v_factor = (mu_km3_s2 / p).sqrt();
    let v_pqw = [-v_factor * sin_nu, v_factor * (e + cos_nu), 0.0];

    let rot = perifocal_to_inertial(
        elements.ascending_node,
        elements.inclination,
        elements.argument_of_periapsis,
    );
    Ok(StateVector {
        position_km: rotate(&rot, &r_pqw),
        velocity_km_s: rotate(&rot, &v_pqw),
    })
}

fn perifocal_to_inertial(raan: f64, inc: f64, argp: f64) -> [[f64; 3]; 3] {
    let (sin_o, cos_o) = raan.sin_cos();
    let (sin_w, cos_w) = argp.sin_cos();
    let (sin_i, cos_i) = inc.sin_cos();
    [
        [
            cos_o * cos_w - sin_o * sin_w * cos_i,
            -cos_o * sin_w - sin_o * cos_w * cos_i,
            sin_o * sin_i,
        ],
        [
            sin_o * cos_w + cos_o * sin_w * cos_i,
            -sin_o * sin_w + cos_o * cos_w * cos_i,
            -cos_o * sin_i,
        ],
        [sin_w * sin_i, cos_w * sin_i, cos_i],
    ]
}

fn rotate(m: &[[f64; 3]; 3], v: &Vector3) -> Vector3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}
