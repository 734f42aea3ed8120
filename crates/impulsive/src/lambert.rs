//! Lambert boundary-value solver (Izzo/Battin formulation with a secant search on `x`).
//!
//! The problem is made non-dimensional with `DU = |r1|`, `VU = √(μ/DU)`, `TU = DU/VU`.
//! Zero-revolution transfers iterate on `ln(1 + x)`; multi-revolution transfers iterate on
//! `tan(πx/2)` along the left branch. Each step is a Newton–Raphson step whose derivative
//! `dT/du` is replaced by the slope through the two latest iterates, so the time-of-flight
//! function never needs an analytic derivative. Both searches are capped; a miss is reported
//! through [`LambertSolution::converged`] and a log warning, never as an error.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use log::{trace, warn};
use solar_core::vector::{self, Vector3};
use thiserror::Error;

/// Iteration cap shared by both branches.
pub const MAX_ITERATIONS: usize = 60;
/// Convergence tolerance on the (transformed) free parameter.
pub const TOLERANCE: f64 = 1e-11;

/// Sense of motion around the central body, judged by the z-component of `r1 × r2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Prograde,
    Retrograde,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LambertError {
    #[error("time of flight must be positive, got {0} s")]
    NonPositiveTimeOfFlight(f64),
    #[error("gravitational parameter must be positive and finite, got {0}")]
    InvalidGravitationalParameter(f64),
    #[error("position vectors must be finite and non-zero")]
    DegeneratePosition,
    #[error("no {revolutions}-revolution solution produced finite velocities")]
    NoSolution { revolutions: u32 },
}

/// Terminal velocities plus the geometry of the connecting conic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertSolution {
    pub v1_km_s: Vector3,
    pub v2_km_s: Vector3,
    /// Negative for hyperbolic transfers.
    pub semi_major_axis_km: f64,
    pub semi_latus_rectum_km: f64,
    pub transfer_angle_rad: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Two-point boundary-value capability consumed by the trajectory engine.
pub trait LambertSolver {
    fn solve(
        &self,
        r1_km: &Vector3,
        r2_km: &Vector3,
        time_of_flight_s: f64,
        mu_km3_s2: f64,
        direction: Direction,
        revolutions: u32,
    ) -> Result<LambertSolution, LambertError>;
}

#[derive(Debug, Clone, Copy)]
pub struct IzzoLambert {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for IzzoLambert {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            tolerance: TOLERANCE,
        }
    }
}

/// Solve with the default [`IzzoLambert`] settings.
pub fn solve(
    r1_km: &Vector3,
    r2_km: &Vector3,
    time_of_flight_s: f64,
    mu_km3_s2: f64,
    direction: Direction,
    revolutions: u32,
) -> Result<LambertSolution, LambertError> {
    IzzoLambert::default().solve(
        r1_km,
        r2_km,
        time_of_flight_s,
        mu_km3_s2,
        direction,
        revolutions,
    )
}

/// Non-dimensional transfer geometry.
#[derive(Debug, Clone, Copy)]
struct Geometry {
    /// Semi-perimeter.
    s: f64,
    /// Chord.
    c: f64,
    long_way: bool,
    revolutions: u32,
}

impl Geometry {
    /// Time of flight for the free parameter `x`; `x < 1` is elliptical.
    fn time_of_flight(&self, x: f64) -> f64 {
        let am = self.s / 2.0;
        let a = am / (1.0 - x * x);
        if x < 1.0 {
            let mut beta = 2.0 * ((self.s - self.c) / (2.0 * a)).clamp(0.0, 1.0).sqrt().asin();
            if self.long_way {
                beta = -beta;
            }
            let alpha = 2.0 * x.clamp(-1.0, 1.0).acos();
            a * a.sqrt()
                * ((alpha - alpha.sin()) - (beta - beta.sin()) + TAU * f64::from(self.revolutions))
        } else {
            let alpha = 2.0 * x.acosh();
            let mut beta = 2.0 * ((self.s - self.c) / (-2.0 * a)).max(0.0).sqrt().asinh();
            if self.long_way {
                beta = -beta;
            }
            -a * (-a).sqrt() * ((alpha.sinh() - alpha) - (beta.sinh() - beta))
        }
    }
}

struct Search {
    x: f64,
    iterations: usize,
    converged: bool,
}

impl IzzoLambert {
    /// Secant iteration on a transformed parameter `u` with `x = to_x(u)`.
    fn secant(
        &self,
        mut u1: f64,
        mut u2: f64,
        residual: impl Fn(f64) -> f64,
        to_x: impl Fn(f64) -> f64,
    ) -> Search {
        let mut y1 = residual(to_x(u1));
        let mut y2 = residual(to_x(u2));
        let mut u_new = u2;
        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations && y1 != y2 {
            iterations += 1;
            u_new = (u1 * y2 - y1 * u2) / (y2 - y1);
            let y_new = residual(to_x(u_new));
            trace!("lambert iteration {iterations}: u = {u_new:.15e}, residual = {y_new:.3e}");
            let step = (u2 - u_new).abs();
            u1 = u2;
            y1 = y2;
            u2 = u_new;
            y2 = y_new;
            if step <= self.tolerance {
                converged = true;
                break;
            }
            if !u_new.is_finite() {
                break;
            }
        }
        if y1 == y2 && !converged {
            // Flat residual: the current iterate is as good as the search can do.
            converged = y2.abs() <= self.tolerance;
        }
        Search {
            x: to_x(u_new),
            iterations,
            converged,
        }
    }
}

impl LambertSolver for IzzoLambert {
    fn solve(
        &self,
        r1_km: &Vector3,
        r2_km: &Vector3,
        time_of_flight_s: f64,
        mu_km3_s2: f64,
        direction: Direction,
        revolutions: u32,
    ) -> Result<LambertSolution, LambertError> {
        if !(time_of_flight_s > 0.0 && time_of_flight_s.is_finite()) {
            return Err(LambertError::NonPositiveTimeOfFlight(time_of_flight_s));
        }
        if !(mu_km3_s2 > 0.0 && mu_km3_s2.is_finite()) {
            return Err(LambertError::InvalidGravitationalParameter(mu_km3_s2));
        }
        let r1_mod = vector::norm(r1_km);
        let r2_raw = vector::norm(r2_km);
        if !(r1_mod > 0.0 && r1_mod.is_finite() && r2_raw > 0.0 && r2_raw.is_finite()) {
            return Err(LambertError::DegeneratePosition);
        }

        let du = r1_mod;
        let vu = (mu_km3_s2 / du).sqrt();
        let tu = du / vu;
        let t = time_of_flight_s / tu;
        let r1 = vector::scale(r1_km, 1.0 / du);
        let r2 = vector::scale(r2_km, 1.0 / du);
        let r2_mod = r2_raw / du;

        let mut theta = (vector::dot(&r1, &r2) / r2_mod).clamp(-1.0, 1.0).acos();
        let normal = vector::cross(&r1, &r2);
        let reflex = match direction {
            Direction::Prograde => normal[2] < 0.0,
            Direction::Retrograde => normal[2] >= 0.0,
        };
        if reflex {
            theta = TAU - theta;
        }
        let long_way = theta > PI;

        let c = (1.0 + r2_mod * (r2_mod - 2.0 * theta.cos())).sqrt();
        let s = (1.0 + r2_mod + c) / 2.0;
        let am = s / 2.0;
        let lambda = r2_mod.sqrt() * (theta / 2.0).cos() / s;
        let geometry = Geometry {
            s,
            c,
            long_way,
            revolutions,
        };

        let search = if revolutions == 0 {
            self.secant(
                0.4767f64.ln(),
                1.5233f64.ln(),
                |x| geometry.time_of_flight(x).ln() - t.ln(),
                |u| u.exp() - 1.0,
            )
        } else {
            self.secant(
                (-0.5234 * FRAC_PI_2).tan(),
                (-0.2234 * FRAC_PI_2).tan(),
                |x| geometry.time_of_flight(x) - t,
                |u| u.atan() / FRAC_PI_2,
            )
        };
        if !search.converged {
            warn!(
                "lambert solver did not converge after {} iterations (tof = {time_of_flight_s} s, N = {revolutions}); using last estimate",
                search.iterations
            );
        }
        let x = search.x;

        let a = am / (1.0 - x * x);
        let eta2 = if x < 1.0 {
            let mut beta = 2.0 * ((s - c) / (2.0 * a)).clamp(0.0, 1.0).sqrt().asin();
            if long_way {
                beta = -beta;
            }
            let alpha = 2.0 * x.clamp(-1.0, 1.0).acos();
            let psi = (alpha - beta) / 2.0;
            2.0 * a * psi.sin().powi(2) / s
        } else {
            let mut beta = 2.0 * ((s - c) / (-2.0 * a)).max(0.0).sqrt().asinh();
            if long_way {
                beta = -beta;
            }
            let alpha = 2.0 * x.acosh();
            let psi = (alpha - beta) / 2.0;
            -2.0 * a * psi.sinh().powi(2) / s
        };
        let eta = eta2.sqrt();

        let p = (r2_mod / (am * eta2)) * (theta / 2.0).sin().powi(2);
        let sigma1 = (2.0 * lambda * am - (lambda + x * eta)) / (eta * am.sqrt());

        let mut ih = orbit_normal(&r1, &normal);
        if long_way {
            ih = vector::scale(&ih, -1.0);
        }

        let vr1 = sigma1;
        let vt1 = p.sqrt();
        let v1 = vector::combine(&r1, vr1, &vector::cross(&ih, &r1), vt1);

        let vt2 = vt1 / r2_mod;
        let vr2 = -vr1 + (vt1 - vt2) / (theta / 2.0).tan();
        let r2_hat = vector::scale(&r2, 1.0 / r2_mod);
        let v2 = vector::combine(&r2_hat, vr2, &vector::cross(&ih, &r2_hat), vt2);

        let v1_km_s = vector::scale(&v1, vu);
        let v2_km_s = vector::scale(&v2, vu);
        if !v1_km_s.iter().chain(v2_km_s.iter()).all(|v| v.is_finite()) {
            return Err(LambertError::NoSolution { revolutions });
        }

        Ok(LambertSolution {
            v1_km_s,
            v2_km_s,
            semi_major_axis_km: a * du,
            semi_latus_rectum_km: p * du,
            transfer_angle_rad: theta,
            iterations: search.iterations,
            converged: search.converged,
        })
    }
}

/// Unit normal of the transfer plane; falls back to a vector perpendicular to `r1`
/// (preferring +z) when `r1` and `r2` are collinear.
fn orbit_normal(r1_hat: &Vector3, r1_cross_r2: &Vector3) -> Vector3 {
    if vector::norm(r1_cross_r2) > 1e-12 {
        if let Some(n) = vector::unit(r1_cross_r2) {
            return n;
        }
    }
    let reference = if r1_hat[2].abs() < 0.99 {
        [0.0, 0.0, 1.0]
    } else {
        [1.0, 0.0, 0.0]
    };
    let projected = vector::combine(&reference, 1.0, r1_hat, -vector::dot(&reference, r1_hat));
    vector::unit(&projected).unwrap_or([0.0, 0.0, 1.0])
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU_EARTH: f64 = 398_600.441_8;

    #[test]
    fn secant_search_converges_superlinearly() {
        let cases = [
            ([15_945.34, 0.0, 0.0], [12_214.838_99, 10_249.467_31, 0.0], 76.0 * 60.0, 0),
            ([7_000.0, 0.0, 0.0], [0.0, 8_000.0, 0.0], 9_000.0, 1),
        ];
        for (r1, r2, tof, revolutions) in cases {
            let sol = solve(&r1, &r2, tof, MU_EARTH, Direction::Prograde, revolutions).unwrap();
            assert!(sol.converged, "N = {revolutions}");
            assert!(
                sol.iterations <= 10,
                "N = {revolutions}: {} iterations",
                sol.iterations
            );
        }
    }

    #[test]
    fn rejects_non_positive_time_of_flight() {
        let err = solve(&[7_000.0, 0.0, 0.0], &[0.0, 7_000.0, 0.0], 0.0, MU_EARTH, Direction::Prograde, 0)
            .unwrap_err();
        assert_eq!(err, LambertError::NonPositiveTimeOfFlight(0.0));
    }

    #[test]
    fn rejects_zero_position() {
        let err = solve(&[0.0; 3], &[0.0, 7_000.0, 0.0], 600.0, MU_EARTH, Direction::Prograde, 0)
            .unwrap_err();
        assert_eq!(err, LambertError::DegeneratePosition);
    }

    #[test]
    fn direction_selects_transfer_angle() {
        let r1 = [7_000.0, 0.0, 0.0];
        let r2 = [0.0, 8_000.0, 0.0];
        let pro = solve(&r1, &r2, 3_000.0, MU_EARTH, Direction::Prograde, 0).unwrap();
        let retro = solve(&r1, &r2, 3_000.0, MU_EARTH, Direction::Retrograde, 0).unwrap();
        assert!((pro.transfer_angle_rad - FRAC_PI_2).abs() < 1e-12);
        assert!((retro.transfer_angle_rad - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!(vector::cross(&r1, &pro.v1_km_s)[2] > 0.0);
        assert!(vector::cross(&r1, &retro.v1_km_s)[2] < 0.0);
    }

    #[test]
    fn collinear_positions_still_produce_a_plane() {
        let n = orbit_normal(&[1.0, 0.0, 0.0], &[0.0, 0.0, 0.0]);
        assert_eq!(n, [0.0, 0.0, 1.0]);
        let n = orbit_normal(&[0.0, 0.0, 1.0], &[0.0, 0.0, 0.0]);
        assert!(vector::dot(&n, &[0.0, 0.0, 1.0]).abs() < 1e-12);
    }

    #[test]
    fn time_of_flight_grows_with_revolutions() {
        let geometry = |revolutions| Geometry {
            s: 1.8,
            c: 1.4,
            long_way: false,
            revolutions,
        };
        let t0 = geometry(0).time_of_flight(0.0);
        let t1 = geometry(1).time_of_flight(0.0);
        let am = 0.9f64;
        assert!((t1 - t0 - TAU * am * am.sqrt()).abs() < 1e-12);
    }
}
