//! Universal-variable Kepler propagation for every conic.
//!
//! Solves the universal time-of-flight equation for `x` by Newton iteration, then either
//! builds the Lagrange coefficients (Cartesian states) or advances the orbit-specific anomaly
//! (classical elements). The iteration stops once the step drops below the absolute
//! tolerance, or once the steps stop shrinking while the time residual is already at the
//! round-off floor. Running out of iterations is not an error: the last estimate is
//! returned with `converged = false` and a warning is logged.

use log::{trace, warn};
use solar_core::vector::{self, Vector3};
use thiserror::Error;

use crate::anomaly;
use crate::elements::{OrbitType, OrbitalElements, StateVector, wrap_two_pi};
use crate::stumpff::c2_c3;
use crate::OrbitError;

/// Hard cap on Newton iterations.
pub const MAX_ITERATIONS: usize = 100;
/// Absolute convergence tolerance on the universal variable.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-9;
/// `|α·r0|` below which the near-parabolic initial guess is used.
const NEAR_PARABOLIC_BAND: f64 = 1e-6;
/// Time residual, relative to `√μ·|Δt|`, accepted once the Newton steps stop shrinking.
pub const STALL_RESIDUAL_TOLERANCE: f64 = 1e-8;
const LAGRANGE_IDENTITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("gravitational parameter must be positive and finite, got {0}")]
    InvalidGravitationalParameter(f64),
    #[error("propagation duration must be finite, got {0}")]
    InvalidDuration(f64),
    #[error("initial state has zero or non-finite radius")]
    DegenerateState,
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

/// A propagated value together with the solver's convergence report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propagated<T> {
    pub value: T,
    pub iterations: usize,
    pub converged: bool,
}

/// Two-body propagation for both state representations.
pub trait Propagator {
    /// Advance a Cartesian state by `dt_s` seconds (negative propagates backwards).
    fn propagate_state(
        &self,
        state: &StateVector,
        mu_km3_s2: f64,
        dt_s: f64,
    ) -> Result<Propagated<StateVector>, PropagationError>;

    /// Advance classical elements by `dt_s` seconds; only the true anomaly changes.
    fn propagate_elements(
        &self,
        elements: &OrbitalElements,
        mu_km3_s2: f64,
        dt_s: f64,
    ) -> Result<Propagated<OrbitalElements>, PropagationError>;
}

/// Universal-variable propagator (Lagrange coefficients / anomaly advance).
#[derive(Debug, Clone, Copy)]
pub struct UniversalPropagator {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for UniversalPropagator {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            tolerance: CONVERGENCE_TOLERANCE,
        }
    }
}

/// Propagate a Cartesian state with the default [`UniversalPropagator`].
pub fn propagate(
    state: &StateVector,
    mu_km3_s2: f64,
    dt_s: f64,
) -> Result<StateVector, PropagationError> {
    UniversalPropagator::default()
        .propagate_state(state, mu_km3_s2, dt_s)
        .map(|p| p.value)
}

/// Initial conditions of the universal Kepler equation.
#[derive(Debug, Clone, Copy)]
struct UniversalSeed {
    r0: f64,
    /// `r0·v0 / √μ`
    sigma0: f64,
    /// Reciprocal semi-major axis `2/r0 − v0²/μ`.
    alpha: f64,
    /// Semi-latus rectum, used by the near-parabolic guess.
    p: f64,
}

#[derive(Debug, Clone, Copy)]
struct UniversalSolution {
    x: f64,
    psi: f64,
    c2: f64,
    c3: f64,
    r: f64,
    dt_s: f64,
    iterations: usize,
    converged: bool,
}

impl UniversalPropagator {
    fn solve(&self, seed: &UniversalSeed, mu: f64, dt_s: f64) -> UniversalSolution {
        let sqrt_mu = mu.sqrt();
        let alpha_r0 = seed.alpha * seed.r0;

        // Closed orbits repeat; iterate on the shortest equivalent duration.
        let dt_s = if alpha_r0 > NEAR_PARABOLIC_BAND {
            let period = std::f64::consts::TAU / (mu * seed.alpha.powi(3)).sqrt();
            if dt_s.abs() > period { dt_s % period } else { dt_s }
        } else {
            dt_s
        };

        let mut x = initial_guess(seed, mu, dt_s);
        let mut iterations = 0;
        let mut converged = false;
        let mut previous_step = f64::INFINITY;
        let residual_floor = STALL_RESIDUAL_TOLERANCE * sqrt_mu * dt_s.abs();
        while iterations < self.max_iterations {
            iterations += 1;
            let x2 = x * x;
            let psi = x2 * seed.alpha;
            let (c2, c3) = c2_c3(psi);
            let r = x2 * c2 + seed.sigma0 * x * (1.0 - psi * c3) + seed.r0 * (1.0 - psi * c2);
            let residual = sqrt_mu * dt_s
                - x2 * x * c3
                - seed.sigma0 * x2 * c2
                - seed.r0 * x * (1.0 - psi * c3);
            let x_next = x + residual / r;
            trace!("universal iteration {iterations}: x = {x_next:.15e}");
            let step = (x_next - x).abs();
            x = x_next;
            if step < self.tolerance {
                converged = true;
                break;
            }
            // Round-off in the Stumpff terms keeps x jittering above the tolerance.
            if step >= previous_step && residual.abs() <= residual_floor {
                trace!("universal iteration stalled at step {step:e}; accepting x");
                converged = true;
                break;
            }
            previous_step = step;
            if !x.is_finite() {
                break;
            }
        }
        if !converged {
            warn!(
                "universal-variable iteration did not converge after {iterations} iterations (dt = {dt_s} s); using last estimate"
            );
        }

        let x2 = x * x;
        let psi = x2 * seed.alpha;
        let (c2, c3) = c2_c3(psi);
        let r = x2 * c2 + seed.sigma0 * x * (1.0 - psi * c3) + seed.r0 * (1.0 - psi * c2);
        UniversalSolution {
            x,
            psi,
            c2,
            c3,
            r,
            dt_s,
            iterations,
            converged,
        }
    }
}

fn initial_guess(seed: &UniversalSeed, mu: f64, dt_s: f64) -> f64 {
    let sqrt_mu = mu.sqrt();
    let alpha_r0 = seed.alpha * seed.r0;
    if alpha_r0 > NEAR_PARABOLIC_BAND {
        sqrt_mu * dt_s * seed.alpha
    } else if alpha_r0 < -NEAR_PARABOLIC_BAND {
        let a = 1.0 / seed.alpha;
        let sign = dt_s.signum();
        let numerator = -2.0 * mu * seed.alpha * dt_s;
        let denominator =
            seed.sigma0 * sqrt_mu + sign * (-mu * a).sqrt() * (1.0 - seed.r0 * seed.alpha);
        let guess = sign * (-a).sqrt() * (numerator / denominator).ln();
        if guess.is_finite() {
            guess
        } else {
            sqrt_mu * dt_s / seed.r0
        }
    } else {
        let p = seed.p;
        let s = 0.5 * (1.0 / (3.0 * (mu / p.powi(3)).sqrt() * dt_s)).atan();
        let w = s.tan().cbrt().atan();
        let guess = 2.0 * p.sqrt() / (2.0 * w).tan();
        if guess.is_finite() {
            guess
        } else {
            sqrt_mu * dt_s / seed.r0
        }
    }
}

fn check_inputs(mu_km3_s2: f64, dt_s: f64) -> Result<(), PropagationError> {
    if !(mu_km3_s2 > 0.0 && mu_km3_s2.is_finite()) {
        return Err(PropagationError::InvalidGravitationalParameter(mu_km3_s2));
    }
    if !dt_s.is_finite() {
        return Err(PropagationError::InvalidDuration(dt_s));
    }
    Ok(())
}

impl Propagator for UniversalPropagator {
    fn propagate_state(
        &self,
        state: &StateVector,
        mu_km3_s2: f64,
        dt_s: f64,
    ) -> Result<Propagated<StateVector>, PropagationError> {
        check_inputs(mu_km3_s2, dt_s)?;
        let r0_vec: Vector3 = state.position_km;
        let v0_vec: Vector3 = state.velocity_km_s;
        let r0 = vector::norm(&r0_vec);
        let v0 = vector::norm(&v0_vec);
        if !(r0 > 0.0 && r0.is_finite() && v0.is_finite()) {
            return Err(PropagationError::DegenerateState);
        }
        if dt_s == 0.0 {
            return Ok(Propagated {
                value: *state,
                iterations: 0,
                converged: true,
            });
        }

        let sqrt_mu = mu_km3_s2.sqrt();
        let h = vector::norm(&vector::cross(&r0_vec, &v0_vec));
        let seed = UniversalSeed {
            r0,
            sigma0: vector::dot(&r0_vec, &v0_vec) / sqrt_mu,
            alpha: 2.0 / r0 - v0 * v0 / mu_km3_s2,
            p: h * h / mu_km3_s2,
        };
        let sol = self.solve(&seed, mu_km3_s2, dt_s);

        let x2 = sol.x * sol.x;
        let f = 1.0 - x2 / r0 * sol.c2;
        let g = sol.dt_s - x2 * sol.x / sqrt_mu * sol.c3;
        let position = vector::combine(&r0_vec, f, &v0_vec, g);
        let r = vector::norm(&position);
        let g_dot = 1.0 - x2 / r * sol.c2;
        let f_dot = sqrt_mu / (r * r0) * sol.x * (sol.psi * sol.c3 - 1.0);
        let velocity = vector::combine(&r0_vec, f_dot, &v0_vec, g_dot);

        let identity = f * g_dot - f_dot * g;
        if (identity - 1.0).abs() > LAGRANGE_IDENTITY_TOLERANCE {
            warn!("Lagrange identity violated: f·ġ − ḟ·g = {identity:.12} (dt = {dt_s} s)");
        }
        if (r - sol.r).abs() > 1e-6 * r.max(1.0) {
            trace!("radius from f/g ({r}) differs from universal radius ({})", sol.r);
        }

        Ok(Propagated {
            value: StateVector::new(position, velocity),
            iterations: sol.iterations,
            converged: sol.converged,
        })
    }

    fn propagate_elements(
        &self,
        elements: &OrbitalElements,
        mu_km3_s2: f64,
        dt_s: f64,
    ) -> Result<Propagated<OrbitalElements>, PropagationError> {
        check_inputs(mu_km3_s2, dt_s)?;
        elements.validate()?;
        if dt_s == 0.0 {
            return Ok(Propagated {
                value: *elements,
                iterations: 0,
                converged: true,
            });
        }

        let e = elements.eccentricity;
        let nu0 = elements.true_anomaly;
        let p = elements.semi_latus_rectum();
        let orbit_type = elements.orbit_type();
        let (sin_nu, cos_nu) = nu0.sin_cos();
        let denom = 1.0 + e * cos_nu;
        if denom <= 0.0 {
            return Err(OrbitError::UnreachableTrueAnomaly {
                true_anomaly: nu0,
                eccentricity: e,
            }
            .into());
        }
        let r0 = p / denom;
        let alpha = match orbit_type {
            OrbitType::Parabolic => 0.0,
            _ => 1.0 / elements.semi_major_axis,
        };
        let seed = UniversalSeed {
            r0,
            sigma0: e * sin_nu * r0 / p.sqrt(),
            alpha,
            p,
        };
        let sol = self.solve(&seed, mu_km3_s2, dt_s);

        let true_anomaly = match orbit_type {
            OrbitType::Circular | OrbitType::Elliptical => {
                let e0 = anomaly::true_to_eccentric(nu0, e);
                let e1 = e0 + sol.x / elements.semi_major_axis.sqrt();
                wrap_two_pi(anomaly::eccentric_to_true(e1, e))
            }
            OrbitType::Hyperbolic => {
                let h0 = anomaly::true_to_hyperbolic(nu0, e);
                let h1 = h0 + sol.x / (-elements.semi_major_axis).sqrt();
                anomaly::hyperbolic_to_true(h1, e)
            }
            OrbitType::Parabolic => {
                let d0 = anomaly::true_to_parabolic(nu0);
                let d1 = d0 + sol.x / p.sqrt();
                anomaly::parabolic_to_true(d1)
            }
        };

        Ok(Propagated {
            value: OrbitalElements {
                true_anomaly,
                ..*elements
            },
            iterations: sol.iterations,
            converged: sol.converged,
        })
    }
}
