//! Ephemeris capability consumed by the trajectory engine.
//!
//! Implementations answer two questions: where a body is at an epoch (MJD2000 days), and
//! what its physical constants are. `AnalyticEphemeris` evaluates mean orbital elements;
//! `CachedEphemeris` wraps any implementation with an owned state cache.

pub mod analytic;
pub mod cache;

use solar_orbits::{OrbitError, StateVector};
use thiserror::Error;

pub use analytic::AnalyticEphemeris;
pub use cache::CachedEphemeris;

/// Errors surfaced by ephemeris back-ends.
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("unknown body `{0}`")]
    UnknownBody(String),
    #[error(
        "epoch {epoch_mjd2000} (MJD2000) is outside the ephemeris of `{body}` [{valid_from}, {valid_to}]"
    )]
    EpochOutOfRange {
        body: String,
        epoch_mjd2000: f64,
        valid_from: f64,
        valid_to: f64,
    },
    #[error("invalid body catalog: {0}")]
    InvalidCatalog(String),
    #[error("failed to build state for `{body}`: {source}")]
    State {
        body: String,
        #[source]
        source: OrbitError,
    },
}

/// Physical constants of a catalog body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyProperties {
    pub name: String,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
    /// μ of the body this one orbits.
    pub central_mu_km3_s2: f64,
}

pub trait Ephemeris {
    /// Inertial state of `body` at `epoch_mjd2000`, relative to its central body.
    fn state_vector(&self, body: &str, epoch_mjd2000: f64) -> Result<StateVector, EphemerisError>;

    fn body_properties(&self, body: &str) -> Result<BodyProperties, EphemerisError>;

    /// Gravitational parameter governing motion around `body`'s primary.
    fn central_body_mu(&self, body: &str) -> Result<f64, EphemerisError> {
        self.body_properties(body).map(|p| p.central_mu_km3_s2)
    }
}

impl<E: Ephemeris + ?Sized> Ephemeris for &E {
    fn state_vector(&self, body: &str, epoch_mjd2000: f64) -> Result<StateVector, EphemerisError> {
        (**self).state_vector(body, epoch_mjd2000)
    }

    fn body_properties(&self, body: &str) -> Result<BodyProperties, EphemerisError> {
        (**self).body_properties(body)
    }

    fn central_body_mu(&self, body: &str) -> Result<f64, EphemerisError> {
        (**self).central_body_mu(body)
    }
}
