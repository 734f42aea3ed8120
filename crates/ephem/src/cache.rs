//! Owned memoisation layer for repeated ephemeris queries.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::trace;
use solar_orbits::StateVector;

use crate::{BodyProperties, Ephemeris, EphemerisError};

type StateKey = (String, u64);

/// Caches state vectors per `(body, epoch)` in front of another ephemeris.
///
/// Epochs are keyed by their exact bit pattern, so only identical queries hit.
#[derive(Debug, Default)]
pub struct CachedEphemeris<E> {
    inner: E,
    states: Mutex<HashMap<StateKey, StateVector>>,
}

impl<E> CachedEphemeris<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            states: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    pub fn len(&self) -> usize {
        self.states().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.states().clear();
    }

    fn states(&self) -> MutexGuard<'_, HashMap<StateKey, StateVector>> {
        // A panic elsewhere cannot leave a half-written entry, so poisoning is ignored.
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<E: Ephemeris> Ephemeris for CachedEphemeris<E> {
    fn state_vector(&self, body: &str, epoch_mjd2000: f64) -> Result<StateVector, EphemerisError> {
        let key = (body.trim().to_ascii_lowercase(), epoch_mjd2000.to_bits());
        if let Some(state) = self.states().get(&key) {
            trace!("ephemeris cache hit for {body} at {epoch_mjd2000}");
            return Ok(*state);
        }
        let state = self.inner.state_vector(body, epoch_mjd2000)?;
        self.states().insert(key, state);
        Ok(state)
    }

    fn body_properties(&self, body: &str) -> Result<BodyProperties, EphemerisError> {
        self.inner.body_properties(body)
    }

    fn central_body_mu(&self, body: &str) -> Result<f64, EphemerisError> {
        self.inner.central_body_mu(body)
    }
}
