use solar_config::ConfigError;
use solar_ephem::EphemerisError;
use solar_impulsive::{FlybyError, LambertError};
use solar_orbits::{OrbitError, PropagationError};
use thiserror::Error;

use crate::node::NodeKind;
use crate::plan::Slot;

/// Structural problems with an itinerary or the design vector handed to it.
///
/// Detected before any numeric work and cached alongside the derived plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItineraryError {
    #[error("itinerary has no nodes")]
    Empty,
    #[error("first node must be a departure, found {0}")]
    FirstNodeNotDeparture(NodeKind),
    #[error("departure at node {0}; only the first node may be a departure")]
    MisplacedDeparture(usize),
    #[error("last node must be a flyby, rendezvous or insertion, found {0}")]
    InvalidTerminalNode(NodeKind),
    #[error("node {index} is a {expected}; cannot replace it with a {found}")]
    NodeKindMismatch {
        index: usize,
        expected: NodeKind,
        found: NodeKind,
    },
    #[error("node index {index} is out of range for {len} nodes")]
    NodeIndexOutOfRange { index: usize, len: usize },
    #[error("node {index} is invalid: {reason}")]
    InvalidNode { index: usize, reason: String },
    #[error("design vector has {found} entries, itinerary expects {expected}")]
    DesignVectorLength { expected: usize, found: usize },
    #[error("design vector entry {index} ({slot}) has out-of-range value {value}")]
    InvalidDesignValue { index: usize, slot: Slot, value: f64 },
}

/// Any failure while evaluating a trajectory.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error(transparent)]
    Itinerary(#[from] ItineraryError),
    #[error("ephemeris query failed: {0}")]
    Ephemeris(#[from] EphemerisError),
    #[error("flyby failed: {0}")]
    Flyby(#[from] FlybyError),
    #[error("propagation failed: {0}")]
    Propagation(#[from] PropagationError),
    #[error("lambert solver failed: {0}")]
    Lambert(#[from] LambertError),
    #[error("orbit computation failed: {0}")]
    Orbit(#[from] OrbitError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
