//! Multiple gravity assist trajectories with deep-space manoeuvres.
//!
//! An [`Itinerary`] is an ordered list of [`TrajectoryNode`]s. Its derived
//! [`ItineraryPlan`] splits the nodes into legs and fixes the positional meaning of the
//! flat design vector. [`TrajectoryEngine`] prices a design vector leg by leg and returns
//! the Δv of every manoeuvre.

pub mod engine;
pub mod error;
pub mod facade;
pub mod itinerary;
pub mod node;
pub mod plan;
pub mod report;

pub use engine::{EngineOptions, TrajectoryEngine};
pub use error::{ItineraryError, TrajectoryError};
pub use facade::{design_vector_from_config, itinerary_from_config, node_from_config};
pub use itinerary::Itinerary;
pub use node::{NodeKind, SphericalDeltaV, TrajectoryNode};
pub use plan::{DsmSlots, ItineraryPlan, Slot, SlotKind, TrajectoryLeg};
pub use report::{
    Diagnostic, DiagnosticSource, LegSummary, Maneuver, ManeuverKind, TrajectoryReport,
};
