//! Itinerary events. Each node carries nominal values for the design-vector slots it owns.

use std::fmt;

use serde::{Deserialize, Serialize};
use solar_core::vector::Vector3;
use solar_impulsive::spherical_delta_v;
use solar_orbits::OrbitalElements;

/// Discriminant of [`TrajectoryNode`], used for structural checks and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Departure,
    Dsm,
    Flyby,
    Rendezvous,
    Insertion,
}

impl NodeKind {
    /// Flyby, rendezvous and insertion end a leg.
    pub fn is_arrival(self) -> bool {
        matches!(self, NodeKind::Flyby | NodeKind::Rendezvous | NodeKind::Insertion)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Departure => "departure",
            NodeKind::Dsm => "dsm",
            NodeKind::Flyby => "flyby",
            NodeKind::Rendezvous => "rendezvous",
            NodeKind::Insertion => "insertion",
        };
        f.write_str(name)
    }
}

/// Impulse as magnitude (km/s) with polar and azimuth parameters in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SphericalDeltaV {
    pub magnitude_km_s: f64,
    pub polar: f64,
    pub azimuth: f64,
}

impl SphericalDeltaV {
    pub fn new(magnitude_km_s: f64, polar: f64, azimuth: f64) -> Self {
        Self {
            magnitude_km_s,
            polar,
            azimuth,
        }
    }

    pub fn to_cartesian(&self) -> Vector3 {
        spherical_delta_v(self.magnitude_km_s, self.polar, self.azimuth)
    }
}

/// One event of an MGA-DSM itinerary. Epochs are MJD2000 days, durations days.
#[derive(Debug, Clone, PartialEq)]
pub enum TrajectoryNode {
    Departure {
        body: String,
        epoch_mjd2000: f64,
        /// Launch impulse, used when a DSM follows.
        escape_delta_v: SphericalDeltaV,
    },
    Dsm {
        /// Fraction of the remaining leg time coasted before this manoeuvre.
        alpha: f64,
        /// Impulse fired here when a later DSM in the same leg exists.
        delta_v: SphericalDeltaV,
    },
    Flyby {
        body: String,
        tof_days: f64,
        altitude_km: f64,
        b_plane_angle_rad: f64,
    },
    Rendezvous {
        body: String,
        tof_days: f64,
    },
    Insertion {
        body: String,
        target_orbit: OrbitalElements,
        tof_days: f64,
        time_in_orbit_days: f64,
        /// Escape impulse, used when a DSM follows.
        escape_delta_v: SphericalDeltaV,
    },
}

impl TrajectoryNode {
    pub fn departure(body: impl Into<String>, epoch_mjd2000: f64) -> Self {
        TrajectoryNode::Departure {
            body: body.into(),
            epoch_mjd2000,
            escape_delta_v: SphericalDeltaV::default(),
        }
    }

    pub fn dsm(alpha: f64) -> Self {
        TrajectoryNode::Dsm {
            alpha,
            delta_v: SphericalDeltaV::default(),
        }
    }

    pub fn flyby(
        body: impl Into<String>,
        tof_days: f64,
        altitude_km: f64,
        b_plane_angle_rad: f64,
    ) -> Self {
        TrajectoryNode::Flyby {
            body: body.into(),
            tof_days,
            altitude_km,
            b_plane_angle_rad,
        }
    }

    pub fn rendezvous(body: impl Into<String>, tof_days: f64) -> Self {
        TrajectoryNode::Rendezvous {
            body: body.into(),
            tof_days,
        }
    }

    pub fn insertion(
        body: impl Into<String>,
        target_orbit: OrbitalElements,
        tof_days: f64,
        time_in_orbit_days: f64,
    ) -> Self {
        TrajectoryNode::Insertion {
            body: body.into(),
            target_orbit,
            tof_days,
            time_in_orbit_days,
            escape_delta_v: SphericalDeltaV::default(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TrajectoryNode::Departure { .. } => NodeKind::Departure,
            TrajectoryNode::Dsm { .. } => NodeKind::Dsm,
            TrajectoryNode::Flyby { .. } => NodeKind::Flyby,
            TrajectoryNode::Rendezvous { .. } => NodeKind::Rendezvous,
            TrajectoryNode::Insertion { .. } => NodeKind::Insertion,
        }
    }

    /// Body the event happens at; `None` for a deep-space manoeuvre.
    pub fn body(&self) -> Option<&str> {
        match self {
            TrajectoryNode::Departure { body, .. }
            | TrajectoryNode::Flyby { body, .. }
            | TrajectoryNode::Rendezvous { body, .. }
            | TrajectoryNode::Insertion { body, .. } => Some(body),
            TrajectoryNode::Dsm { .. } => None,
        }
    }

    /// Time of flight of the leg this arrival node ends.
    pub fn tof_days(&self) -> Option<f64> {
        match self {
            TrajectoryNode::Flyby { tof_days, .. }
            | TrajectoryNode::Rendezvous { tof_days, .. }
            | TrajectoryNode::Insertion { tof_days, .. } => Some(*tof_days),
            _ => None,
        }
    }

    /// Impulse triple owned by this node, if its kind has one.
    pub fn impulse(&self) -> Option<SphericalDeltaV> {
        match self {
            TrajectoryNode::Departure { escape_delta_v, .. }
            | TrajectoryNode::Insertion { escape_delta_v, .. } => Some(*escape_delta_v),
            TrajectoryNode::Dsm { delta_v, .. } => Some(*delta_v),
            _ => None,
        }
    }
}

impl fmt::Display for TrajectoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.body() {
            Some(body) => write!(f, "{} {}", self.kind(), body),
            None => write!(f, "{}", self.kind()),
        }
    }
}
