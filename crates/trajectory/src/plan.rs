//! Derived per-leg computation plan and the positional layout of the design vector.
//!
//! [`build`] is a pure transform of the node sequence. Slots are appended node by node:
//!
//! | node | slots |
//! |------|-------|
//! | departure | epoch, then launch Δv (magnitude, polar, azimuth) if a DSM follows |
//! | first DSM of a leg | α |
//! | later DSM of a leg | α, then the impulse fired at the preceding DSM |
//! | flyby | time of flight, periapsis altitude, B-plane angle |
//! | rendezvous | time of flight |
//! | insertion | time of flight, time in orbit, then escape Δv if a DSM follows |

use std::fmt;

use serde::Serialize;

use crate::error::ItineraryError;
use crate::node::{NodeKind, TrajectoryNode};

/// Meaning of one design-vector entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Epoch,
    TimeOfFlight,
    Alpha,
    DeltaVMagnitude,
    DeltaVPolar,
    DeltaVAzimuth,
    PeriapsisAltitude,
    BPlaneAngle,
    TimeInOrbit,
}

impl SlotKind {
    pub fn unit(self) -> &'static str {
        match self {
            SlotKind::Epoch => "MJD2000",
            SlotKind::TimeOfFlight | SlotKind::TimeInOrbit => "days",
            SlotKind::Alpha | SlotKind::DeltaVPolar | SlotKind::DeltaVAzimuth => "-",
            SlotKind::DeltaVMagnitude => "km/s",
            SlotKind::PeriapsisAltitude => "km",
            SlotKind::BPlaneAngle => "rad",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SlotKind::Epoch => "departure epoch",
            SlotKind::TimeOfFlight => "time of flight",
            SlotKind::Alpha => "DSM time fraction",
            SlotKind::DeltaVMagnitude => "impulse magnitude",
            SlotKind::DeltaVPolar => "impulse polar parameter",
            SlotKind::DeltaVAzimuth => "impulse azimuth parameter",
            SlotKind::PeriapsisAltitude => "flyby periapsis altitude",
            SlotKind::BPlaneAngle => "B-plane inclination angle",
            SlotKind::TimeInOrbit => "time in orbit",
        }
    }

    /// Whether `value` is admissible for this slot.
    pub fn accepts(self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            SlotKind::Alpha | SlotKind::DeltaVPolar | SlotKind::DeltaVAzimuth => {
                (0.0..=1.0).contains(&value)
            }
            SlotKind::TimeOfFlight => value > 0.0,
            SlotKind::TimeInOrbit | SlotKind::DeltaVMagnitude => value >= 0.0,
            SlotKind::Epoch | SlotKind::PeriapsisAltitude | SlotKind::BPlaneAngle => true,
        }
    }
}

/// One design-vector entry: what it means and which node supplies its nominal value.
///
/// For the impulse of a later DSM, `node` is the preceding DSM that fires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Slot {
    pub node: usize,
    pub kind: SlotKind,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node {}: {} [{}]",
            self.node,
            self.kind.description(),
            self.kind.unit()
        )
    }
}

/// Design-vector positions used by one DSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DsmSlots {
    pub node: usize,
    pub alpha: usize,
    /// First of three entries holding the impulse applied before this DSM's coast.
    pub impulse: Option<usize>,
}

/// One leg: from an anchor node (departure or arrival) to the next arrival node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryLeg {
    pub index: usize,
    pub start_node: usize,
    pub end_node: usize,
    pub start: NodeKind,
    pub end: NodeKind,
    pub origin: String,
    pub destination: String,
    pub tof_slot: usize,
    /// First of three entries holding the launch or escape impulse.
    pub start_impulse: Option<usize>,
    pub dsms: Vec<DsmSlots>,
    /// Periapsis altitude and B-plane angle positions of a flyby-terminated leg.
    pub flyby_slots: Option<(usize, usize)>,
    pub time_in_orbit_slot: Option<usize>,
}

impl TrajectoryLeg {
    pub fn dsm_count(&self) -> usize {
        self.dsms.len()
    }

    pub fn starts_with_departure(&self) -> bool {
        self.start == NodeKind::Departure
    }

    pub fn ends_with_flyby(&self) -> bool {
        self.end == NodeKind::Flyby
    }

    pub fn ends_with_rendezvous(&self) -> bool {
        self.end == NodeKind::Rendezvous
    }

    pub fn ends_with_insertion(&self) -> bool {
        self.end == NodeKind::Insertion
    }
}

/// Legs plus the slot table, derived from a node sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItineraryPlan {
    legs: Vec<TrajectoryLeg>,
    slots: Vec<Slot>,
}

impl ItineraryPlan {
    pub fn legs(&self) -> &[TrajectoryLeg] {
        &self.legs
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn design_vector_len(&self) -> usize {
        self.slots.len()
    }

    /// Check length and per-slot ranges of a design vector.
    pub fn validate(&self, design_vector: &[f64]) -> Result<(), ItineraryError> {
        if design_vector.len() != self.slots.len() {
            return Err(ItineraryError::DesignVectorLength {
                expected: self.slots.len(),
                found: design_vector.len(),
            });
        }
        for (index, (slot, &value)) in self.slots.iter().zip(design_vector).enumerate() {
            if !slot.kind.accepts(value) {
                return Err(ItineraryError::InvalidDesignValue {
                    index,
                    slot: *slot,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Design vector holding the nodes' own values.
    pub fn nominal_design_vector(&self, nodes: &[TrajectoryNode]) -> Result<Vec<f64>, ItineraryError> {
        self.slots
            .iter()
            .map(|slot| {
                nodes
                    .get(slot.node)
                    .and_then(|node| nominal_value(node, slot.kind))
                    .ok_or_else(|| ItineraryError::InvalidNode {
                        index: slot.node,
                        reason: format!("no value for {}", slot.kind.description()),
                    })
            })
            .collect()
    }
}

fn nominal_value(node: &TrajectoryNode, kind: SlotKind) -> Option<f64> {
    match (node, kind) {
        (TrajectoryNode::Departure { epoch_mjd2000, .. }, SlotKind::Epoch) => Some(*epoch_mjd2000),
        (TrajectoryNode::Dsm { alpha, .. }, SlotKind::Alpha) => Some(*alpha),
        (_, SlotKind::TimeOfFlight) => node.tof_days(),
        (_, SlotKind::DeltaVMagnitude) => node.impulse().map(|dv| dv.magnitude_km_s),
        (_, SlotKind::DeltaVPolar) => node.impulse().map(|dv| dv.polar),
        (_, SlotKind::DeltaVAzimuth) => node.impulse().map(|dv| dv.azimuth),
        (TrajectoryNode::Flyby { altitude_km, .. }, SlotKind::PeriapsisAltitude) => {
            Some(*altitude_km)
        }
        (TrajectoryNode::Flyby { b_plane_angle_rad, .. }, SlotKind::BPlaneAngle) => {
            Some(*b_plane_angle_rad)
        }
        (
            TrajectoryNode::Insertion {
                time_in_orbit_days, ..
            },
            SlotKind::TimeInOrbit,
        ) => Some(*time_in_orbit_days),
        _ => None,
    }
}

/// Append an impulse triple owned by `owner`; returns the position of its magnitude.
fn push_triple(push: &mut impl FnMut(usize, SlotKind) -> usize, owner: usize) -> usize {
    let first = push(owner, SlotKind::DeltaVMagnitude);
    push(owner, SlotKind::DeltaVPolar);
    push(owner, SlotKind::DeltaVAzimuth);
    first
}

struct OpenLeg {
    start_node: usize,
    start: NodeKind,
    origin: String,
    start_impulse: Option<usize>,
    dsms: Vec<DsmSlots>,
}

/// Check the node sequence and derive its legs and slot layout.
pub fn build(nodes: &[TrajectoryNode]) -> Result<ItineraryPlan, ItineraryError> {
    check_structure(nodes)?;

    let mut slots: Vec<Slot> = Vec::new();
    let mut push = |node: usize, kind: SlotKind| {
        slots.push(Slot { node, kind });
        slots.len() - 1
    };
    let mut legs = Vec::new();
    let mut open: Option<OpenLeg> = None;

    for (i, node) in nodes.iter().enumerate() {
        let next_is_dsm = nodes.get(i + 1).is_some_and(|n| n.kind() == NodeKind::Dsm);
        match node {
            TrajectoryNode::Departure { body, .. } => {
                push(i, SlotKind::Epoch);
                let start_impulse = next_is_dsm.then(|| push_triple(&mut push, i));
                open = Some(OpenLeg {
                    start_node: i,
                    start: NodeKind::Departure,
                    origin: body.clone(),
                    start_impulse,
                    dsms: Vec::new(),
                });
            }
            TrajectoryNode::Dsm { .. } => {
                let leg = open.as_mut().ok_or_else(|| ItineraryError::InvalidNode {
                    index: i,
                    reason: "DSM outside of a leg".into(),
                })?;
                let alpha = push(i, SlotKind::Alpha);
                let impulse = leg
                    .dsms
                    .last()
                    .map(|previous| previous.node)
                    .map(|owner| push_triple(&mut push, owner));
                leg.dsms.push(DsmSlots {
                    node: i,
                    alpha,
                    impulse,
                });
            }
            TrajectoryNode::Flyby { body, .. }
            | TrajectoryNode::Rendezvous { body, .. }
            | TrajectoryNode::Insertion { body, .. } => {
                let kind = node.kind();
                let tof_slot = push(i, SlotKind::TimeOfFlight);
                let flyby_slots = (kind == NodeKind::Flyby).then(|| {
                    (
                        push(i, SlotKind::PeriapsisAltitude),
                        push(i, SlotKind::BPlaneAngle),
                    )
                });
                let time_in_orbit_slot =
                    (kind == NodeKind::Insertion).then(|| push(i, SlotKind::TimeInOrbit));
                let leg = open.take().ok_or_else(|| ItineraryError::InvalidNode {
                    index: i,
                    reason: "arrival without a preceding departure".into(),
                })?;
                legs.push(TrajectoryLeg {
                    index: legs.len(),
                    start_node: leg.start_node,
                    end_node: i,
                    start: leg.start,
                    end: kind,
                    origin: leg.origin,
                    destination: body.clone(),
                    tof_slot,
                    start_impulse: leg.start_impulse,
                    dsms: leg.dsms,
                    flyby_slots,
                    time_in_orbit_slot,
                });
                if i + 1 < nodes.len() {
                    let start_impulse = (kind == NodeKind::Insertion && next_is_dsm)
                        .then(|| push_triple(&mut push, i));
                    open = Some(OpenLeg {
                        start_node: i,
                        start: kind,
                        origin: body.clone(),
                        start_impulse,
                        dsms: Vec::new(),
                    });
                }
            }
        }
    }

    Ok(ItineraryPlan { legs, slots })
}

fn check_structure(nodes: &[TrajectoryNode]) -> Result<(), ItineraryError> {
    let first = nodes.first().ok_or(ItineraryError::Empty)?;
    if first.kind() != NodeKind::Departure {
        return Err(ItineraryError::FirstNodeNotDeparture(first.kind()));
    }
    if let Some(index) = nodes
        .iter()
        .skip(1)
        .position(|n| n.kind() == NodeKind::Departure)
    {
        return Err(ItineraryError::MisplacedDeparture(index + 1));
    }
    if let Some(last) = nodes.last() {
        if !last.kind().is_arrival() {
            return Err(ItineraryError::InvalidTerminalNode(last.kind()));
        }
    }
    for (index, node) in nodes.iter().enumerate() {
        if node.body().is_some_and(|b| b.trim().is_empty()) {
            return Err(ItineraryError::InvalidNode {
                index,
                reason: "empty body name".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evm() -> Vec<TrajectoryNode> {
        vec![
            TrajectoryNode::departure("Earth", 2_000.0),
            TrajectoryNode::flyby("Venus", 150.0, 800.0, 0.2),
            TrajectoryNode::dsm(0.4),
            TrajectoryNode::rendezvous("Mars", 300.0),
        ]
    }

    #[test]
    fn earth_venus_mars_layout() {
        let plan = build(&evm()).unwrap();
        let kinds: Vec<SlotKind> = plan.slots().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SlotKind::Epoch,
                SlotKind::TimeOfFlight,
                SlotKind::PeriapsisAltitude,
                SlotKind::BPlaneAngle,
                SlotKind::Alpha,
                SlotKind::TimeOfFlight,
            ]
        );
        assert_eq!(plan.legs().len(), 2);
        let second = &plan.legs()[1];
        assert_eq!(second.start, NodeKind::Flyby);
        assert_eq!(second.origin, "Venus");
        assert_eq!(second.destination, "Mars");
        assert_eq!(second.tof_slot, 5);
        assert_eq!(second.dsm_count(), 1);
        assert_eq!(second.dsms[0].alpha, 4);
        assert_eq!(plan.legs()[0].flyby_slots, Some((2, 3)));
    }

    #[test]
    fn launch_and_chained_dsm_impulses_get_triples() {
        let nodes = vec![
            TrajectoryNode::departure("Earth", 0.0),
            TrajectoryNode::dsm(0.2),
            TrajectoryNode::dsm(0.5),
            TrajectoryNode::rendezvous("Mars", 250.0),
        ];
        let plan = build(&nodes).unwrap();
        assert_eq!(plan.design_vector_len(), 1 + 3 + 1 + 1 + 3 + 1);
        let leg = &plan.legs()[0];
        assert_eq!(leg.start_impulse, Some(1));
        assert_eq!(leg.dsms[0].impulse, None);
        assert_eq!(leg.dsms[1].alpha, 5);
        assert_eq!(leg.dsms[1].impulse, Some(6));
        // the impulse slot belongs to the DSM that fires it
        assert_eq!(plan.slots()[6].node, 1);
    }

    #[test]
    fn insertion_escape_triple_follows_time_in_orbit() {
        let orbit = solar_orbits::OrbitalElements {
            semi_major_axis: 20_000.0,
            eccentricity: 0.5,
            true_anomaly: 0.0,
            inclination: 0.0,
            argument_of_periapsis: 0.0,
            ascending_node: 0.0,
        };
        let nodes = vec![
            TrajectoryNode::departure("Earth", 0.0),
            TrajectoryNode::insertion("Mars", orbit, 250.0, 30.0),
            TrajectoryNode::dsm(0.5),
            TrajectoryNode::rendezvous("Earth", 250.0),
        ];
        let plan = build(&nodes).unwrap();
        let kinds: Vec<SlotKind> = plan.slots().iter().map(|s| s.kind).collect();
        assert_eq!(&kinds[1..6], &[
            SlotKind::TimeOfFlight,
            SlotKind::TimeInOrbit,
            SlotKind::DeltaVMagnitude,
            SlotKind::DeltaVPolar,
            SlotKind::DeltaVAzimuth,
        ]);
        assert_eq!(plan.legs()[1].start, NodeKind::Insertion);
        assert_eq!(plan.legs()[1].start_impulse, Some(3));
        assert_eq!(plan.legs()[0].time_in_orbit_slot, Some(2));
    }

    #[test]
    fn structural_errors() {
        assert_eq!(build(&[]), Err(ItineraryError::Empty));
        let mut nodes = evm();
        nodes.swap(0, 1);
        assert_eq!(
            build(&nodes),
            Err(ItineraryError::FirstNodeNotDeparture(NodeKind::Flyby))
        );
        let mut nodes = evm();
        nodes.push(TrajectoryNode::dsm(0.5));
        assert_eq!(
            build(&nodes),
            Err(ItineraryError::InvalidTerminalNode(NodeKind::Dsm))
        );
        let mut nodes = evm();
        nodes.insert(2, TrajectoryNode::departure("Venus", 0.0));
        assert_eq!(build(&nodes), Err(ItineraryError::MisplacedDeparture(2)));
        let nodes = vec![
            TrajectoryNode::departure("Earth", 0.0),
            TrajectoryNode::rendezvous("  ", 100.0),
        ];
        assert!(matches!(build(&nodes), Err(ItineraryError::InvalidNode { index: 1, .. })));
    }

    #[test]
    fn design_values_are_range_checked() {
        let plan = build(&evm()).unwrap();
        assert_eq!(
            plan.validate(&[0.0; 5]),
            Err(ItineraryError::DesignVectorLength {
                expected: 6,
                found: 5
            })
        );
        let good = [2_000.0, 150.0, 800.0, 0.2, 0.4, 300.0];
        assert!(plan.validate(&good).is_ok());
        let mut bad = good;
        bad[4] = 1.5;
        assert!(matches!(
            plan.validate(&bad),
            Err(ItineraryError::InvalidDesignValue { index: 4, .. })
        ));
        let mut bad = good;
        bad[1] = 0.0;
        assert!(plan.validate(&bad).is_err());
        let mut bad = good;
        bad[0] = f64::NAN;
        assert!(plan.validate(&bad).is_err());
    }

    #[test]
    fn nominal_vector_reads_node_values() {
        let nodes = evm();
        let plan = build(&nodes).unwrap();
        assert_eq!(
            plan.nominal_design_vector(&nodes).unwrap(),
            vec![2_000.0, 150.0, 800.0, 0.2, 0.4, 300.0]
        );
    }

    #[test]
    fn slot_display_names_unit() {
        let slot = Slot {
            node: 1,
            kind: SlotKind::PeriapsisAltitude,
        };
        assert_eq!(slot.to_string(), "node 1: flyby periapsis altitude [km]");
    }
}
