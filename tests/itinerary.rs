use solar_mgadsm::orbits::OrbitalElements;
use solar_mgadsm::trajectory::{
    Itinerary, ItineraryError, NodeKind, Slot, SlotKind, TrajectoryNode,
};

fn capture_orbit() -> OrbitalElements {
    OrbitalElements {
        semi_major_axis: 30_000.0,
        eccentricity: 0.5,
        true_anomaly: 0.0,
        inclination: 0.0,
        argument_of_periapsis: 0.0,
        ascending_node: 0.0,
    }
}

/// Earth, DSM, Venus, Venus, DSM, DSM, Earth, Jupiter (captured, then leaves again), Saturn.
fn grand_tour() -> Itinerary {
    Itinerary::try_new(vec![
        TrajectoryNode::departure("Earth", 0.0),
        TrajectoryNode::dsm(0.3),
        TrajectoryNode::flyby("Venus", 180.0, 600.0, 0.1),
        TrajectoryNode::flyby("Venus", 420.0, 300.0, 0.2),
        TrajectoryNode::dsm(0.2),
        TrajectoryNode::dsm(0.7),
        TrajectoryNode::flyby("Earth", 60.0, 800.0, 0.0),
        TrajectoryNode::insertion("Jupiter", capture_orbit(), 900.0, 30.0),
        TrajectoryNode::dsm(0.5),
        TrajectoryNode::rendezvous("Saturn", 1_200.0),
    ])
    .expect("valid tour")
}

#[test]
fn legs_follow_arrival_nodes() {
    let tour = grand_tour();
    let legs = tour.legs().unwrap();
    let route: Vec<(&str, &str, usize)> = legs
        .iter()
        .map(|leg| (leg.origin.as_str(), leg.destination.as_str(), leg.dsm_count()))
        .collect();
    assert_eq!(
        route,
        vec![
            ("Earth", "Venus", 1),
            ("Venus", "Venus", 0),
            ("Venus", "Earth", 2),
            ("Earth", "Jupiter", 0),
            ("Jupiter", "Saturn", 1),
        ]
    );
    assert_eq!(legs[4].start, NodeKind::Insertion);
    assert_eq!(legs[4].end, NodeKind::Rendezvous);
}

#[test]
fn layout_counts_every_slot() {
    let tour = grand_tour();
    // departure 1+3, dsm 1, flyby 3, flyby 3, dsm 1, dsm 1+3, flyby 3,
    // insertion 2+3, dsm 1, rendezvous 1
    assert_eq!(tour.design_vector_len().unwrap(), 26);

    let plan = tour.plan().unwrap();
    let kinds: Vec<SlotKind> = plan.slots().iter().map(|s| s.kind).collect();
    assert_eq!(kinds[0], SlotKind::Epoch);
    assert_eq!(
        &kinds[1..5],
        &[
            SlotKind::DeltaVMagnitude,
            SlotKind::DeltaVPolar,
            SlotKind::DeltaVAzimuth,
            SlotKind::Alpha
        ]
    );
    // The impulse after the second DSM of leg 2 is owned by the first DSM (node 4).
    assert_eq!(
        plan.slots()[12..16].to_vec(),
        vec![
            Slot { node: 5, kind: SlotKind::Alpha },
            Slot { node: 4, kind: SlotKind::DeltaVMagnitude },
            Slot { node: 4, kind: SlotKind::DeltaVPolar },
            Slot { node: 4, kind: SlotKind::DeltaVAzimuth },
        ]
    );
    assert_eq!(kinds.last(), Some(&SlotKind::TimeOfFlight));
}

#[test]
fn nominal_vector_carries_node_values() {
    let tour = grand_tour();
    let x = tour.nominal_design_vector().unwrap();
    assert_eq!(x.len(), 26);
    assert_eq!(x[4], 0.3);
    assert_eq!(&x[5..8], &[180.0, 600.0, 0.1]);
    assert_eq!(x[25], 1_200.0);
    tour.validate_design_vector(&x).unwrap();
}

#[test]
fn out_of_range_values_name_their_slot() {
    let tour = grand_tour();
    let mut x = tour.nominal_design_vector().unwrap();
    x[4] = 1.5;
    let err = tour.validate_design_vector(&x).unwrap_err();
    assert!(matches!(
        err,
        ItineraryError::InvalidDesignValue {
            index: 4,
            slot: Slot { node: 1, kind: SlotKind::Alpha },
            ..
        }
    ));
    assert!(err.to_string().contains("DSM time fraction"), "{err}");

    x[4] = 0.3;
    x[25] = f64::NAN;
    assert!(tour.validate_design_vector(&x).is_err());
}

#[test]
fn terminal_flyby_is_allowed() {
    let itinerary = Itinerary::try_new(vec![
        TrajectoryNode::departure("Earth", 0.0),
        TrajectoryNode::flyby("Venus", 100.0, 500.0, 0.0),
    ])
    .unwrap();
    assert_eq!(itinerary.design_vector_len().unwrap(), 4);
}

#[test]
fn structural_rules() {
    let cases = vec![
        (vec![], ItineraryError::Empty),
        (
            vec![TrajectoryNode::rendezvous("Mars", 100.0)],
            ItineraryError::FirstNodeNotDeparture(NodeKind::Rendezvous),
        ),
        (
            vec![TrajectoryNode::departure("Earth", 0.0)],
            ItineraryError::InvalidTerminalNode(NodeKind::Departure),
        ),
        (
            vec![
                TrajectoryNode::departure("Earth", 0.0),
                TrajectoryNode::dsm(0.5),
            ],
            ItineraryError::InvalidTerminalNode(NodeKind::Dsm),
        ),
        (
            vec![
                TrajectoryNode::departure("Earth", 0.0),
                TrajectoryNode::departure("Mars", 10.0),
                TrajectoryNode::rendezvous("Mars", 100.0),
            ],
            ItineraryError::MisplacedDeparture(1),
        ),
    ];
    for (nodes, expected) in cases {
        assert_eq!(Itinerary::try_new(nodes).unwrap_err(), expected);
    }
}
