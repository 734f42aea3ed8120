//! Conversions from configuration records to runtime itinerary types.

use solar_config::{
    ItineraryConfig, NodeConfig, SphericalDeltaVConfig, TargetOrbitConfig,
};
use solar_orbits::OrbitalElements;

use crate::error::TrajectoryError;
use crate::itinerary::Itinerary;
use crate::node::{SphericalDeltaV, TrajectoryNode};

fn impulse(config: Option<&SphericalDeltaVConfig>) -> SphericalDeltaV {
    config
        .map(|dv| SphericalDeltaV::new(dv.magnitude_km_s, dv.polar, dv.azimuth))
        .unwrap_or_default()
}

fn target_orbit(config: &TargetOrbitConfig) -> OrbitalElements {
    OrbitalElements {
        semi_major_axis: config.semi_major_axis_km,
        eccentricity: config.eccentricity,
        true_anomaly: config.true_anomaly_rad,
        inclination: config.inclination_rad,
        argument_of_periapsis: config.argument_of_periapsis_rad,
        ascending_node: config.ascending_node_rad,
    }
}

/// Convert one configured node, resolving calendar epochs to MJD2000.
pub fn node_from_config(config: &NodeConfig) -> Result<TrajectoryNode, TrajectoryError> {
    let node = match config {
        NodeConfig::Departure {
            body,
            epoch,
            escape_delta_v,
        } => TrajectoryNode::Departure {
            body: body.clone(),
            epoch_mjd2000: epoch.to_mjd2000()?,
            escape_delta_v: impulse(escape_delta_v.as_ref()),
        },
        NodeConfig::Dsm { alpha, delta_v } => TrajectoryNode::Dsm {
            alpha: *alpha,
            delta_v: impulse(delta_v.as_ref()),
        },
        NodeConfig::Flyby {
            body,
            tof_days,
            altitude_km,
            b_plane_angle_rad,
        } => TrajectoryNode::flyby(body.clone(), *tof_days, *altitude_km, *b_plane_angle_rad),
        NodeConfig::Rendezvous { body, tof_days } => {
            TrajectoryNode::rendezvous(body.clone(), *tof_days)
        }
        NodeConfig::Insertion {
            body,
            target_orbit: orbit,
            tof_days,
            time_in_orbit_days,
            escape_delta_v,
        } => TrajectoryNode::Insertion {
            body: body.clone(),
            target_orbit: target_orbit(orbit),
            tof_days: *tof_days,
            time_in_orbit_days: *time_in_orbit_days,
            escape_delta_v: impulse(escape_delta_v.as_ref()),
        },
    };
    Ok(node)
}

/// Build and structurally check an itinerary from its configuration.
pub fn itinerary_from_config(config: &ItineraryConfig) -> Result<Itinerary, TrajectoryError> {
    let nodes = config
        .nodes
        .iter()
        .map(node_from_config)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Itinerary::try_new(nodes)?)
}

/// The configured design vector if present, otherwise the nodes' nominal values.
pub fn design_vector_from_config(
    config: &ItineraryConfig,
    itinerary: &Itinerary,
) -> Result<Vec<f64>, TrajectoryError> {
    match &config.design_vector {
        Some(vector) => {
            itinerary.validate_design_vector(vector)?;
            Ok(vector.clone())
        }
        None => Ok(itinerary.nominal_design_vector()?),
    }
}
