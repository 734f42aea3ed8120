//! Multi-leg MGA-DSM evaluator.
//!
//! Walks the legs of an itinerary, threading the spacecraft epoch and state from one leg
//! to the next as an explicit accumulator. Each leg optionally applies a launch or escape
//! impulse, coasts through its DSMs, closes on the destination with a Lambert arc, then
//! resolves the arrival (flyby, rendezvous or insertion).

use log::debug;
use solar_core::time::{days_to_seconds, seconds_to_days};
use solar_core::vector::{self, Vector3};
use solar_ephem::Ephemeris;
use solar_impulsive::{
    Direction, FlybyBody, FlybyModel, IzzoLambert, LambertSolver, UnpoweredFlyby,
    spherical_delta_v,
};
use solar_orbits::{Propagator, StateVector, UniversalPropagator, insertion_delta_v};

use crate::error::{ItineraryError, TrajectoryError};
use crate::itinerary::Itinerary;
use crate::node::{NodeKind, TrajectoryNode};
use crate::plan::{SlotKind, TrajectoryLeg};
use crate::report::{
    Diagnostic, DiagnosticSource, LegSummary, ManeuverKind, TrajectoryReport,
};

/// Lambert settings applied to every leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    pub direction: Direction,
    pub max_revolutions: u32,
}

/// Spacecraft epoch and state at the start of a leg.
#[derive(Debug, Clone, Copy)]
struct LegStart {
    epoch_mjd2000: f64,
    state: StateVector,
}

/// Owns one propagator, one Lambert solver and one flyby model.
///
/// Construction is cheap; use one engine per worker thread for concurrent sweeps.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryEngine<P = UniversalPropagator, L = IzzoLambert, F = UnpoweredFlyby> {
    propagator: P,
    lambert: L,
    flyby: F,
    options: EngineOptions,
}

impl TrajectoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P, L, F> TrajectoryEngine<P, L, F>
where
    P: Propagator,
    L: LambertSolver,
    F: FlybyModel,
{
    pub fn with_components(propagator: P, lambert: L, flyby: F) -> Self {
        Self {
            propagator,
            lambert,
            flyby,
            options: EngineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Ordered Δv magnitudes (km/s) for `design_vector`. The caller decides how to combine them.
    pub fn evaluate<E>(
        &self,
        itinerary: &Itinerary,
        ephemeris: &E,
        design_vector: &[f64],
    ) -> Result<Vec<f64>, TrajectoryError>
    where
        E: Ephemeris + ?Sized,
    {
        self.evaluate_report(itinerary, ephemeris, design_vector)
            .map(|report| report.delta_vs())
    }

    /// Full evaluation with labelled manoeuvres, leg summaries and diagnostics.
    pub fn evaluate_report<E>(
        &self,
        itinerary: &Itinerary,
        ephemeris: &E,
        design_vector: &[f64],
    ) -> Result<TrajectoryReport, TrajectoryError>
    where
        E: Ephemeris + ?Sized,
    {
        let plan = itinerary.plan()?;
        plan.validate(design_vector)?;
        let legs = plan.legs();
        let nodes = itinerary.nodes();

        let first = legs.first().ok_or(ItineraryError::Empty)?;
        let epoch_slot = plan
            .slots()
            .iter()
            .position(|slot| slot.kind == SlotKind::Epoch)
            .ok_or(ItineraryError::Empty)?;
        let departure_epoch = design_vector[epoch_slot];
        let mut start = LegStart {
            epoch_mjd2000: departure_epoch,
            state: ephemeris.state_vector(&first.origin, departure_epoch)?,
        };

        let mut report = TrajectoryReport::default();
        for leg in legs {
            let is_final = leg.index + 1 == legs.len();
            let next = self.evaluate_leg(
                leg,
                nodes,
                ephemeris,
                design_vector,
                start,
                is_final,
                &mut report,
            )?;
            match next {
                Some(next) => start = next,
                None => break,
            }
        }
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn evaluate_leg<E>(
        &self,
        leg: &TrajectoryLeg,
        nodes: &[TrajectoryNode],
        ephemeris: &E,
        x: &[f64],
        start: LegStart,
        is_final: bool,
        report: &mut TrajectoryReport,
    ) -> Result<Option<LegStart>, TrajectoryError>
    where
        E: Ephemeris + ?Sized,
    {
        let tof_days = x[leg.tof_slot];
        let tof_s = days_to_seconds(tof_days);
        let arrival_epoch = start.epoch_mjd2000 + tof_days;
        let target = ephemeris.state_vector(&leg.destination, arrival_epoch)?;
        let mu = ephemeris.central_body_mu(&leg.origin)?;
        debug!(
            "leg {}: {} -> {} departing {:.4} MJD2000, tof {:.4} d, {} DSM(s)",
            leg.index,
            leg.origin,
            leg.destination,
            start.epoch_mjd2000,
            tof_days,
            leg.dsm_count()
        );

        let mut position = start.state.position_km;
        let mut velocity = start.state.velocity_km_s;
        let mut epoch = start.epoch_mjd2000;
        let mut elapsed_s = 0.0;

        if let Some(slot) = leg.start_impulse {
            let dv = impulse_at(x, slot);
            velocity = vector::add(&velocity, &dv);
            report.record(start_kind(leg.start), leg.index, epoch, vector::norm(&dv));
        }

        for dsm in &leg.dsms {
            if let Some(slot) = dsm.impulse {
                let dv = impulse_at(x, slot);
                velocity = vector::add(&velocity, &dv);
                report.record(ManeuverKind::DeepSpace, leg.index, epoch, vector::norm(&dv));
            }
            let coast_s = x[dsm.alpha] * (tof_s - elapsed_s);
            let coasted = self.propagator.propagate_state(
                &StateVector::new(position, velocity),
                mu,
                coast_s,
            )?;
            if !coasted.converged {
                report.diagnostics.push(Diagnostic {
                    leg: leg.index,
                    source: DiagnosticSource::Propagator,
                    iterations: coasted.iterations,
                });
            }
            position = coasted.value.position_km;
            velocity = coasted.value.velocity_km_s;
            elapsed_s += coast_s;
            epoch = start.epoch_mjd2000 + seconds_to_days(elapsed_s);
        }

        let arc = self.lambert.solve(
            &position,
            &target.position_km,
            tof_s - elapsed_s,
            mu,
            self.options.direction,
            self.options.max_revolutions,
        )?;
        if !arc.converged {
            report.diagnostics.push(Diagnostic {
                leg: leg.index,
                source: DiagnosticSource::Lambert,
                iterations: arc.iterations,
            });
        }
        let opening_kind = if leg.dsms.is_empty() {
            start_kind(leg.start)
        } else {
            ManeuverKind::DeepSpace
        };
        report.record(
            opening_kind,
            leg.index,
            epoch,
            vector::distance(&arc.v1_km_s, &velocity),
        );

        let arrival_vinf = vector::distance(&arc.v2_km_s, &target.velocity_km_s);
        report.legs.push(LegSummary {
            index: leg.index,
            origin: leg.origin.clone(),
            destination: leg.destination.clone(),
            departure_epoch_mjd2000: start.epoch_mjd2000,
            arrival_epoch_mjd2000: arrival_epoch,
            dsm_count: leg.dsm_count(),
            arrival_vinf_km_s: arrival_vinf,
            transfer_semi_major_axis_km: arc.semi_major_axis_km,
            lambert_iterations: arc.iterations,
        });

        let next = match leg.end {
            NodeKind::Flyby => {
                let (altitude_slot, angle_slot) = leg.flyby_slots.ok_or_else(|| missing_slot(leg))?;
                let properties = ephemeris.body_properties(&leg.destination)?;
                let body = FlybyBody {
                    velocity_km_s: target.velocity_km_s,
                    mu_km3_s2: properties.mu_km3_s2,
                    radius_km: properties.radius_km,
                };
                let outgoing =
                    self.flyby
                        .flyby(&arc.v2_km_s, &body, x[altitude_slot], x[angle_slot])?;
                Some(LegStart {
                    epoch_mjd2000: arrival_epoch,
                    state: StateVector::new(target.position_km, outgoing),
                })
            }
            NodeKind::Rendezvous => {
                if is_final {
                    report.record(ManeuverKind::Arrival, leg.index, arrival_epoch, arrival_vinf);
                }
                Some(LegStart {
                    epoch_mjd2000: arrival_epoch,
                    state: StateVector::new(target.position_km, arc.v2_km_s),
                })
            }
            NodeKind::Insertion => {
                let orbit = match &nodes[leg.end_node] {
                    TrajectoryNode::Insertion { target_orbit, .. } => *target_orbit,
                    _ => return Err(missing_slot(leg)),
                };
                let properties = ephemeris.body_properties(&leg.destination)?;
                let dv = insertion_delta_v(
                    properties.mu_km3_s2,
                    orbit.semi_major_axis,
                    orbit.eccentricity,
                    arrival_vinf,
                )?;
                report.record(ManeuverKind::Insertion, leg.index, arrival_epoch, dv);
                if is_final {
                    None
                } else {
                    let slot = leg.time_in_orbit_slot.ok_or_else(|| missing_slot(leg))?;
                    let leave_epoch = arrival_epoch + x[slot];
                    Some(LegStart {
                        epoch_mjd2000: leave_epoch,
                        state: ephemeris.state_vector(&leg.destination, leave_epoch)?,
                    })
                }
            }
            NodeKind::Departure | NodeKind::Dsm => return Err(missing_slot(leg)),
        };
        Ok(next)
    }
}

fn impulse_at(x: &[f64], slot: usize) -> Vector3 {
    spherical_delta_v(x[slot], x[slot + 1], x[slot + 2])
}

fn start_kind(start: NodeKind) -> ManeuverKind {
    match start {
        NodeKind::Insertion => ManeuverKind::Escape,
        NodeKind::Flyby => ManeuverKind::FlybyCorrection,
        NodeKind::Rendezvous => ManeuverKind::RendezvousDeparture,
        NodeKind::Departure | NodeKind::Dsm => ManeuverKind::Launch,
    }
}

fn missing_slot(leg: &TrajectoryLeg) -> TrajectoryError {
    ItineraryError::InvalidNode {
        index: leg.end_node,
        reason: format!("leg {} has no layout for its {} arrival", leg.index, leg.end),
    }
    .into()
}
