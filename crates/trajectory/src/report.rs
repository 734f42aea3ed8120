//! Evaluation results: labelled manoeuvres, per-leg summaries and solver diagnostics.

use std::fmt;

use serde::Serialize;

/// What a recorded Δv pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverKind {
    /// Leaving the departure body, either as a launch impulse or as the Lambert mismatch.
    Launch,
    /// Leaving an insertion orbit.
    Escape,
    DeepSpace,
    /// Velocity correction right after a flyby.
    FlybyCorrection,
    /// Leaving a body after an intermediate rendezvous.
    RendezvousDeparture,
    Arrival,
    Insertion,
}

impl fmt::Display for ManeuverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManeuverKind::Launch => "launch",
            ManeuverKind::Escape => "escape",
            ManeuverKind::DeepSpace => "deep_space",
            ManeuverKind::FlybyCorrection => "flyby_correction",
            ManeuverKind::RendezvousDeparture => "rendezvous_departure",
            ManeuverKind::Arrival => "arrival",
            ManeuverKind::Insertion => "insertion",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Maneuver {
    pub kind: ManeuverKind,
    pub leg: usize,
    pub epoch_mjd2000: f64,
    pub delta_v_km_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegSummary {
    pub index: usize,
    pub origin: String,
    pub destination: String,
    pub departure_epoch_mjd2000: f64,
    pub arrival_epoch_mjd2000: f64,
    pub dsm_count: usize,
    /// Hyperbolic excess speed relative to the destination body on arrival.
    pub arrival_vinf_km_s: f64,
    pub transfer_semi_major_axis_km: f64,
    pub lambert_iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSource {
    Propagator,
    Lambert,
}

/// A solver that hit its iteration cap; its last estimate was used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub leg: usize,
    pub source: DiagnosticSource,
    pub iterations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrajectoryReport {
    pub maneuvers: Vec<Maneuver>,
    pub legs: Vec<LegSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TrajectoryReport {
    /// Δv magnitudes in the order they were recorded.
    pub fn delta_vs(&self) -> Vec<f64> {
        self.maneuvers.iter().map(|m| m.delta_v_km_s).collect()
    }

    pub fn total_delta_v(&self) -> f64 {
        self.maneuvers.iter().map(|m| m.delta_v_km_s).sum()
    }

    /// True when every solver call converged.
    pub fn converged(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub(crate) fn record(&mut self, kind: ManeuverKind, leg: usize, epoch_mjd2000: f64, delta_v_km_s: f64) {
        self.maneuvers.push(Maneuver {
            kind,
            leg,
            epoch_mjd2000,
            delta_v_km_s,
        });
    }
}
