//! Multiple gravity assist trajectories with deep-space manoeuvres.
//!
//! The workspace crates are re-exported under short names. [`Scenario`] wires a body
//! catalog and an itinerary file into something the engine can price, which is what the
//! `evaluate` binary does.

use std::path::Path;

use anyhow::Context;

pub use solar_config as config;
pub use solar_core;
pub use solar_ephem as ephem;
pub use solar_export as export;
pub use solar_impulsive as impulsive;
pub use solar_orbits as orbits;
pub use solar_trajectory as trajectory;

use solar_config::ItineraryConfig;
use solar_ephem::{AnalyticEphemeris, CachedEphemeris};
use solar_trajectory::{Itinerary, TrajectoryEngine, TrajectoryReport};

/// A loaded itinerary, its design vector and the ephemeris to evaluate it against.
#[derive(Debug)]
pub struct Scenario {
    pub config: ItineraryConfig,
    pub itinerary: Itinerary,
    pub design_vector: Vec<f64>,
    pub ephemeris: CachedEphemeris<AnalyticEphemeris>,
}

impl Scenario {
    /// Load an itinerary document and a body catalog (file or directory).
    pub fn load(itinerary_path: &Path, bodies_path: &Path) -> anyhow::Result<Self> {
        let bodies = solar_config::load_bodies(bodies_path)
            .with_context(|| format!("loading bodies from {}", bodies_path.display()))?;
        let ephemeris = AnalyticEphemeris::from_body_configs(&bodies)
            .context("building analytic ephemeris")?;
        let config = solar_config::load_itinerary(itinerary_path)
            .with_context(|| format!("loading itinerary {}", itinerary_path.display()))?;
        let itinerary = solar_trajectory::itinerary_from_config(&config)
            .with_context(|| format!("itinerary `{}`", config.name))?;
        let design_vector = solar_trajectory::design_vector_from_config(&config, &itinerary)?;
        log::info!(
            "loaded itinerary `{}`: {} nodes, {} legs, {} design variables",
            config.name,
            itinerary.len(),
            itinerary.legs()?.len(),
            design_vector.len()
        );
        Ok(Self {
            config,
            itinerary,
            design_vector,
            ephemeris: CachedEphemeris::new(ephemeris),
        })
    }

    /// Replace the design vector after checking it against the itinerary layout.
    pub fn set_design_vector(&mut self, design_vector: Vec<f64>) -> anyhow::Result<()> {
        self.itinerary.validate_design_vector(&design_vector)?;
        self.design_vector = design_vector;
        Ok(())
    }

    pub fn evaluate(&self, engine: &TrajectoryEngine) -> anyhow::Result<TrajectoryReport> {
        let report = engine
            .evaluate_report(&self.itinerary, &self.ephemeris, &self.design_vector)
            .with_context(|| format!("evaluating `{}`", self.config.name))?;
        if !report.converged() {
            log::warn!(
                "`{}`: {} solver call(s) hit their iteration cap",
                self.config.name,
                report.diagnostics.len()
            );
        }
        Ok(report)
    }
}

/// Parse a comma-separated list of numbers such as `3224,226,1400,5.0,0.6,248`.
pub fn parse_design_vector(text: &str) -> anyhow::Result<Vec<f64>> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            part.parse::<f64>()
                .with_context(|| format!("design vector entry {i} (`{part}`) is not a number"))
        })
        .collect()
}
