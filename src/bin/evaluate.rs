use std::path::PathBuf;

use clap::Parser;
use solar_mgadsm::export::{self, ReportDocument};
use solar_mgadsm::impulsive::Direction;
use solar_mgadsm::trajectory::{EngineOptions, TrajectoryEngine};
use solar_mgadsm::{Scenario, parse_design_vector};

/// Price an MGA-DSM itinerary: print the Δv of every manoeuvre for one design vector.
#[derive(Parser, Debug)]
#[command(author, version, about = "MGA-DSM trajectory evaluator")]
struct Cli {
    /// Itinerary document (TOML or YAML)
    #[arg(long)]
    itinerary: PathBuf,

    /// Body catalog: directory of TOML files, a single TOML file, or a YAML list
    #[arg(long, default_value = "configs/bodies")]
    bodies: PathBuf,

    /// Comma-separated design vector (defaults to the itinerary's own, then its nominal values)
    #[arg(long, allow_hyphen_values = true)]
    design_vector: Option<String>,

    /// Print the design-vector layout and exit
    #[arg(long, default_value_t = false)]
    layout: bool,

    /// Fly every Lambert arc retrograde (clockwise seen from +z) instead of prograde
    #[arg(long, default_value_t = false)]
    retrograde: bool,

    /// Complete revolutions allowed on each Lambert arc
    #[arg(long, default_value_t = 0)]
    revolutions: u32,

    /// Manoeuvre table CSV (use '-' for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Per-leg summary CSV (use '-' for stdout)
    #[arg(long)]
    legs_csv: Option<PathBuf>,

    /// Full JSON report (use '-' for stdout)
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut scenario = Scenario::load(&cli.itinerary, &cli.bodies)?;

    if cli.layout {
        let plan = scenario.itinerary.plan()?;
        println!("{}: {} design variables", scenario.config.name, plan.design_vector_len());
        for (index, slot) in plan.slots().iter().enumerate() {
            println!("x[{index:>2}] {slot}");
        }
        return Ok(());
    }

    if let Some(text) = &cli.design_vector {
        scenario.set_design_vector(parse_design_vector(text)?)?;
    }

    let direction = if cli.retrograde {
        Direction::Retrograde
    } else {
        Direction::Prograde
    };
    let engine = TrajectoryEngine::new().with_options(EngineOptions {
        direction,
        max_revolutions: cli.revolutions,
    });
    let report = scenario.evaluate(&engine)?;

    println!("Itinerary: {}", scenario.config.name);
    if let Some(description) = &scenario.config.description {
        println!("  {description}");
    }
    println!(
        "{:>3}  {:<22} {:>4}  {:>14}  {:>12}",
        "#", "manoeuvre", "leg", "epoch [MJD2000]", "dv [km/s]"
    );
    for (index, maneuver) in report.maneuvers.iter().enumerate() {
        println!(
            "{:>3}  {:<22} {:>4}  {:>14.4}  {:>12.6}",
            index,
            maneuver.kind.to_string(),
            maneuver.leg,
            maneuver.epoch_mjd2000,
            maneuver.delta_v_km_s
        );
    }
    println!("Total dv: {:.6} km/s", report.total_delta_v());
    if !report.converged() {
        println!(
            "Warning: {} solver call(s) did not converge",
            report.diagnostics.len()
        );
    }

    if let Some(path) = &cli.csv {
        export::export_maneuvers(path, &report)?;
    }
    if let Some(path) = &cli.legs_csv {
        export::export_legs(path, &report)?;
    }
    if let Some(path) = &cli.json {
        let document =
            ReportDocument::new(&scenario.config.name, &scenario.design_vector, &report);
        export::export_report(path, &document)?;
    }
    Ok(())
}
