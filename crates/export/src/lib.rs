//! CSV and JSON artifacts for trajectory evaluation reports.
//!
//! Every writer accepts `-` as a path meaning standard output.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use solar_trajectory::TrajectoryReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Open `path` for writing, creating parent directories; `-` selects stdout.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(Box::new(BufWriter::new(File::create(path)?)))
}

/// One CSV row per recorded manoeuvre.
#[derive(Debug, Clone, Serialize)]
struct ManeuverRow {
    index: usize,
    kind: String,
    leg: usize,
    epoch_mjd2000: f64,
    delta_v_km_s: f64,
}

#[derive(Debug, Clone, Serialize)]
struct LegRow<'a> {
    leg: usize,
    origin: &'a str,
    destination: &'a str,
    departure_epoch_mjd2000: f64,
    arrival_epoch_mjd2000: f64,
    tof_days: f64,
    dsm_count: usize,
    arrival_vinf_km_s: f64,
    transfer_semi_major_axis_km: f64,
    lambert_iterations: usize,
}

/// Manoeuvre table: `index,kind,leg,epoch_mjd2000,delta_v_km_s`.
pub fn write_maneuvers_csv<W: Write>(writer: W, report: &TrajectoryReport) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for (index, maneuver) in report.maneuvers.iter().enumerate() {
        csv.serialize(ManeuverRow {
            index,
            kind: maneuver.kind.to_string(),
            leg: maneuver.leg,
            epoch_mjd2000: maneuver.epoch_mjd2000,
            delta_v_km_s: maneuver.delta_v_km_s,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Per-leg summary table.
pub fn write_legs_csv<W: Write>(writer: W, report: &TrajectoryReport) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for leg in &report.legs {
        csv.serialize(LegRow {
            leg: leg.index,
            origin: &leg.origin,
            destination: &leg.destination,
            departure_epoch_mjd2000: leg.departure_epoch_mjd2000,
            arrival_epoch_mjd2000: leg.arrival_epoch_mjd2000,
            tof_days: leg.arrival_epoch_mjd2000 - leg.departure_epoch_mjd2000,
            dsm_count: leg.dsm_count,
            arrival_vinf_km_s: leg.arrival_vinf_km_s,
            transfer_semi_major_axis_km: leg.transfer_semi_major_axis_km,
            lambert_iterations: leg.lambert_iterations,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// JSON document written next to the CSV tables.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub itinerary: &'a str,
    pub design_vector: &'a [f64],
    pub total_delta_v_km_s: f64,
    pub converged: bool,
    #[serde(flatten)]
    pub report: &'a TrajectoryReport,
}

impl<'a> ReportDocument<'a> {
    pub fn new(itinerary: &'a str, design_vector: &'a [f64], report: &'a TrajectoryReport) -> Self {
        Self {
            itinerary,
            design_vector,
            total_delta_v_km_s: report.total_delta_v(),
            converged: report.converged(),
            report,
        }
    }
}

pub fn write_report_json<W: Write>(
    mut writer: W,
    document: &ReportDocument<'_>,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, document)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Convenience wrappers resolving a path (or `-`) first.
pub fn export_maneuvers(path: &Path, report: &TrajectoryReport) -> Result<(), ExportError> {
    write_maneuvers_csv(writer_for_path(path)?, report)
}

pub fn export_legs(path: &Path, report: &TrajectoryReport) -> Result<(), ExportError> {
    write_legs_csv(writer_for_path(path)?, report)
}

pub fn export_report(path: &Path, document: &ReportDocument<'_>) -> Result<(), ExportError> {
    write_report_json(writer_for_path(path)?, document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_trajectory::{LegSummary, Maneuver, ManeuverKind};

    fn report() -> TrajectoryReport {
        TrajectoryReport {
            maneuvers: vec![
                Maneuver {
                    kind: ManeuverKind::Launch,
                    leg: 0,
                    epoch_mjd2000: 100.0,
                    delta_v_km_s: 3.5,
                },
                Maneuver {
                    kind: ManeuverKind::Arrival,
                    leg: 0,
                    epoch_mjd2000: 350.0,
                    delta_v_km_s: 2.25,
                },
            ],
            legs: vec![LegSummary {
                index: 0,
                origin: "Earth".into(),
                destination: "Mars".into(),
                departure_epoch_mjd2000: 100.0,
                arrival_epoch_mjd2000: 350.0,
                dsm_count: 0,
                arrival_vinf_km_s: 2.25,
                transfer_semi_major_axis_km: 1.9e8,
                lambert_iterations: 7,
            }],
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn maneuver_table_has_header_and_one_row_per_impulse() {
        let mut buffer = Vec::new();
        write_maneuvers_csv(&mut buffer, &report()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index,kind,leg,epoch_mjd2000,delta_v_km_s");
        assert_eq!(lines[1], "0,launch,0,100.0,3.5");
        assert_eq!(lines[2], "1,arrival,0,350.0,2.25");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn legs_table_reports_time_of_flight() {
        let mut buffer = Vec::new();
        write_legs_csv(&mut buffer, &report()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("leg,origin,destination,"));
        assert!(text.lines().nth(1).unwrap().contains(",250.0,"));
    }

    #[test]
    fn files_land_in_created_directories() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();
        let csv_path = dir.path().join("out/maneuvers.csv");
        let json_path = dir.path().join("out/report.json");
        export_maneuvers(&csv_path, &report).unwrap();
        let x = [100.0, 250.0];
        export_report(&json_path, &ReportDocument::new("direct", &x, &report)).unwrap();

        assert!(csv_path.exists());
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["itinerary"], "direct");
        assert_eq!(json["total_delta_v_km_s"], 5.75);
        assert_eq!(json["converged"], true);
        assert_eq!(json["maneuvers"][1]["kind"], "arrival");
        assert_eq!(json["legs"][0]["destination"], "Mars");
    }
}
