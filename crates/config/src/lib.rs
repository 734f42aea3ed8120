//! Configuration models and loaders for body catalogs and MGA-DSM itineraries.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Heliocentric gravitational parameter used when a body omits `central_mu_km3_s2`.
const DEFAULT_CENTRAL_MU_KM3_S2: f64 = 1.327_124_400_18e11;

/// Physical and ephemeris data for one body, as stored in `configs/bodies/*.toml`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
    /// μ of the body the planet orbits; used to propagate legs that start here.
    #[serde(default = "default_central_mu")]
    pub central_mu_km3_s2: f64,
    #[serde(default)]
    pub mean_elements: Option<MeanElementsConfig>,
}

fn default_central_mu() -> f64 {
    DEFAULT_CENTRAL_MU_KM3_S2
}

/// A mean element: value at J2000 plus a linear rate per Julian century.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct SecularTerm {
    pub j2000: f64,
    #[serde(default)]
    pub rate: f64,
}

impl SecularTerm {
    pub fn at(&self, centuries: f64) -> f64 {
        self.j2000 + self.rate * centuries
    }
}

/// Keplerian mean elements referred to the J2000 ecliptic and equinox.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MeanElementsConfig {
    pub semi_major_axis_au: SecularTerm,
    pub eccentricity: SecularTerm,
    pub inclination_deg: SecularTerm,
    pub mean_longitude_deg: SecularTerm,
    pub longitude_of_perihelion_deg: SecularTerm,
    pub ascending_node_deg: SecularTerm,
    pub valid_from_mjd2000: f64,
    pub valid_to_mjd2000: f64,
}

/// An itinerary definition with an optional design vector to evaluate.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ItineraryConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub design_vector: Option<Vec<f64>>,
}

/// One itinerary event. Durations are in days.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeConfig {
    Departure {
        body: String,
        epoch: EpochConfig,
        #[serde(default)]
        escape_delta_v: Option<SphericalDeltaVConfig>,
    },
    Dsm {
        alpha: f64,
        #[serde(default)]
        delta_v: Option<SphericalDeltaVConfig>,
    },
    Flyby {
        body: String,
        tof_days: f64,
        altitude_km: f64,
        #[serde(default)]
        b_plane_angle_rad: f64,
    },
    Rendezvous {
        body: String,
        tof_days: f64,
    },
    Insertion {
        body: String,
        target_orbit: TargetOrbitConfig,
        tof_days: f64,
        #[serde(default)]
        time_in_orbit_days: f64,
        #[serde(default)]
        escape_delta_v: Option<SphericalDeltaVConfig>,
    },
}

/// Impulse as magnitude plus normalised polar and azimuth parameters in `[0, 1]`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct SphericalDeltaVConfig {
    pub magnitude_km_s: f64,
    #[serde(default = "half")]
    pub polar: f64,
    #[serde(default)]
    pub azimuth: f64,
}

fn half() -> f64 {
    0.5
}

/// Closed parking orbit targeted by an insertion.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct TargetOrbitConfig {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination_rad: f64,
    #[serde(default)]
    pub argument_of_periapsis_rad: f64,
    #[serde(default)]
    pub ascending_node_rad: f64,
    #[serde(default)]
    pub true_anomaly_rad: f64,
}

/// An epoch given either as MJD2000 days or as a calendar string.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum EpochConfig {
    Mjd2000(f64),
    Calendar(String),
}

impl EpochConfig {
    pub fn to_mjd2000(&self) -> Result<f64, ConfigError> {
        match self {
            EpochConfig::Mjd2000(days) => Ok(*days),
            EpochConfig::Calendar(text) => parse_epoch(text),
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid epoch '{0}': expected MJD2000 days, YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidEpoch(String),
    #[error("{}: expected exactly one record, found {found}", path.display())]
    RecordCount { path: PathBuf, found: usize },
}

/// Parse a calendar epoch into MJD2000 days. Time scales are not distinguished.
pub fn parse_epoch(text: &str) -> Result<f64, ConfigError> {
    let trimmed = text.trim();
    let invalid = || ConfigError::InvalidEpoch(text.to_string());
    let datetime = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(invalid)?;
    let origin = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)?;
    let elapsed = datetime.signed_duration_since(origin);
    let millis = elapsed.num_milliseconds() as f64;
    Ok(millis / 86_400_000.0)
}

/// Load body configurations from a YAML list, a single TOML file, or a directory of TOML files.
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    load_records(path)
}

/// Load a single itinerary from a TOML or YAML document.
pub fn load_itinerary<P: AsRef<Path>>(path: P) -> Result<ItineraryConfig, ConfigError> {
    load_record(path)
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        let mut records: Vec<T> = read_dir_records(path)?;
        if records.len() != 1 {
            return Err(ConfigError::RecordCount {
                path: path.to_path_buf(),
                found: records.len(),
            });
        }
        Ok(records.remove(0))
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
