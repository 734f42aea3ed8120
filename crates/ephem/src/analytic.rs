//! Planetary positions from Keplerian mean elements with linear secular rates.
//!
//! Elements are referred to the mean ecliptic and equinox of J2000 and evaluated at
//! `T` Julian centuries past J2000; velocities follow from the two-body conic under the
//! central body's μ.

use std::collections::HashMap;

use log::debug;
use solar_config::{BodyConfig, MeanElementsConfig};
use solar_core::{time::julian_centuries_since_j2000, units::au_to_km};
use solar_orbits::{OrbitalElements, StateVector, anomaly};

use crate::{BodyProperties, Ephemeris, EphemerisError};

#[derive(Debug, Clone)]
struct CatalogBody {
    properties: BodyProperties,
    elements: Option<MeanElementsConfig>,
}

/// Mean-element ephemeris built from a body catalog.
#[derive(Debug, Clone, Default)]
pub struct AnalyticEphemeris {
    bodies: Vec<CatalogBody>,
    lookup: HashMap<String, usize>,
}

impl AnalyticEphemeris {
    pub fn from_body_configs(configs: &[BodyConfig]) -> Result<Self, EphemerisError> {
        let mut ephemeris = Self::default();
        for config in configs {
            ephemeris.insert(config)?;
        }
        debug!("analytic ephemeris loaded {} bodies", ephemeris.bodies.len());
        Ok(ephemeris)
    }

    fn insert(&mut self, config: &BodyConfig) -> Result<(), EphemerisError> {
        let positive = |v: f64| v > 0.0 && v.is_finite();
        if !positive(config.mu_km3_s2) || !positive(config.central_mu_km3_s2) {
            return Err(EphemerisError::InvalidCatalog(format!(
                "`{}` needs positive gravitational parameters",
                config.name
            )));
        }
        if !(config.radius_km >= 0.0 && config.radius_km.is_finite()) {
            return Err(EphemerisError::InvalidCatalog(format!(
                "`{}` has invalid radius {}",
                config.name, config.radius_km
            )));
        }
        if let Some(elements) = &config.mean_elements {
            if elements.valid_from_mjd2000 > elements.valid_to_mjd2000 {
                return Err(EphemerisError::InvalidCatalog(format!(
                    "`{}` has an empty validity window",
                    config.name
                )));
            }
        }

        let index = self.bodies.len();
        for key in std::iter::once(&config.name).chain(config.aliases.iter()) {
            let key = normalize(key);
            if self.lookup.insert(key.clone(), index).is_some() {
                return Err(EphemerisError::InvalidCatalog(format!(
                    "duplicate body name `{key}`"
                )));
            }
        }
        self.bodies.push(CatalogBody {
            properties: BodyProperties {
                name: config.name.clone(),
                mu_km3_s2: config.mu_km3_s2,
                radius_km: config.radius_km,
                central_mu_km3_s2: config.central_mu_km3_s2,
            },
            elements: config.mean_elements.clone(),
        });
        Ok(())
    }

    /// Canonical names of every catalog body, in catalog order.
    pub fn body_names(&self) -> impl Iterator<Item = &str> {
        self.bodies.iter().map(|b| b.properties.name.as_str())
    }

    fn body(&self, name: &str) -> Result<&CatalogBody, EphemerisError> {
        self.lookup
            .get(&normalize(name))
            .map(|&i| &self.bodies[i])
            .ok_or_else(|| EphemerisError::UnknownBody(name.to_string()))
    }

    /// Osculating elements of `body` at `epoch_mjd2000`.
    pub fn elements_at(
        &self,
        body: &str,
        epoch_mjd2000: f64,
    ) -> Result<OrbitalElements, EphemerisError> {
        let entry = self.body(body)?;
        let mean = entry
            .elements
            .as_ref()
            .ok_or_else(|| EphemerisError::UnknownBody(format!("{body} (no mean elements)")))?;
        if !(mean.valid_from_mjd2000..=mean.valid_to_mjd2000).contains(&epoch_mjd2000) {
            return Err(EphemerisError::EpochOutOfRange {
                body: entry.properties.name.clone(),
                epoch_mjd2000,
                valid_from: mean.valid_from_mjd2000,
                valid_to: mean.valid_to_mjd2000,
            });
        }

        let t = julian_centuries_since_j2000(epoch_mjd2000);
        let eccentricity = mean.eccentricity.at(t);
        let ascending_node = mean.ascending_node_deg.at(t).to_radians();
        let perihelion = mean.longitude_of_perihelion_deg.at(t).to_radians();
        let mean_anomaly = mean.mean_longitude_deg.at(t).to_radians() - perihelion;
        let true_anomaly = anomaly::mean_to_true(mean_anomaly, eccentricity).rem_euclid(std::f64::consts::TAU);

        Ok(OrbitalElements {
            semi_major_axis: au_to_km(mean.semi_major_axis_au.at(t)),
            eccentricity,
            true_anomaly,
            inclination: mean.inclination_deg.at(t).to_radians(),
            argument_of_periapsis: perihelion - ascending_node,
            ascending_node,
        })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl Ephemeris for AnalyticEphemeris {
    fn state_vector(&self, body: &str, epoch_mjd2000: f64) -> Result<StateVector, EphemerisError> {
        let elements = self.elements_at(body, epoch_mjd2000)?;
        let mu = self.body(body)?.properties.central_mu_km3_s2;
        elements
            .to_state(mu)
            .map_err(|source| EphemerisError::State {
                body: body.to_string(),
                source,
            })
    }

    fn body_properties(&self, body: &str) -> Result<BodyProperties, EphemerisError> {
        self.body(body).map(|b| b.properties.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_config::SecularTerm;
    use solar_core::{constants::AU_KM, vector};

    fn term(j2000: f64, rate: f64) -> SecularTerm {
        SecularTerm { j2000, rate }
    }

    fn earth() -> BodyConfig {
        BodyConfig {
            name: "Earth".into(),
            aliases: vec!["EMB".into()],
            mu_km3_s2: 398_600.441_8,
            radius_km: 6_378.137,
            central_mu_km3_s2: 1.327_124_400_18e11,
            mean_elements: Some(MeanElementsConfig {
                semi_major_axis_au: term(1.000_002_61, 0.000_005_62),
                eccentricity: term(0.016_711_23, -0.000_043_92),
                inclination_deg: term(-0.000_015_31, -0.012_946_68),
                mean_longitude_deg: term(100.464_571_66, 35_999.372_449_81),
                longitude_of_perihelion_deg: term(102.937_681_93, 0.323_273_64),
                ascending_node_deg: term(0.0, 0.0),
                valid_from_mjd2000: -73_048.0,
                valid_to_mjd2000: 18_263.0,
            }),
        }
    }

    #[test]
    fn earth_is_near_perihelion_at_j2000() {
        let eph = AnalyticEphemeris::from_body_configs(&[earth()]).unwrap();
        let state = eph.state_vector("Earth", 0.5).unwrap();
        let r_au = state.radius_km() / AU_KM;
        assert!((r_au - 0.9833).abs() < 1e-3, "r = {r_au} AU");
        let v = state.speed_km_s();
        assert!((v - 30.29).abs() < 0.05, "v = {v} km/s");
        // counter-clockwise seen from the ecliptic north pole
        assert!(vector::cross(&state.position_km, &state.velocity_km_s)[2] > 0.0);
    }

    #[test]
    fn lookup_is_case_insensitive_and_honours_aliases() {
        let eph = AnalyticEphemeris::from_body_configs(&[earth()]).unwrap();
        let a = eph.state_vector("earth", 1_000.0).unwrap();
        let b = eph.state_vector(" EMB ", 1_000.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(eph.body_properties("EARTH").unwrap().name, "Earth");
        assert_eq!(eph.central_body_mu("Earth").unwrap(), 1.327_124_400_18e11);
    }

    #[test]
    fn unknown_body_and_out_of_range_epoch_are_domain_errors() {
        let eph = AnalyticEphemeris::from_body_configs(&[earth()]).unwrap();
        assert!(matches!(
            eph.state_vector("Vulcan", 0.0),
            Err(EphemerisError::UnknownBody(_))
        ));
        assert!(matches!(
            eph.state_vector("Earth", 20_000.0),
            Err(EphemerisError::EpochOutOfRange { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut other = earth();
        other.name = "Terra".into();
        let err = AnalyticEphemeris::from_body_configs(&[earth(), other]).unwrap_err();
        assert!(matches!(err, EphemerisError::InvalidCatalog(_)));
    }

    #[test]
    fn body_without_elements_has_properties_but_no_state() {
        let mut moonlet = earth();
        moonlet.name = "Moonlet".into();
        moonlet.aliases.clear();
        moonlet.mean_elements = None;
        let eph = AnalyticEphemeris::from_body_configs(&[moonlet]).unwrap();
        assert!(eph.body_properties("Moonlet").is_ok());
        assert!(matches!(
            eph.state_vector("Moonlet", 0.0),
            Err(EphemerisError::UnknownBody(_))
        ));
    }
}
