//! Conversions between true, eccentric, hyperbolic, parabolic and mean anomaly.

use std::f64::consts::PI;

const KEPLER_TOLERANCE: f64 = 1e-14;
const KEPLER_MAX_ITERATIONS: usize = 50;

/// True anomaly to eccentric anomaly (elliptical orbits, `0 ≤ e < 1`).
pub fn true_to_eccentric(true_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin_nu, cos_nu) = true_anomaly.sin_cos();
    let beta = (1.0 - eccentricity * eccentricity).sqrt();
    (beta * sin_nu).atan2(eccentricity + cos_nu)
}

/// Eccentric anomaly to true anomaly (elliptical orbits).
pub fn eccentric_to_true(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    let beta = (1.0 - eccentricity * eccentricity).sqrt();
    (beta * sin_e).atan2(cos_e - eccentricity)
}

/// True anomaly to hyperbolic anomaly (`e > 1`, `|ν|` below the asymptote).
pub fn true_to_hyperbolic(true_anomaly: f64, eccentricity: f64) -> f64 {
    let ratio = ((eccentricity - 1.0) / (eccentricity + 1.0)).sqrt();
    2.0 * (ratio * (0.5 * true_anomaly).tan()).atanh()
}

/// Hyperbolic anomaly to true anomaly.
pub fn hyperbolic_to_true(hyperbolic_anomaly: f64, eccentricity: f64) -> f64 {
    let ratio = ((eccentricity + 1.0) / (eccentricity - 1.0)).sqrt();
    2.0 * (ratio * (0.5 * hyperbolic_anomaly).tanh()).atan()
}

/// True anomaly to parabolic anomaly `D = tan(ν/2)`.
pub fn true_to_parabolic(true_anomaly: f64) -> f64 {
    (0.5 * true_anomaly).tan()
}

/// Parabolic anomaly to true anomaly.
pub fn parabolic_to_true(parabolic_anomaly: f64) -> f64 {
    2.0 * parabolic_anomaly.atan()
}

/// Kepler's equation `M = E − e sin E`.
pub fn eccentric_to_mean(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - eccentricity * eccentric_anomaly.sin()
}

/// Hyperbolic Kepler equation `M = e sinh H − H`.
pub fn hyperbolic_to_mean(hyperbolic_anomaly: f64, eccentricity: f64) -> f64 {
    eccentricity * hyperbolic_anomaly.sinh() - hyperbolic_anomaly
}

/// Barker's equation `M = D + D³/3`.
pub fn parabolic_to_mean(parabolic_anomaly: f64) -> f64 {
    parabolic_anomaly + parabolic_anomaly.powi(3) / 3.0
}

/// Solve Kepler's equation for the eccentric anomaly by Newton iteration.
pub fn mean_to_eccentric(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let m = mean_anomaly.rem_euclid(2.0 * PI);
    let mut e_anom = if eccentricity < 0.8 { m } else { PI };
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (e_anom - eccentricity * e_anom.sin() - m) / (1.0 - eccentricity * e_anom.cos());
        e_anom -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    // restore the revolution count carried by the input
    e_anom + (mean_anomaly - m)
}

/// Solve the hyperbolic Kepler equation for the hyperbolic anomaly by Newton iteration.
pub fn mean_to_hyperbolic(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mut h = (mean_anomaly / eccentricity).asinh();
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (eccentricity * h.sinh() - h - mean_anomaly) / (eccentricity * h.cosh() - 1.0);
        h -= delta;
        if delta.abs() < KEPLER_TOLERANCE * h.abs().max(1.0) {
            break;
        }
    }
    h
}

/// Mean anomaly to true anomaly for a closed orbit.
pub fn mean_to_true(mean_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_to_true(mean_to_eccentric(mean_anomaly, eccentricity), eccentricity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elliptical_conversions_invert() {
        let e = 0.6;
        for &nu in &[0.0, 0.4, 1.9, 3.0, -2.2] {
            let ea = true_to_eccentric(nu, e);
            let back = eccentric_to_true(ea, e);
            assert!((back - nu).abs() < 1e-12, "nu={nu} back={back}");
        }
    }

    #[test]
    fn kepler_equation_round_trip() {
        let e = 0.93;
        for &m in &[0.01, 1.0, 3.1, 5.9] {
            let ea = mean_to_eccentric(m, e);
            assert!((eccentric_to_mean(ea, e) - m).abs() < 1e-12);
        }
    }

    #[test]
    fn hyperbolic_conversions_invert() {
        let e = 2.3;
        for &nu in &[-1.5, -0.2, 0.0, 0.8, 1.9] {
            let h = true_to_hyperbolic(nu, e);
            assert!((hyperbolic_to_true(h, e) - nu).abs() < 1e-12);
            let m = hyperbolic_to_mean(h, e);
            assert!((mean_to_hyperbolic(m, e) - h).abs() < 1e-10);
        }
    }

    #[test]
    fn parabolic_anomaly_is_half_angle_tangent() {
        let d = true_to_parabolic(1.0);
        assert!((d - 0.5f64.tan()).abs() < 1e-15);
        assert!((parabolic_to_true(d) - 1.0).abs() < 1e-15);
        assert!((parabolic_to_mean(1.0) - 4.0 / 3.0).abs() < 1e-15);
    }
}
