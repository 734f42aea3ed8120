//! Generalised Stumpff functions `c2(ψ)` and `c3(ψ)`.
//!
//! Evaluated piecewise: trigonometric above `PSI_BAND`, hyperbolic below `−PSI_BAND`,
//! and a short Taylor series (limits 1/2 and 1/6) in between.

/// Half-width of the band around ψ = 0 where the series is used.
pub const PSI_BAND: f64 = 1e-6;

/// Returns `(c2, c3)` for `psi = x²α`.
pub fn c2_c3(psi: f64) -> (f64, f64) {
    if psi > PSI_BAND {
        let sqrt_psi = psi.sqrt();
        let (sin_s, cos_s) = sqrt_psi.sin_cos();
        ((1.0 - cos_s) / psi, (sqrt_psi - sin_s) / (psi * sqrt_psi))
    } else if psi < -PSI_BAND {
        let sqrt_neg = (-psi).sqrt();
        (
            (1.0 - sqrt_neg.cosh()) / psi,
            (sqrt_neg.sinh() - sqrt_neg) / (-psi * sqrt_neg),
        )
    } else {
        (
            0.5 - psi / 24.0 + psi * psi / 720.0,
            1.0 / 6.0 - psi / 120.0 + psi * psi / 5_040.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branches_agree_at_the_band_edges() {
        let (c2_in, c3_in) = c2_c3(PSI_BAND * 0.999);
        let (c2_out, c3_out) = c2_c3(PSI_BAND * 1.001);
        assert!((c2_in - c2_out).abs() < 1e-9);
        assert!((c3_in - c3_out).abs() < 1e-9);

        let (c2_in, c3_in) = c2_c3(-PSI_BAND * 0.999);
        let (c2_out, c3_out) = c2_c3(-PSI_BAND * 1.001);
        assert!((c2_in - c2_out).abs() < 1e-9);
        assert!((c3_in - c3_out).abs() < 1e-9);
    }

    #[test]
    fn limits_at_zero() {
        assert_eq!(c2_c3(0.0), (0.5, 1.0 / 6.0));
    }

    #[test]
    fn full_revolution_values() {
        // ψ = (2π)² closes a full ellipse: c2 = 0, c3 = 1/(2π)²
        let psi = (2.0 * std::f64::consts::PI).powi(2);
        let (c2, c3) = c2_c3(psi);
        assert!(c2.abs() < 1e-15);
        assert!((c3 - 1.0 / psi).abs() < 1e-15);
    }
}
