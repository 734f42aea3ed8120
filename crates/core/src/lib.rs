//! Core units, constants, and shared primitives for the MGA-DSM workspace.

/// Physical constants expressed in kilometres and seconds unless stated otherwise.
pub mod constants {
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Days per Julian century.
    pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
    /// Heliocentric gravitational parameter (km³/s²).
    pub const MU_SUN: f64 = 1.327_124_400_18e11;
    /// Julian date of the MJD2000 origin (2000-01-01T00:00:00).
    pub const MJD2000_JD_OFFSET: f64 = 2_451_544.5;
    /// Julian date of the J2000 epoch (2000-01-01T12:00:00).
    pub const J2000_JD: f64 = 2_451_545.0;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert astronomical units to kilometres.
    #[inline]
    pub fn au_to_km(v: f64) -> f64 {
        v * super::constants::AU_KM
    }

    /// Convert kilometres to astronomical units.
    #[inline]
    pub fn km_to_au(v: f64) -> f64 {
        v / super::constants::AU_KM
    }
}

/// Lightweight time utilities shared across crates. Epochs are MJD2000 days.
pub mod time {
    use super::constants::{
        DAYS_PER_JULIAN_CENTURY, J2000_JD, MJD2000_JD_OFFSET, SECONDS_PER_DAY,
    };

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    /// Convert an MJD2000 epoch to a Julian date.
    #[inline]
    pub fn mjd2000_to_jd(mjd2000: f64) -> f64 {
        mjd2000 + MJD2000_JD_OFFSET
    }

    /// Convert a Julian date to an MJD2000 epoch.
    #[inline]
    pub fn jd_to_mjd2000(jd: f64) -> f64 {
        jd - MJD2000_JD_OFFSET
    }

    /// Julian centuries elapsed since J2000 for an MJD2000 epoch.
    #[inline]
    pub fn julian_centuries_since_j2000(mjd2000: f64) -> f64 {
        (mjd2000_to_jd(mjd2000) - J2000_JD) / DAYS_PER_JULIAN_CENTURY
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in kilometres or km/s depending on context.
    pub type Vector3 = [f64; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// `a * sa + b * sb`, the affine combination used by Lagrange-coefficient updates.
    #[inline]
    pub fn combine(a: &Vector3, sa: f64, b: &Vector3, sb: f64) -> Vector3 {
        [
            a[0] * sa + b[0] * sb,
            a[1] * sa + b[1] * sb,
            a[2] * sa + b[2] * sb,
        ]
    }

    /// Unit vector along `v`. Returns `None` for a zero-length input.
    #[inline]
    pub fn unit(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        if n > 0.0 && n.is_finite() {
            Some(scale(v, 1.0 / n))
        } else {
            None
        }
    }

    /// Euclidean distance between two points.
    #[inline]
    pub fn distance(a: &Vector3, b: &Vector3) -> f64 {
        norm(&sub(a, b))
    }
}
