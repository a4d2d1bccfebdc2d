//! Midpoint methods for groups of surveyed points

use crate::error::{Result, TrialplanError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the midpoint of several coordinates is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MidpointMethod {
    /// Mean of unit vectors on a sphere, converted back to latitude/longitude.
    /// Only accurate for points that are close together.
    #[default]
    Geographic,
    /// Arithmetic mean of the projected east/north values
    Utm,
}

impl FromStr for MidpointMethod {
    type Err = TrialplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "geographic" => Ok(MidpointMethod::Geographic),
            "utm" => Ok(MidpointMethod::Utm),
            _ => Err(TrialplanError::UnsupportedMethod { method: s.to_string() }),
        }
    }
}

impl fmt::Display for MidpointMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidpointMethod::Geographic => write!(f, "geographic"),
            MidpointMethod::Utm => write!(f, "utm"),
        }
    }
}

/// Spherical centroid of (latitude, longitude) pairs in degrees.
///
/// Returns `None` for an empty slice.
pub fn spherical_centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }

    let count = points.len() as f64;
    let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
    for &(latitude, longitude) in points {
        let lat = latitude.to_radians();
        let lon = longitude.to_radians();
        x += lat.cos() * lon.cos();
        y += lat.cos() * lon.sin();
        z += lat.sin();
    }
    x /= count;
    y /= count;
    z /= count;

    let longitude = y.atan2(x);
    let hyp = (x * x + y * y).sqrt();
    let latitude = z.atan2(hyp);

    Some((latitude.to_degrees(), longitude.to_degrees()))
}

/// Arithmetic mean of (east, north) pairs. Returns `None` for an empty slice.
pub fn planar_mean(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let count = points.len() as f64;
    let (sum_east, sum_north) =
        points.iter().fold((0.0, 0.0), |(se, sn), &(e, n)| (se + e, sn + n));
    Some((sum_east / count, sum_north / count))
}
