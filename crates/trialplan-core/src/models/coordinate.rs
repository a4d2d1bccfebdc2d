//! Surveyed points in both geographic and projected form.
//!
//! A [`Coordinate`] is built from either a latitude/longitude pair or an
//! east/north pair, and the other representation is derived immediately.
//! Altitude is carried for reference only and never enters distance or
//! midpoint math.

use crate::diagnostics::Outcome;
use crate::error::{Result, TrialplanError};
use crate::geo::distance::{self, DistanceMethod};
use crate::geo::midpoint::{planar_mean, spherical_centroid, MidpointMethod};
use crate::geo::projection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which representation a coordinate was constructed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSource {
    Geographic,
    Projected,
}

/// Outcome of guessing the coordinate system of an untagged (x, y) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanarInput {
    Geographic { latitude: f64, longitude: f64 },
    Projected { east: f64, north: f64 },
}

/// Classify an untagged pair by magnitude.
///
/// Anything with |y| > 90 or |x| > 180 cannot be latitude/longitude and is read
/// as projected (east = x, north = y). Everything else is read as geographic
/// (latitude = y, longitude = x).
pub fn classify_planar(x: f64, y: f64) -> PlanarInput {
    if y > 90.0 || y < -90.0 || x < -180.0 || x > 180.0 {
        PlanarInput::Projected { east: x, north: y }
    } else {
        PlanarInput::Geographic { latitude: y, longitude: x }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    east: f64,
    north: f64,
    zone: i32,
    source: CoordinateSource,
}

impl Coordinate {
    /// Build from latitude/longitude in degrees
    pub fn from_geographic(latitude: f64, longitude: f64, altitude: Option<f64>) -> Result<Self> {
        let projected = projection::to_projected(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
            altitude,
            east: projected.east,
            north: projected.north,
            zone: projected.zone,
            source: CoordinateSource::Geographic,
        })
    }

    /// Build from projected east/north in metres.
    ///
    /// Without a zone, the zone is estimated from `east` alone and a
    /// zone-ambiguity warning is returned with the coordinate.
    pub fn from_projected(east: f64, north: f64, zone: Option<i32>) -> Result<Outcome<Self>> {
        let mut warnings = Vec::new();
        let zone = match zone {
            Some(zone) => zone,
            None => {
                let (zone, warning) = projection::estimate_zone(east)?;
                tracing::debug!("{}", warning);
                warnings.push(warning);
                zone
            }
        };

        let (latitude, longitude) = projection::to_geographic(east, north, zone)?;
        let coordinate = Self {
            latitude,
            longitude,
            altitude: None,
            east,
            north,
            zone,
            source: CoordinateSource::Projected,
        };
        Ok(Outcome::with_warnings(coordinate, warnings))
    }

    /// Build from an untagged pair, guessing the coordinate system with
    /// [`classify_planar`]
    pub fn from_planar(x: f64, y: f64) -> Result<Outcome<Self>> {
        match classify_planar(x, y) {
            PlanarInput::Geographic { latitude, longitude } => {
                Self::from_geographic(latitude, longitude, None).map(Outcome::clean)
            }
            PlanarInput::Projected { east, north } => Self::from_projected(east, north, None),
        }
    }

    pub fn with_altitude(mut self, altitude: Option<f64>) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn zone(&self) -> i32 {
        self.zone
    }

    pub fn source(&self) -> CoordinateSource {
        self.source
    }

    /// Euclidean distance in the projected plane
    pub fn distance(&self, other: &Coordinate) -> f64 {
        distance::planar((self.east, self.north), (other.east, other.north))
    }

    pub fn distance_with(&self, other: &Coordinate, method: DistanceMethod) -> f64 {
        match method {
            DistanceMethod::Utm => self.distance(other),
            DistanceMethod::Geodesic => distance::geodesic(
                (self.latitude, self.longitude),
                (other.latitude, other.longitude),
            ),
        }
    }

    /// Midpoint of a group of coordinates.
    ///
    /// The utm method keeps the shared zone of the inputs. Points from different
    /// zones have no meaningful shared plane, so the zone is re-estimated and a
    /// warning is returned.
    pub fn midpoint(points: &[Coordinate], method: MidpointMethod) -> Result<Outcome<Self>> {
        let first = points.first().ok_or_else(|| TrialplanError::InsufficientData {
            reason: "midpoint of an empty point set".to_string(),
        })?;

        match method {
            MidpointMethod::Geographic => {
                let pairs: Vec<(f64, f64)> =
                    points.iter().map(|p| (p.latitude, p.longitude)).collect();
                let (latitude, longitude) = spherical_centroid(&pairs).ok_or_else(|| {
                    TrialplanError::InsufficientData { reason: "no points".to_string() }
                })?;
                Self::from_geographic(latitude, longitude, None).map(Outcome::clean)
            }
            MidpointMethod::Utm => {
                let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.east, p.north)).collect();
                let (east, north) = planar_mean(&pairs).ok_or_else(|| {
                    TrialplanError::InsufficientData { reason: "no points".to_string() }
                })?;
                let shared_zone = points.iter().all(|p| p.zone == first.zone);
                Self::from_projected(east, north, shared_zone.then_some(first.zone))
            }
        }
    }

    /// Geographic position as a `geo` point (x = longitude, y = latitude)
    pub fn to_geo_point(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            CoordinateSource::Geographic => {
                write!(f, "({:12.8}°;{:12.8}°)", self.latitude, self.longitude)
            }
            CoordinateSource::Projected => write!(
                f,
                "({:12.3} m E;{:12.3} m N), Zone: {}",
                self.east, self.north, self.zone
            ),
        }
    }
}
