//! Distances between positions

use geo::{Distance, Euclidean, Geodesic, Point};
use serde::{Deserialize, Serialize};

/// Distance model used when comparing two coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    /// Straight-line distance in the projected plane. The planner's reference model.
    #[default]
    Utm,
    /// Ellipsoidal distance on WGS 84 (Karney's algorithm)
    Geodesic,
}

/// Euclidean distance between two (east, north) positions
pub fn planar(a: (f64, f64), b: (f64, f64)) -> f64 {
    Euclidean.distance(Point::new(a.0, a.1), Point::new(b.0, b.1))
}

/// Geodesic distance in metres between two (latitude, longitude) positions
pub fn geodesic(a: (f64, f64), b: (f64, f64)) -> f64 {
    Geodesic.distance(Point::new(a.1, a.0), Point::new(b.1, b.0))
}
