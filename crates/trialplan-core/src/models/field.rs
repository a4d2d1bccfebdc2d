//! Field boundary polygon

use crate::error::{Result, TrialplanError};
use crate::models::coordinate::Coordinate;
use geo::{BoundingRect, LineString, Polygon, Rect};
use serde::Serialize;

/// Outline of the trial area. Only used for display bounds and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    points: Vec<Coordinate>,
}

impl Field {
    /// Points are kept in the order they were surveyed
    pub fn new(points: Vec<Coordinate>) -> Result<Self> {
        if points.len() < 3 {
            return Err(TrialplanError::InsufficientData {
                reason: format!("a field boundary needs at least 3 points, found {}", points.len()),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Closed polygon in geographic coordinates (x = longitude, y = latitude)
    pub fn to_polygon(&self) -> Polygon<f64> {
        let ring: LineString<f64> =
            self.points.iter().map(|p| (p.longitude(), p.latitude())).collect::<Vec<_>>().into();
        Polygon::new(ring, vec![])
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.to_polygon().bounding_rect()
    }
}
