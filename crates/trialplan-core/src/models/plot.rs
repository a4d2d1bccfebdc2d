//! Plot geometry: corner ordering, guide line and route end-points.
//!
//! A plot is a surveyed quadrilateral, ideally a rectangle. Its guide line runs
//! through the middle of the two short sides, so it follows the long axis, and
//! the two route end-points start out equal to the guide line's ends.

use crate::diagnostics::{Outcome, Warning};
use crate::error::{Result, TrialplanError};
use crate::geo::MidpointMethod;
use crate::models::coordinate::Coordinate;
use crate::models::work::{WorkAttributes, WorkSettings};
use geo::{BoundingRect, MultiPoint, Rect};
use serde::{Deserialize, Serialize};

/// Allowed disagreement between opposite sides before a plot is reported as
/// not rectangular
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeTolerance {
    /// Difference in distance units
    Absolute(f64),
    /// Difference as a fraction of the longer of the two sides
    Relative(f64),
}

impl Default for ShapeTolerance {
    fn default() -> Self {
        ShapeTolerance::Relative(0.05)
    }
}

impl ShapeTolerance {
    fn exceeded(&self, a: f64, b: f64) -> bool {
        let difference = (a - b).abs();
        match *self {
            ShapeTolerance::Absolute(limit) => difference > limit,
            ShapeTolerance::Relative(fraction) => difference > fraction * a.max(b),
        }
    }
}

/// How a plot came into existence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotSource {
    Corners,
    GuideLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plot {
    id: String,
    corners: Option<[Coordinate; 4]>,
    guide_line: [Coordinate; 2],
    end_points: [Coordinate; 2],
    width: Option<f64>,
    length: f64,
    center: Coordinate,
    work: WorkAttributes,
    source: PlotSource,
}

/// Corner indices of the sides, in anti-clockwise order
const SIDES: [(usize, usize); 4] = [(0, 1), (1, 2), (2, 3), (3, 0)];

fn invalid(plot_id: &str, reason: impl Into<String>) -> TrialplanError {
    TrialplanError::InvalidPlot { plot_id: plot_id.to_string(), reason: reason.into() }
}

/// Sort corners anti-clockwise by their angle around the planar centroid
fn sort_corners(corners: [Coordinate; 4]) -> [Coordinate; 4] {
    let mean_east = corners.iter().map(Coordinate::east).sum::<f64>() / 4.0;
    let mean_north = corners.iter().map(Coordinate::north).sum::<f64>() / 4.0;

    let mut sorted = corners;
    sorted.sort_by(|a, b| {
        let theta_a = (a.north() - mean_north).atan2(a.east() - mean_east);
        let theta_b = (b.north() - mean_north).atan2(b.east() - mean_east);
        theta_a.total_cmp(&theta_b)
    });
    sorted
}

/// Twice the signed area of the sorted quadrilateral (shoelace), taken
/// relative to the first corner to keep full precision at large east/north
fn doubled_area(corners: &[Coordinate; 4]) -> f64 {
    let origin = corners[0];
    let local = |c: &Coordinate| (c.east() - origin.east(), c.north() - origin.north());
    SIDES
        .iter()
        .map(|&(i, j)| {
            let (xi, yi) = local(&corners[i]);
            let (xj, yj) = local(&corners[j]);
            xi * yj - xj * yi
        })
        .sum()
}

impl Plot {
    /// Derive a plot from four surveyed corners in any order
    pub fn from_corners(
        corners: &[Coordinate],
        id: impl Into<String>,
        work: WorkAttributes,
    ) -> Result<Outcome<Self>> {
        Self::from_corners_with_tolerance(corners, id, work, ShapeTolerance::default())
    }

    pub fn from_corners_with_tolerance(
        corners: &[Coordinate],
        id: impl Into<String>,
        work: WorkAttributes,
        tolerance: ShapeTolerance,
    ) -> Result<Outcome<Self>> {
        let id = id.into();
        let corners: [Coordinate; 4] = corners
            .try_into()
            .map_err(|_| invalid(&id, format!("expected 4 corners, found {}", corners.len())))?;

        let corners = sort_corners(corners);

        let d: Vec<f64> = SIDES.iter().map(|&(i, j)| corners[i].distance(&corners[j])).collect();
        if d.iter().any(|&side| side <= f64::EPSILON) {
            return Err(invalid(&id, "two corners coincide"));
        }
        let perimeter: f64 = d.iter().sum();
        if doubled_area(&corners).abs() <= 1e-9 * perimeter * perimeter {
            return Err(invalid(&id, "corners are collinear"));
        }

        let mut warnings = Vec::new();
        if tolerance.exceeded(d[0], d[2]) || tolerance.exceeded(d[1], d[3]) {
            let warning = Warning::PlotShape {
                plot_id: id.clone(),
                first_pair_difference: (d[0] - d[2]).abs(),
                second_pair_difference: (d[1] - d[3]).abs(),
            };
            tracing::warn!("{}", warning);
            warnings.push(warning);
        }

        // (long sides, short sides) as indices into SIDES
        let (long, short) =
            if d[0] + d[2] > d[1] + d[3] { ([0, 2], [1, 3]) } else { ([1, 3], [0, 2]) };

        let side_midpoint = |side: usize, warnings: &mut Vec<Warning>| -> Result<Coordinate> {
            let (i, j) = SIDES[side];
            Ok(Coordinate::midpoint(&[corners[i], corners[j]], MidpointMethod::Utm)?
                .collect_into(warnings))
        };
        let a = side_midpoint(short[0], &mut warnings)?;
        let b = side_midpoint(short[1], &mut warnings)?;

        let width = (d[short[0]] + d[short[1]]) / 2.0;
        let length = (d[long[0]] + d[long[1]]) / 2.0;
        let center =
            Coordinate::midpoint(&[a, b], MidpointMethod::Utm)?.collect_into(&mut warnings);

        let plot = Self {
            id,
            corners: Some(corners),
            guide_line: [a, b],
            end_points: [a, b],
            width: Some(width),
            length,
            center,
            work,
            source: PlotSource::Corners,
        };
        Ok(Outcome::with_warnings(plot, warnings))
    }

    /// Re-hydrate an already derived plot, e.g. from an earlier export.
    ///
    /// Corners are never reconstructed: a width is recorded when given, but
    /// [`Plot::corners`] stays `None`.
    pub fn from_guide_line(
        guide_line: [Coordinate; 2],
        end_points: [Coordinate; 2],
        width: Option<f64>,
        id: impl Into<String>,
        work: WorkAttributes,
    ) -> Result<Outcome<Self>> {
        let id = id.into();
        if let Some(width) = width {
            if !width.is_finite() || width <= 0.0 {
                return Err(invalid(&id, format!("width must be positive, got {}", width)));
            }
        }

        let mut warnings = Vec::new();
        let center =
            Coordinate::midpoint(&end_points, MidpointMethod::Utm)?.collect_into(&mut warnings);
        let plot = Self {
            id,
            corners: None,
            guide_line,
            end_points,
            width,
            length: guide_line[0].distance(&guide_line[1]),
            center,
            work,
            source: PlotSource::GuideLine,
        };
        Ok(Outcome::with_warnings(plot, warnings))
    }

    /// Reverse the driving direction: end-points and guide line flip together
    pub fn swap_endpoints(&mut self) {
        self.end_points.swap(0, 1);
        self.guide_line.swap(0, 1);
    }

    /// Apply a settings patch; the plot is unchanged if the result is invalid
    pub fn set_work(&mut self, settings: &WorkSettings) -> Result<()> {
        self.work = self.work.patched(settings)?;
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Corners in anti-clockwise order, `None` for re-hydrated plots
    pub fn corners(&self) -> Option<&[Coordinate; 4]> {
        self.corners.as_ref()
    }

    pub fn guide_line(&self) -> &[Coordinate; 2] {
        &self.guide_line
    }

    pub fn end_points(&self) -> &[Coordinate; 2] {
        &self.end_points
    }

    pub fn entry(&self) -> &Coordinate {
        &self.end_points[0]
    }

    pub fn exit(&self) -> &Coordinate {
        &self.end_points[1]
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn center(&self) -> &Coordinate {
        &self.center
    }

    pub fn work(&self) -> &WorkAttributes {
        &self.work
    }

    pub fn source(&self) -> PlotSource {
        self.source
    }

    /// Geographic bounding box (x = longitude, y = latitude) of the corners, or
    /// of the guide line when corners are unknown
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let points: Vec<geo::Point<f64>> = match &self.corners {
            Some(corners) => corners.iter().map(Coordinate::to_geo_point).collect(),
            None => self.guide_line.iter().map(Coordinate::to_geo_point).collect(),
        };
        MultiPoint::from(points).bounding_rect()
    }
}
