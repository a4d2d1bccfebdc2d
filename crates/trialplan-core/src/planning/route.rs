//! Route sequencing: choose a start and orient each plot's end-points.
//!
//! The pass is greedy and local. Each plot is oriented so that its entry is the
//! nearer end-point to the previous plot's exit; earlier decisions are never
//! revisited, so the result is not a minimal tour.

use crate::error::{Result, TrialplanError};
use crate::geo::distance;
use crate::geo::midpoint::planar_mean;
use crate::models::{Coordinate, Plot};

#[derive(Debug, Clone, Default)]
pub struct RouteSequencer {
    start_id: Option<String>,
}

impl RouteSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the route at this plot instead of the outermost end-point
    pub fn with_start(mut self, plot_id: impl Into<String>) -> Self {
        self.start_id = Some(plot_id.into());
        self
    }

    /// Rotate the plot list to its start and orient every plot.
    ///
    /// Plot order is otherwise kept as given.
    pub fn sequence(&self, mut plots: Vec<Plot>) -> Result<Vec<Plot>> {
        if plots.is_empty() {
            return Ok(plots);
        }

        match &self.start_id {
            Some(start_id) => {
                let index = plots.iter().position(|p| p.id() == start_id).ok_or_else(|| {
                    TrialplanError::PlotNotFound { plot_id: start_id.clone() }
                })?;
                plots.rotate_left(index);
            }
            None => {
                if let Some(endpoint) = outermost_endpoint(&plots) {
                    plots.rotate_left(endpoint / 2);
                    if endpoint % 2 == 1 {
                        plots[0].swap_endpoints();
                    }
                }
            }
        }
        tracing::debug!(start = plots[0].id(), "Route start selected");

        smooth(&mut plots);
        Ok(plots)
    }
}

/// Index into the flattened end-point list (two per plot) of the end-point
/// farthest from the centroid of all end-points. The first maximum wins.
fn outermost_endpoint(plots: &[Plot]) -> Option<usize> {
    let endpoints: Vec<(f64, f64)> = plots
        .iter()
        .flat_map(|p| p.end_points().iter().map(|e| (e.east(), e.north())))
        .collect();
    let centroid = planar_mean(&endpoints)?;

    let mut best: Option<(usize, f64)> = None;
    for (index, &point) in endpoints.iter().enumerate() {
        let d = distance::planar(centroid, point);
        if best.map_or(true, |(_, best_d)| d > best_d) {
            best = Some((index, d));
        }
    }
    best.map(|(index, _)| index)
}

/// Single greedy pass over consecutive pairs
fn smooth(plots: &mut [Plot]) {
    for i in 1..plots.len() {
        let previous_exit = *plots[i - 1].exit();
        let next = &mut plots[i];
        if previous_exit.distance(next.entry()) > previous_exit.distance(next.exit()) {
            next.swap_endpoints();
        }
    }
}

/// Waypoints of the whole route: each plot's guide line in driving order
pub fn route_polyline(plots: &[Plot]) -> Vec<Coordinate> {
    plots.iter().flat_map(|p| p.guide_line().iter().copied()).collect()
}

/// Total distance driven between plots (exit of one to entry of the next)
pub fn route_length(plots: &[Plot]) -> f64 {
    plots.windows(2).map(|pair| pair[0].exit().distance(pair[1].entry())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkAttributes;

    fn point(east: f64, north: f64) -> Coordinate {
        Coordinate::from_projected(500_000.0 + east, 6_000_000.0 + north, Some(32)).unwrap().value
    }

    fn line_plot(id: &str, from: (f64, f64), to: (f64, f64)) -> Plot {
        let a = point(from.0, from.1);
        let b = point(to.0, to.1);
        Plot::from_guide_line([a, b], [a, b], Some(1.0), id, WorkAttributes::default())
            .unwrap()
            .value
    }

    fn local(c: &Coordinate) -> (f64, f64) {
        ((c.east() - 500_000.0).round(), (c.north() - 6_000_000.0).round())
    }

    #[test]
    fn test_smoothing_is_locally_optimal() {
        let plots = vec![
            line_plot("1", (0.0, 0.0), (0.0, 10.0)),
            line_plot("2", (0.0, 12.0), (0.0, 2.0)),
            line_plot("3", (0.0, 3.0), (0.0, 13.0)),
        ];
        let route = RouteSequencer::new().with_start("1").sequence(plots).unwrap();

        for pair in route.windows(2) {
            let exit = pair[0].exit();
            assert!(exit.distance(pair[1].entry()) <= exit.distance(pair[1].exit()));
        }
        assert_eq!(local(route[1].entry()), (0.0, 12.0));
        assert_eq!(local(route[2].entry()), (0.0, 3.0));
    }

    #[test]
    fn test_outermost_endpoint_starts_the_route() {
        let plots = vec![
            line_plot("a", (0.0, 0.0), (0.0, 10.0)),
            line_plot("b", (5.0, 0.0), (5.0, 10.0)),
            line_plot("c", (30.0, 0.0), (30.0, 12.0)),
        ];
        // (30, 12) is farthest from the end-point centroid and is the exit of c
        let route = RouteSequencer::new().sequence(plots).unwrap();
        let ids: Vec<&str> = route.iter().map(Plot::id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(local(route[0].entry()), (30.0, 12.0));
        assert_eq!(local(route[1].entry()), (0.0, 0.0));
        assert_eq!(local(route[2].entry()), (5.0, 10.0));
    }

    #[test]
    fn test_swap_reaches_guide_line() {
        let plots = vec![
            line_plot("1", (0.0, 0.0), (0.0, 10.0)),
            line_plot("2", (5.0, 0.0), (5.0, 10.0)),
        ];
        let route = RouteSequencer::new().with_start("1").sequence(plots).unwrap();
        assert_eq!(route[1].guide_line()[0], *route[1].entry());
    }

    #[test]
    fn test_unknown_start() {
        let plots = vec![line_plot("1", (0.0, 0.0), (0.0, 10.0))];
        let err = RouteSequencer::new().with_start("9").sequence(plots).unwrap_err();
        assert!(matches!(err, TrialplanError::PlotNotFound { .. }));
    }

    #[test]
    fn test_empty_route() {
        assert!(RouteSequencer::new().sequence(Vec::new()).unwrap().is_empty());
        assert_eq!(route_length(&[]), 0.0);
    }

    #[test]
    fn test_polyline_and_length() {
        let plots = vec![
            line_plot("1", (0.0, 0.0), (0.0, 10.0)),
            line_plot("2", (3.0, 14.0), (3.0, 24.0)),
        ];
        assert_eq!(route_polyline(&plots).len(), 4);
        assert!((route_length(&plots) - 5.0).abs() < 1e-9);
    }
}
