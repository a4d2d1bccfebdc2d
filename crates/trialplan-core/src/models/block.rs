//! Blocks: spatially contiguous groups of plots

use crate::geo::distance;
use crate::geo::midpoint::planar_mean;
use crate::models::plot::Plot;
use geo::{BoundingRect, MultiPoint, Rect};
use serde::{Deserialize, Serialize};

/// Order of plots inside a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockOrdering {
    /// Keep the order the plots were supplied in
    #[default]
    Input,
    /// Farthest plot from the block centroid first, then descending distance
    FarthestFromCentroid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    id: u32,
    plots: Vec<Plot>,
}

impl Block {
    pub fn new(id: u32, plots: Vec<Plot>) -> Self {
        Self { id, plots }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn into_plots(self) -> Vec<Plot> {
        self.plots
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    pub fn contains(&self, plot_id: &str) -> bool {
        self.plots.iter().any(|p| p.id() == plot_id)
    }

    /// Planar (east, north) mean of the plot centers
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let centers: Vec<(f64, f64)> =
            self.plots.iter().map(|p| (p.center().east(), p.center().north())).collect();
        planar_mean(&centers)
    }

    /// Re-order the plots inside this block. The sort is stable.
    pub fn sort_plots(&mut self, ordering: BlockOrdering) {
        match ordering {
            BlockOrdering::Input => {}
            BlockOrdering::FarthestFromCentroid => {
                let Some(centroid) = self.centroid() else {
                    return;
                };
                let distance_of =
                    |p: &Plot| distance::planar(centroid, (p.center().east(), p.center().north()));
                self.plots.sort_by(|a, b| distance_of(b).total_cmp(&distance_of(a)));
            }
        }
    }

    /// Geographic bounding box of all member plots
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let corners: Vec<geo::Point<f64>> = self
            .plots
            .iter()
            .filter_map(Plot::bounds)
            .flat_map(|r| [geo::Point::from(r.min()), geo::Point::from(r.max())])
            .collect();
        MultiPoint::from(corners).bounding_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, WorkAttributes};

    fn plot_at(id: &str, east: f64) -> Plot {
        let a = Coordinate::from_projected(500_000.0 + east, 6_000_000.0, Some(32)).unwrap().value;
        let b = Coordinate::from_projected(500_000.0 + east, 6_000_010.0, Some(32)).unwrap().value;
        Plot::from_guide_line([a, b], [a, b], Some(1.0), id, WorkAttributes::default())
            .unwrap()
            .value
    }

    #[test]
    fn test_input_ordering_is_a_no_op() {
        let mut block = Block::new(1, vec![plot_at("a", 0.0), plot_at("b", 1.0), plot_at("c", 5.0)]);
        block.sort_plots(BlockOrdering::Input);
        let ids: Vec<&str> = block.plots().iter().map(Plot::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_farthest_from_centroid_first() {
        // Centroid at east = 2
        let mut block = Block::new(1, vec![plot_at("a", 0.0), plot_at("b", 1.0), plot_at("c", 5.0)]);
        block.sort_plots(BlockOrdering::FarthestFromCentroid);
        let ids: Vec<&str> = block.plots().iter().map(Plot::id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_bounds_cover_all_plots() {
        let block = Block::new(2, vec![plot_at("a", 0.0), plot_at("b", 100.0)]);
        let bounds = block.bounds().unwrap();
        let first = block.plots()[0].bounds().unwrap();
        let last = block.plots()[1].bounds().unwrap();
        assert!(bounds.min().x <= first.min().x);
        assert!(bounds.max().x >= last.max().x);
        assert!(block.contains("b"));
        assert!(!block.contains("z"));
    }
}
