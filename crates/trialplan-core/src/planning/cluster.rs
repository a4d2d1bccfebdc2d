//! Grouping plots into blocks by connected components of a proximity graph.
//!
//! Two plots are neighbours when their centers are closer than a threshold
//! derived from the median plot width. Blocks are the connected components of
//! that graph.

use crate::error::{Result, TrialplanError};
use crate::models::{Block, BlockOrdering, Plot};

pub const DEFAULT_THRESHOLD_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy)]
pub struct BlockClusterer {
    threshold_factor: f64,
    ordering: BlockOrdering,
}

impl Default for BlockClusterer {
    fn default() -> Self {
        Self { threshold_factor: DEFAULT_THRESHOLD_FACTOR, ordering: BlockOrdering::Input }
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

impl BlockClusterer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multiple of the median plot width below which two centers are adjacent
    pub fn with_threshold_factor(mut self, factor: f64) -> Self {
        self.threshold_factor = factor;
        self
    }

    /// Order applied to the plots of each block after clustering
    pub fn with_ordering(mut self, ordering: BlockOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Adjacency distance for a plot set: factor × median width.
    ///
    /// Plots without a known width (re-hydrated without one) do not take part
    /// in the median.
    pub fn threshold(&self, plots: &[Plot]) -> Result<f64> {
        if plots.is_empty() {
            return Err(TrialplanError::InsufficientData {
                reason: "cannot cluster an empty plot set".to_string(),
            });
        }
        let mut widths: Vec<f64> = plots.iter().filter_map(Plot::width).collect();
        let median_width = median(&mut widths).ok_or_else(|| TrialplanError::InsufficientData {
            reason: "no plot has a known width".to_string(),
        })?;
        Ok(self.threshold_factor * median_width)
    }

    /// Adjacency lists over plot indices: i and j are adjacent iff
    /// 0 < distance(center_i, center_j) < threshold
    pub fn adjacency(plots: &[Plot], threshold: f64) -> Vec<Vec<usize>> {
        let n = plots.len();
        let mut adjacency = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = plots[i].center().distance(plots[j].center());
                if d > 0.0 && d < threshold {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }
        for neighbours in &mut adjacency {
            neighbours.sort_unstable();
        }
        adjacency
    }

    /// Cluster id per plot, in input order. Ids start at 1 and increase in the
    /// order their first member appears.
    pub fn assign(&self, plots: &[Plot]) -> Result<Vec<u32>> {
        let threshold = self.threshold(plots)?;
        let adjacency = Self::adjacency(plots, threshold);
        tracing::debug!(plots = plots.len(), threshold, "Clustering plots into blocks");

        let mut cluster_ids = vec![0u32; plots.len()];
        let mut next_id = 0u32;
        let mut stack = Vec::new();

        for seed in 0..plots.len() {
            if cluster_ids[seed] != 0 {
                continue;
            }
            next_id += 1;
            cluster_ids[seed] = next_id;
            stack.push(seed);

            while let Some(current) = stack.pop() {
                // Reverse so neighbours are visited in ascending index order
                for &neighbour in adjacency[current].iter().rev() {
                    if cluster_ids[neighbour] == 0 {
                        cluster_ids[neighbour] = next_id;
                        stack.push(neighbour);
                    }
                }
            }
        }

        Ok(cluster_ids)
    }

    /// Partition plots into blocks, ascending by id, members in input order
    pub fn cluster(&self, plots: &[Plot]) -> Result<Vec<Block>> {
        let cluster_ids = self.assign(plots)?;
        let block_count = cluster_ids.iter().copied().max().unwrap_or(0);

        let mut members: Vec<Vec<Plot>> = vec![Vec::new(); block_count as usize];
        for (plot, id) in plots.iter().zip(&cluster_ids) {
            members[(*id - 1) as usize].push(plot.clone());
        }

        let blocks: Vec<Block> = members
            .into_iter()
            .enumerate()
            .map(|(index, plots)| {
                let mut block = Block::new(index as u32 + 1, plots);
                block.sort_plots(self.ordering);
                block
            })
            .collect();

        tracing::debug!(blocks = blocks.len(), "Clustering complete");
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, WorkAttributes};

    fn plot_centered(id: &str, east: f64, north: f64, width: f64) -> Plot {
        let at = |n: f64| {
            Coordinate::from_projected(500_000.0 + east, 6_000_000.0 + north + n, Some(32))
                .unwrap()
                .value
        };
        let (a, b) = (at(-5.0), at(5.0));
        Plot::from_guide_line([a, b], [a, b], Some(width), id, WorkAttributes::default())
            .unwrap()
            .value
    }

    fn ids(block: &Block) -> Vec<&str> {
        block.plots().iter().map(Plot::id).collect()
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_two_groups() {
        let plots = vec![
            plot_centered("1", 0.0, 0.0, 1.0),
            plot_centered("2", 1.0, 0.0, 1.0),
            plot_centered("3", 2.0, 0.0, 1.0),
            plot_centered("4", 100.0, 100.0, 1.0),
            plot_centered("5", 101.0, 100.0, 1.0),
        ];
        let clusterer = BlockClusterer::new();
        assert!((clusterer.threshold(&plots).unwrap() - 1.5).abs() < 1e-12);

        let blocks = clusterer.cluster(&plots).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id(), 1);
        assert_eq!(ids(&blocks[0]), vec!["1", "2", "3"]);
        assert_eq!(blocks[1].id(), 2);
        assert_eq!(ids(&blocks[1]), vec!["4", "5"]);
    }

    #[test]
    fn test_singletons_get_their_own_blocks() {
        let plots = vec![
            plot_centered("a", 0.0, 0.0, 1.0),
            plot_centered("b", 50.0, 0.0, 1.0),
            plot_centered("c", 100.0, 0.0, 1.0),
        ];
        let blocks = BlockClusterer::new().cluster(&plots).unwrap();
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn test_members_keep_input_order() {
        // Chain 3 - 1 - 2 along the east axis, supplied out of spatial order
        let plots = vec![
            plot_centered("1", 1.0, 0.0, 1.0),
            plot_centered("far", 80.0, 0.0, 1.0),
            plot_centered("2", 2.0, 0.0, 1.0),
            plot_centered("3", 0.0, 0.0, 1.0),
        ];
        let blocks = BlockClusterer::new().cluster(&plots).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(ids(&blocks[0]), vec!["1", "2", "3"]);
        assert_eq!(ids(&blocks[1]), vec!["far"]);
    }

    #[test]
    fn test_coincident_centers_are_not_adjacent() {
        let plots = vec![plot_centered("a", 0.0, 0.0, 1.0), plot_centered("b", 0.0, 0.0, 1.0)];
        let blocks = BlockClusterer::new().cluster(&plots).unwrap();
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly 1.5 apart with width 1 is not adjacent
        let plots = vec![plot_centered("a", 0.0, 0.0, 1.0), plot_centered("b", 1.5, 0.0, 1.0)];
        assert_eq!(BlockClusterer::new().cluster(&plots).unwrap().len(), 2);

        let wider = BlockClusterer::new().with_threshold_factor(2.0);
        assert_eq!(wider.cluster(&plots).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            BlockClusterer::new().cluster(&[]),
            Err(TrialplanError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_blocks_partition_plots() {
        let plots: Vec<Plot> = (0..20)
            .map(|i| plot_centered(&i.to_string(), f64::from(i % 7) * 3.0, f64::from(i / 7), 1.0))
            .collect();
        let blocks = BlockClusterer::new().cluster(&plots).unwrap();
        let total: usize = blocks.iter().map(Block::len).sum();
        assert_eq!(total, plots.len());
        for plot in &plots {
            assert_eq!(blocks.iter().filter(|b| b.contains(plot.id())).count(), 1);
        }
    }
}
