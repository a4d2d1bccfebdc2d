//! One import-plan-export cycle.
//!
//! A [`PlanningSession`] owns everything derived from one plot import: the
//! plots that could be built, the ones that could not, the blocks, the driving
//! route and every warning raised on the way. Nothing is shared between
//! sessions.

use std::path::Path;

use crate::config::LayeredConfig;
use crate::diagnostics::{Outcome, Warning};
use crate::error::{Result, TrialplanError};
use crate::formats::csv::{self, CornerGroup, CsvOptions};
use crate::models::{Block, Field, Plot, ShapeTolerance, WorkAttributes, WorkSettings};
use crate::planning::{BlockClusterer, RouteSequencer};

/// A plot that could not be built; its siblings are unaffected
#[derive(Debug)]
pub struct PlotRejection {
    pub plot_id: String,
    pub error: TrialplanError,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub clusterer: BlockClusterer,
    pub shape_tolerance: ShapeTolerance,
    /// Work attributes given to every imported plot
    pub default_work: WorkAttributes,
}

impl From<&LayeredConfig> for SessionOptions {
    fn from(config: &LayeredConfig) -> Self {
        Self {
            clusterer: BlockClusterer::new()
                .with_threshold_factor(config.cluster_threshold_factor.value),
            shape_tolerance: config.shape_tolerance.value,
            default_work: config.default_work.value,
        }
    }
}

#[derive(Debug, Default)]
pub struct PlanningSession {
    options: SessionOptions,
    plots: Vec<Plot>,
    rejections: Vec<PlotRejection>,
    blocks: Vec<Block>,
    route: Vec<Plot>,
    start_id: Option<String>,
    planned: bool,
    field: Option<Field>,
    warnings: Vec<Warning>,
}

impl PlanningSession {
    /// Build plots from grouped corners. Groups that do not form a valid plot
    /// are recorded as rejections.
    pub fn from_corner_groups(groups: Outcome<Vec<CornerGroup>>, options: SessionOptions) -> Self {
        let mut session = Self { options, warnings: groups.warnings, ..Default::default() };

        for group in groups.value {
            match Plot::from_corners_with_tolerance(
                &group.corners,
                group.plot_id.clone(),
                options.default_work,
                options.shape_tolerance,
            ) {
                Ok(plot) => {
                    let plot = plot.collect_into(&mut session.warnings);
                    session.plots.push(plot);
                }
                Err(error) => {
                    tracing::warn!(plot_id = %group.plot_id, "Plot rejected: {}", error);
                    session.rejections.push(PlotRejection { plot_id: group.plot_id, error });
                }
            }
        }

        tracing::debug!(
            plots = session.plots.len(),
            rejected = session.rejections.len(),
            "Plots imported"
        );
        session
    }

    /// Read a plot file and build its plots
    pub fn import_plots(path: &Path, csv_options: &CsvOptions, options: SessionOptions) -> Result<Self> {
        let records = csv::read_plot_records(path, csv_options)?;
        let mut warnings = records.warnings;
        let groups = csv::group_by_plot(records.value);
        warnings.extend(groups.warnings);

        Ok(Self::from_corner_groups(Outcome::with_warnings(groups.value, warnings), options))
    }

    /// Read a field boundary file into this session
    pub fn import_field(&mut self, path: &Path, csv_options: &CsvOptions) -> Result<()> {
        let points = csv::read_field_points(path, csv_options)?.collect_into(&mut self.warnings);
        self.field = Some(Field::new(points)?);
        Ok(())
    }

    pub fn set_field(&mut self, field: Field) {
        self.field = Some(field);
    }

    /// Cluster the plots into blocks and sequence the route.
    ///
    /// The route visits the blocks in ascending id order; within a block the
    /// plots keep their block order until the sequencer rotates and orients
    /// them.
    pub fn plan(&mut self, start_id: Option<&str>) -> Result<()> {
        let blocks = self.options.clusterer.cluster(&self.plots)?;

        let sequencer = match start_id {
            Some(id) => RouteSequencer::new().with_start(id),
            None => RouteSequencer::new(),
        };
        let ordered: Vec<Plot> = blocks.iter().flat_map(|b| b.plots().iter().cloned()).collect();
        let route = sequencer.sequence(ordered)?;

        tracing::debug!(blocks = blocks.len(), plots = route.len(), "Plan ready");
        self.blocks = blocks;
        self.route = route;
        self.start_id = start_id.map(str::to_string);
        self.planned = true;
        Ok(())
    }

    /// Apply a settings patch to one plot, or to all plots when `plot_id` is
    /// `None`. Nothing changes if any patched plot would become invalid.
    pub fn apply_settings(&mut self, plot_id: Option<&str>, settings: &WorkSettings) -> Result<()> {
        let targets: Vec<usize> = match plot_id {
            Some(id) => {
                let index = self.plots.iter().position(|p| p.id() == id).ok_or_else(|| {
                    TrialplanError::PlotNotFound { plot_id: id.to_string() }
                })?;
                vec![index]
            }
            None => (0..self.plots.len()).collect(),
        };

        let mut patched = Vec::with_capacity(targets.len());
        for &index in &targets {
            let mut plot = self.plots[index].clone();
            plot.set_work(settings)?;
            patched.push((index, plot));
        }
        for (index, plot) in patched {
            self.plots[index] = plot;
        }

        // Blocks and route hold copies; rebuild them so they see the new settings
        if self.planned {
            let start_id = self.start_id.clone();
            self.plan(start_id.as_deref())?;
        }
        Ok(())
    }

    /// Plots in import order
    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn rejections(&self) -> &[PlotRejection] {
        &self.rejections
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Plots in driving order, empty until [`PlanningSession::plan`] has run
    pub fn route(&self) -> &[Plot] {
        &self.route
    }

    pub fn field(&self) -> Option<&Field> {
        self.field.as_ref()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn block_of(&self, plot_id: &str) -> Option<u32> {
        self.blocks.iter().find(|b| b.contains(plot_id)).map(Block::id)
    }
}
