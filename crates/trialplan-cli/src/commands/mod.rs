//! Command implementations

mod config;
mod inspect;
mod plan;

use crate::cli::{Cli, Commands, ImportArgs};
use crate::config_loader;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use trialplan_core::config::{CliConfigOverrides, LayeredConfig};
use trialplan_core::formats::CsvOptions;
use trialplan_core::{PlanningSession, SessionOptions};

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Plan(args) => plan::execute(args, &output),
        Commands::Inspect(args) => inspect::execute(args, &output),
        Commands::Config(args) => config::execute(args, &output),
    }
}

fn overrides(args: &ImportArgs, geographic_lines: bool) -> CliConfigOverrides {
    CliConfigOverrides {
        interpretation: args.interpretation.map(Into::into),
        zone: args.zone,
        cluster_threshold_factor: args.cluster_threshold_factor,
        geographic_lines,
    }
}

/// Import plots (and the field, if given) and run the planner
fn plan_session(args: &ImportArgs, config: &LayeredConfig) -> Result<PlanningSession> {
    let plot_options = CsvOptions::plots()
        .with_delimiter(config.plot_delimiter.value)
        .with_interpretation(config.interpretation.value)
        .with_zone(config.zone.value);

    let mut session =
        PlanningSession::import_plots(&args.plots, &plot_options, SessionOptions::from(config))
            .with_context(|| format!("Failed to import plots from {}", args.plots.display()))?;

    if let Some(field) = &args.field {
        let field_options = CsvOptions::field()
            .with_delimiter(config.field_delimiter.value)
            .with_interpretation(config.interpretation.value)
            .with_zone(config.zone.value);
        session
            .import_field(field, &field_options)
            .with_context(|| format!("Failed to import field from {}", field.display()))?;
    }

    session.plan(args.start.as_deref()).context("Failed to plan route")?;
    Ok(session)
}

/// Load configuration for an import command
fn load_import_config(args: &ImportArgs, geographic_lines: bool) -> Result<LayeredConfig> {
    config_loader::load_config_with_overrides(args.config.as_deref(), overrides(args, geographic_lines))
}
