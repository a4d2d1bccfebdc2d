//! Inspect command implementation

use super::{load_import_config, plan_session};
use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use crate::output_types::{PlanOutput, PlotRow, RejectionRow};
use anyhow::Result;
use trialplan_core::planning::route_length;

pub fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    let config = load_import_config(&args.import, false)?;
    let session = plan_session(&args.import, &config)?;

    let rows = PlotRow::from_route(&session);
    let rejected = RejectionRow::from_session(&session);
    let total = route_length(session.route());

    if output.is_json() {
        return output.result(PlanOutput {
            plots: rows,
            blocks: session.blocks().len(),
            route_length: total,
            rejected,
            warnings: session.warnings().to_vec(),
            files: Vec::new(),
        });
    }

    output.section("Route");
    output.table(rows);

    output.section("Summary");
    output.kv("Plots", session.route().len());
    output.kv("Blocks", session.blocks().len());
    output.kv("Distance between plots", format!("{:.1} m", total));
    if let Some(field) = session.field() {
        output.kv("Field points", field.points().len());
    }

    if !rejected.is_empty() {
        output.section("Rejected plots");
        output.table(rejected);
    }

    if !session.warnings().is_empty() {
        output.section("Warnings");
        for warning in session.warnings() {
            output.warning(warning);
        }
    }
    Ok(())
}
