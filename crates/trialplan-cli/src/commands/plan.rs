//! Plan command implementation

use super::{load_import_config, plan_session};
use crate::cli::PlanArgs;
use crate::output::OutputWriter;
use crate::output_types::{PlanOutput, PlotRow, RejectionRow};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use trialplan_core::formats::{FieldBoundaryWriter, FormatWriter, LineSurveyWriter, RouteControlWriter};
use trialplan_core::planning::route_length;

fn write_export<W: FormatWriter + ?Sized>(
    writer: &W,
    input: &W::Input,
    out_dir: &Path,
    written: &mut Vec<String>,
) -> Result<()> {
    let path = out_dir.join(writer.default_file_name());
    writer
        .write(input, &path)
        .with_context(|| format!("Failed to write {} to {}", writer.format_name(), path.display()))?;
    written.push(path.display().to_string());
    Ok(())
}

pub fn execute(args: PlanArgs, output: &OutputWriter) -> Result<()> {
    if args.out_dir.exists() && !args.out_dir.is_dir() {
        bail!("Output path {} is not a directory", args.out_dir.display());
    }
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let config = load_import_config(&args.import, args.geographic_lines)?;
    let session = plan_session(&args.import, &config)?;

    let mut written = Vec::new();
    write_export(&RouteControlWriter, session.route(), &args.out_dir, &mut written)?;
    let line_writer = LineSurveyWriter { projected: config.line_survey_projected.value };
    write_export(&line_writer, session.route(), &args.out_dir, &mut written)?;
    if let Some(field) = session.field() {
        write_export(&FieldBoundaryWriter, field, &args.out_dir, &mut written)?;
    }

    let total = route_length(session.route());

    if output.is_json() {
        output.result(PlanOutput {
            plots: PlotRow::from_route(&session),
            blocks: session.blocks().len(),
            route_length: total,
            rejected: RejectionRow::from_session(&session),
            warnings: session.warnings().to_vec(),
            files: written,
        })?;
        return Ok(());
    }

    for warning in session.warnings() {
        output.warning(warning);
    }
    for rejection in session.rejections() {
        output.error(format!("Plot {} skipped: {}", rejection.plot_id, rejection.error));
    }

    output.success(format!(
        "Planned {} plots in {} blocks",
        session.route().len(),
        session.blocks().len()
    ));
    output.info(format!("Distance between plots: {:.1} m", total));
    for path in &written {
        output.info(format!("Wrote {}", path));
    }
    Ok(())
}
