//! File adapters around the planning pipeline.
//!
//! Input is a header-less delimited text file of surveyed points. Output is
//! one of three JSON documents consumed by field machinery. Every writer
//! implements [`FormatWriter`] so the CLI can treat them uniformly.

use std::fs;
use std::path::Path;

use crate::error::Result;

pub mod csv;
pub mod field_boundary;
pub mod line_survey;
pub mod route_control;

pub use csv::{CoordinateInterpretation, CsvOptions, PlotRecord};
pub use field_boundary::FieldBoundaryWriter;
pub use line_survey::LineSurveyWriter;
pub use route_control::{RouteControlPlan, RouteControlWriter};

/// Writer trait shared by all export formats
pub trait FormatWriter {
    /// What the writer consumes, e.g. a plot sequence or a field
    type Input: ?Sized;

    /// Human-readable format name (e.g. "Route control")
    fn format_name(&self) -> &str;

    /// File name used when only an output directory is given
    fn default_file_name(&self) -> &str;

    /// Build the JSON document
    fn to_json(&self, input: &Self::Input) -> Result<serde_json::Value>;

    /// Write the document, pretty-printed, to `path`
    fn write(&self, input: &Self::Input, path: &Path) -> Result<()> {
        let document = self.to_json(input)?;
        let content = serde_json::to_string_pretty(&document)?;
        fs::write(path, content)?;
        tracing::debug!(format = self.format_name(), path = %path.display(), "Export written");
        Ok(())
    }
}
