//! Route-control plan: the document the field robot drives from.
//!
//! One row per plot, in driving order. Each row carries the plot's AB line
//! and a single plot entry with its end-points and work settings. Flags are
//! written as 0/1 integers.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Outcome;
use crate::error::Result;
use crate::formats::FormatWriter;
use crate::models::{Coordinate, Plot, WorkAttributes};

mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Coordinate> for LatLon {
    fn from(c: &Coordinate) -> Self {
        Self { latitude: c.latitude(), longitude: c.longitude() }
    }
}

impl LatLon {
    fn to_coordinate(self) -> Result<Coordinate> {
        Coordinate::from_geographic(self.latitude, self.longitude, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbLine {
    #[serde(rename = "A")]
    pub a: LatLon,
    #[serde(rename = "B")]
    pub b: LatLon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlot {
    pub id: String,
    pub point_1: LatLon,
    pub point_2: LatLon,
    #[serde(with = "int_flag")]
    pub work: bool,
    pub hitch_height: f64,
    pub working_speed: f64,
    pub pto_rpm: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRow {
    pub ab_line: AbLine,
    pub plots: Vec<RoutePlot>,
    #[serde(with = "int_flag")]
    pub ignored: bool,
    #[serde(with = "int_flag")]
    pub force_direction: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteControlPlan {
    pub rows: Vec<RouteRow>,
}

impl RouteControlPlan {
    /// Build the plan from plots already in driving order
    pub fn from_plots(plots: &[Plot]) -> Self {
        let rows = plots
            .iter()
            .map(|plot| {
                let [a, b] = plot.guide_line();
                let work = plot.work();
                RouteRow {
                    ab_line: AbLine { a: a.into(), b: b.into() },
                    plots: vec![RoutePlot {
                        id: plot.id().to_string(),
                        point_1: plot.entry().into(),
                        point_2: plot.exit().into(),
                        work: work.work,
                        hitch_height: work.hitch_height,
                        working_speed: work.working_speed,
                        pto_rpm: work.pto_rpm,
                    }],
                    ignored: work.ignored,
                    force_direction: work.force_direction,
                }
            })
            .collect();
        Self { rows }
    }

    /// Re-hydrate plots from a previously exported plan, keeping row order.
    /// Corners and width are not part of the format and stay unset.
    pub fn to_plots(&self) -> Result<Outcome<Vec<Plot>>> {
        let mut plots = Vec::new();
        let mut warnings = Vec::new();

        for row in &self.rows {
            let guide_line = [row.ab_line.a.to_coordinate()?, row.ab_line.b.to_coordinate()?];
            for entry in &row.plots {
                let work = WorkAttributes {
                    work: entry.work,
                    ignored: row.ignored,
                    force_direction: row.force_direction,
                    working_speed: entry.working_speed,
                    hitch_height: entry.hitch_height,
                    pto_rpm: entry.pto_rpm,
                };
                work.validate()?;
                let end_points = [entry.point_1.to_coordinate()?, entry.point_2.to_coordinate()?];
                let plot = Plot::from_guide_line(guide_line, end_points, None, entry.id.clone(), work)?;
                plots.push(plot.collect_into(&mut warnings));
            }
        }
        Ok(Outcome::with_warnings(plots, warnings))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Writes a [`RouteControlPlan`] for a sequenced plot list
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteControlWriter;

impl FormatWriter for RouteControlWriter {
    type Input = [Plot];

    fn format_name(&self) -> &str {
        "Route control"
    }

    fn default_file_name(&self) -> &str {
        "route_control.json"
    }

    fn to_json(&self, plots: &[Plot]) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(RouteControlPlan::from_plots(plots))?)
    }
}
