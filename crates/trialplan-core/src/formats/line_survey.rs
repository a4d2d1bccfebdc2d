//! Line-survey export: the AB lines of all plots as one GeoJSON
//! `MultiLineString` geometry.

use geojson::{Geometry, Value};

use crate::error::Result;
use crate::formats::FormatWriter;
use crate::models::{Coordinate, Plot};

#[derive(Debug, Clone, Copy)]
pub struct LineSurveyWriter {
    /// Positions as `[east, north]` when true, `[longitude, latitude]` otherwise
    pub projected: bool,
}

impl Default for LineSurveyWriter {
    fn default() -> Self {
        Self { projected: true }
    }
}

impl LineSurveyWriter {
    pub fn geographic() -> Self {
        Self { projected: false }
    }

    fn position(&self, c: &Coordinate) -> Vec<f64> {
        if self.projected {
            vec![c.east(), c.north()]
        } else {
            vec![c.longitude(), c.latitude()]
        }
    }

    pub fn geometry(&self, plots: &[Plot]) -> Geometry {
        let lines = plots
            .iter()
            .map(|plot| plot.guide_line().iter().map(|c| self.position(c)).collect())
            .collect();
        Geometry::new(Value::MultiLineString(lines))
    }
}

impl FormatWriter for LineSurveyWriter {
    type Input = [Plot];

    fn format_name(&self) -> &str {
        "Line survey"
    }

    fn default_file_name(&self) -> &str {
        "line_survey.json"
    }

    fn to_json(&self, plots: &[Plot]) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.geometry(plots))?)
    }
}
