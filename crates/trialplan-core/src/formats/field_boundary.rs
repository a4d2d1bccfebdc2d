//! Field boundary export: `{"field": [{"latitude", "longitude"}, ...]}`

use serde::Serialize;

use crate::error::Result;
use crate::formats::route_control::LatLon;
use crate::formats::FormatWriter;
use crate::models::Field;

#[derive(Debug, Serialize)]
struct FieldDocument {
    field: Vec<LatLon>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldBoundaryWriter;

impl FormatWriter for FieldBoundaryWriter {
    type Input = Field;

    fn format_name(&self) -> &str {
        "Field boundary"
    }

    fn default_file_name(&self) -> &str {
        "field.json"
    }

    fn to_json(&self, field: &Field) -> Result<serde_json::Value> {
        let document = FieldDocument { field: field.points().iter().map(LatLon::from).collect() };
        Ok(serde_json::to_value(document)?)
    }
}
