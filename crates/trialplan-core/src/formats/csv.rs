//! Delimited survey files.
//!
//! Files have no header. Plot files carry four columns per row
//! (`north|lat; east|lon; altitude; plot_id`), field files the first three.
//! Each plot is described by exactly four rows sharing a `plot_id`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use ::csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Outcome, Warning};
use crate::error::{Result, TrialplanError};
use crate::models::{classify_planar, Coordinate, PlanarInput};

pub const PLOT_DELIMITER: char = ';';
pub const FIELD_DELIMITER: char = ',';

/// How the first two columns of a row are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateInterpretation {
    /// Guess per row from the magnitude of the values
    #[default]
    Auto,
    /// Columns are north and east in metres
    Projected,
    /// Columns are latitude and longitude in degrees
    Geographic,
}

impl FromStr for CoordinateInterpretation {
    type Err = TrialplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(CoordinateInterpretation::Auto),
            "projected" | "utm" => Ok(CoordinateInterpretation::Projected),
            "geographic" | "latlon" => Ok(CoordinateInterpretation::Geographic),
            _ => Err(TrialplanError::ConfigInvalid {
                key: "interpretation".to_string(),
                reason: format!("Invalid interpretation: {}. Use auto, projected, or geographic", s),
            }),
        }
    }
}

impl fmt::Display for CoordinateInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateInterpretation::Auto => "auto",
            CoordinateInterpretation::Projected => "projected",
            CoordinateInterpretation::Geographic => "geographic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvOptions {
    pub delimiter: char,
    pub interpretation: CoordinateInterpretation,
    /// Zone for projected rows; estimated from east when `None`
    pub zone: Option<i32>,
}

impl CsvOptions {
    pub fn plots() -> Self {
        Self { delimiter: PLOT_DELIMITER, interpretation: CoordinateInterpretation::Auto, zone: None }
    }

    pub fn field() -> Self {
        Self { delimiter: FIELD_DELIMITER, ..Self::plots() }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_interpretation(mut self, interpretation: CoordinateInterpretation) -> Self {
        self.interpretation = interpretation;
        self
    }

    pub fn with_zone(mut self, zone: Option<i32>) -> Self {
        self.zone = zone;
        self
    }
}

/// One surveyed corner of a plot
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRecord {
    pub plot_id: String,
    pub coordinate: Coordinate,
    /// 1-based line in the source file
    pub line: usize,
}

/// Corners of one plot, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct CornerGroup {
    pub plot_id: String,
    pub corners: Vec<Coordinate>,
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(TrialplanError::ConfigInvalid {
            key: "delimiter".to_string(),
            reason: format!("delimiter must be a single ASCII character, got '{}'", delimiter),
        })
    }
}

struct RowContext<'a> {
    path: &'a Path,
    line: usize,
}

impl RowContext<'_> {
    fn error(&self, reason: impl Into<String>) -> TrialplanError {
        TrialplanError::Parse { path: self.path.to_path_buf(), line: self.line, reason: reason.into() }
    }

    /// Split the line on `delimiter`. Fields may be double-quoted; a doubled
    /// quote inside a quoted field is a literal quote.
    fn split(&self, line: &str, delimiter: u8) -> Result<StringRecord> {
        ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .trim(Trim::All)
            .from_reader(line.as_bytes())
            .records()
            .next()
            .transpose()
            .map_err(|e| self.error(e.to_string()))?
            .ok_or_else(|| self.error("empty row"))
    }

    fn number(&self, fields: &StringRecord, index: usize, name: &str) -> Result<f64> {
        let raw = fields.get(index).ok_or_else(|| self.error(format!("missing {} column", name)))?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error(format!("{} '{}' is not a number", name, raw)))
    }

    fn altitude(&self, fields: &StringRecord) -> Result<Option<f64>> {
        match fields.get(2) {
            None | Some("") => Ok(None),
            Some(_) => self.number(fields, 2, "altitude").map(Some),
        }
    }

    fn coordinate(&self, fields: &StringRecord, options: &CsvOptions) -> Result<Outcome<Coordinate>> {
        let first = self.number(fields, 0, "north/latitude")?;
        let second = self.number(fields, 1, "east/longitude")?;
        let altitude = self.altitude(fields)?;

        let outcome = match options.interpretation {
            CoordinateInterpretation::Projected => Coordinate::from_projected(second, first, options.zone),
            CoordinateInterpretation::Geographic => {
                Coordinate::from_geographic(first, second, None).map(Outcome::clean)
            }
            CoordinateInterpretation::Auto => match classify_planar(second, first) {
                PlanarInput::Geographic { latitude, longitude } => {
                    Coordinate::from_geographic(latitude, longitude, None).map(Outcome::clean)
                }
                PlanarInput::Projected { east, north } => {
                    Coordinate::from_projected(east, north, options.zone)
                }
            },
        };

        outcome
            .map(|o| o.map(|c| c.with_altitude(altitude)))
            .map_err(|e| self.error(e.to_string()))
    }
}

/// Split the non-blank lines of `content`, keeping their 1-based line numbers
fn records(content: &str, path: &Path, delimiter: char) -> Result<Vec<(usize, StringRecord)>> {
    let delimiter = delimiter_byte(delimiter)?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let line_number = index + 1;
            let fields = RowContext { path, line: line_number }.split(line, delimiter)?;
            Ok((line_number, fields))
        })
        .collect()
}

/// Keep one zone-ambiguity warning per inferred zone instead of one per row
fn push_deduplicated(warnings: &mut Vec<Warning>, seen_zones: &mut HashSet<i32>, new: Vec<Warning>) {
    for warning in new {
        match warning {
            Warning::ZoneAmbiguity { zone, .. } if !seen_zones.insert(zone) => {}
            other => warnings.push(other),
        }
    }
}

/// Parse plot rows from already loaded text. `path` is only used in errors.
pub fn parse_plot_records(
    content: &str,
    path: &Path,
    options: &CsvOptions,
) -> Result<Outcome<Vec<PlotRecord>>> {
    let mut rows = Vec::new();
    let mut warnings = Vec::new();
    let mut seen_zones = HashSet::new();

    for (line, fields) in records(content, path, options.delimiter)? {
        let ctx = RowContext { path, line };
        let plot_id = match fields.get(3) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(ctx.error("missing plot_id column")),
        };
        let coordinate = ctx.coordinate(&fields, options)?;
        push_deduplicated(&mut warnings, &mut seen_zones, coordinate.warnings);
        rows.push(PlotRecord { plot_id, coordinate: coordinate.value, line });
    }

    tracing::debug!(rows = rows.len(), path = %path.display(), "Plot records parsed");
    Ok(Outcome::with_warnings(rows, warnings))
}

pub fn read_plot_records(path: &Path, options: &CsvOptions) -> Result<Outcome<Vec<PlotRecord>>> {
    let content = fs::read_to_string(path)?;
    parse_plot_records(&content, path, options)
}

/// Parse field boundary rows; the plot id column, if present, is ignored
pub fn parse_field_points(
    content: &str,
    path: &Path,
    options: &CsvOptions,
) -> Result<Outcome<Vec<Coordinate>>> {
    let mut points = Vec::new();
    let mut warnings = Vec::new();
    let mut seen_zones = HashSet::new();

    for (line, fields) in records(content, path, options.delimiter)? {
        let coordinate = RowContext { path, line }.coordinate(&fields, options)?;
        push_deduplicated(&mut warnings, &mut seen_zones, coordinate.warnings);
        points.push(coordinate.value);
    }
    Ok(Outcome::with_warnings(points, warnings))
}

pub fn read_field_points(path: &Path, options: &CsvOptions) -> Result<Outcome<Vec<Coordinate>>> {
    let content = fs::read_to_string(path)?;
    parse_field_points(&content, path, options)
}

/// Group records by plot id.
///
/// Groups are ordered by numeric id when every id parses as an integer,
/// otherwise by text with a [`Warning::LexicalPlotOrder`].
pub fn group_by_plot(records: Vec<PlotRecord>) -> Outcome<Vec<CornerGroup>> {
    let mut grouped: BTreeMap<String, Vec<Coordinate>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.plot_id).or_default().push(record.coordinate);
    }

    let mut groups: Vec<CornerGroup> = grouped
        .into_iter()
        .map(|(plot_id, corners)| CornerGroup { plot_id, corners })
        .collect();

    let mut warnings = Vec::new();
    let numeric: Option<Vec<i64>> = groups.iter().map(|g| g.plot_id.parse::<i64>().ok()).collect();
    match numeric {
        Some(keys) => {
            let mut keyed: Vec<(i64, CornerGroup)> = keys.into_iter().zip(groups).collect();
            keyed.sort_by_key(|(key, _)| *key);
            groups = keyed.into_iter().map(|(_, group)| group).collect();
        }
        None => {
            // BTreeMap already yields text order
            if let Some(sample) =
                groups.iter().find(|g| g.plot_id.parse::<i64>().is_err())
            {
                let warning = Warning::LexicalPlotOrder { sample_id: sample.plot_id.clone() };
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    Outcome::with_warnings(groups, warnings)
}
