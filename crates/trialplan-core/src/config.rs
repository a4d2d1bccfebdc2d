use crate::error::{Result, TrialplanError};
use crate::formats::csv::{CoordinateInterpretation, FIELD_DELIMITER, PLOT_DELIMITER};
use crate::geo::projection::{MAX_ZONE, MIN_ZONE};
use crate::models::{ShapeTolerance, WorkAttributes, WorkSettings};
use crate::planning::cluster::DEFAULT_THRESHOLD_FACTOR;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for trialplan
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub cluster_threshold_factor: ConfigValue<f64>,
    pub shape_tolerance: ConfigValue<ShapeTolerance>,
    pub interpretation: ConfigValue<CoordinateInterpretation>,
    pub zone: ConfigValue<Option<i32>>,
    pub plot_delimiter: ConfigValue<char>,
    pub field_delimiter: ConfigValue<char>,
    pub default_work: ConfigValue<WorkAttributes>,
    pub line_survey_projected: ConfigValue<bool>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            cluster_threshold_factor: ConfigValue::new(DEFAULT_THRESHOLD_FACTOR, ConfigSource::Default),
            shape_tolerance: ConfigValue::new(ShapeTolerance::default(), ConfigSource::Default),
            interpretation: ConfigValue::new(CoordinateInterpretation::Auto, ConfigSource::Default),
            zone: ConfigValue::new(None, ConfigSource::Default),
            plot_delimiter: ConfigValue::new(PLOT_DELIMITER, ConfigSource::Default),
            field_delimiter: ConfigValue::new(FIELD_DELIMITER, ConfigSource::Default),
            default_work: ConfigValue::new(WorkAttributes::default(), ConfigSource::Default),
            line_survey_projected: ConfigValue::new(true, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| TrialplanError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| TrialplanError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(factor) = file_config.cluster_threshold_factor {
            self.cluster_threshold_factor.update(check_factor(factor)?, ConfigSource::File);
        }

        if let Some(tolerance) = file_config.shape_tolerance {
            self.shape_tolerance.update(parse_shape_tolerance(&tolerance)?, ConfigSource::File);
        }

        if let Some(interpretation) = file_config.interpretation {
            self.interpretation.update(interpretation, ConfigSource::File);
        }

        if let Some(zone) = file_config.zone {
            self.zone.update(Some(check_zone(zone)?), ConfigSource::File);
        }

        if let Some(delimiter) = file_config.plot_delimiter {
            self.plot_delimiter.update(parse_delimiter("plot_delimiter", &delimiter)?, ConfigSource::File);
        }

        if let Some(delimiter) = file_config.field_delimiter {
            self.field_delimiter
                .update(parse_delimiter("field_delimiter", &delimiter)?, ConfigSource::File);
        }

        if let Some(settings) = file_config.default_work {
            let work = self.default_work.value.patched(&settings).map_err(|e| {
                TrialplanError::ConfigInvalid { key: "default_work".to_string(), reason: e.to_string() }
            })?;
            self.default_work.update(work, ConfigSource::File);
        }

        if let Some(projected) = file_config.line_survey_projected {
            self.line_survey_projected.update(projected, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // TRIALPLAN_CLUSTER_THRESHOLD_FACTOR
        if let Ok(factor_str) = env::var("TRIALPLAN_CLUSTER_THRESHOLD_FACTOR") {
            match factor_str.parse::<f64>().map_err(|_| ()).and_then(|f| check_factor(f).map_err(|_| ())) {
                Ok(factor) => self.cluster_threshold_factor.update(factor, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid TRIALPLAN_CLUSTER_THRESHOLD_FACTOR value '{}': expected positive number",
                    factor_str
                ),
            }
        }

        // TRIALPLAN_SHAPE_TOLERANCE
        if let Ok(tolerance_str) = env::var("TRIALPLAN_SHAPE_TOLERANCE") {
            match parse_shape_tolerance(&tolerance_str) {
                Ok(tolerance) => self.shape_tolerance.update(tolerance, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid TRIALPLAN_SHAPE_TOLERANCE value '{}': expected e.g. 5% or 0.05m",
                    tolerance_str
                ),
            }
        }

        // TRIALPLAN_INTERPRETATION
        if let Ok(interpretation_str) = env::var("TRIALPLAN_INTERPRETATION") {
            match interpretation_str.parse::<CoordinateInterpretation>() {
                Ok(interpretation) => {
                    self.interpretation.update(interpretation, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid TRIALPLAN_INTERPRETATION value '{}': expected auto, projected, or geographic",
                    interpretation_str
                ),
            }
        }

        // TRIALPLAN_ZONE
        if let Ok(zone_str) = env::var("TRIALPLAN_ZONE") {
            match zone_str.parse::<i32>().map_err(|_| ()).and_then(|z| check_zone(z).map_err(|_| ())) {
                Ok(zone) => self.zone.update(Some(zone), ConfigSource::Environment),
                Err(_) => tracing::warn!("Invalid TRIALPLAN_ZONE value '{}': expected 1..=60", zone_str),
            }
        }

        // TRIALPLAN_PLOT_DELIMITER / TRIALPLAN_FIELD_DELIMITER
        if let Ok(delimiter_str) = env::var("TRIALPLAN_PLOT_DELIMITER") {
            match parse_delimiter("plot_delimiter", &delimiter_str) {
                Ok(delimiter) => self.plot_delimiter.update(delimiter, ConfigSource::Environment),
                Err(e) => tracing::warn!("Invalid TRIALPLAN_PLOT_DELIMITER: {}", e),
            }
        }
        if let Ok(delimiter_str) = env::var("TRIALPLAN_FIELD_DELIMITER") {
            match parse_delimiter("field_delimiter", &delimiter_str) {
                Ok(delimiter) => self.field_delimiter.update(delimiter, ConfigSource::Environment),
                Err(e) => tracing::warn!("Invalid TRIALPLAN_FIELD_DELIMITER: {}", e),
            }
        }

        // TRIALPLAN_WORKING_SPEED, TRIALPLAN_HITCH_HEIGHT, TRIALPLAN_PTO_RPM
        let settings = WorkSettings {
            working_speed: env_number("TRIALPLAN_WORKING_SPEED"),
            hitch_height: env_number("TRIALPLAN_HITCH_HEIGHT"),
            pto_rpm: env_number("TRIALPLAN_PTO_RPM"),
            ..Default::default()
        };
        if !settings.is_empty() {
            match self.default_work.value.patched(&settings) {
                Ok(work) => self.default_work.update(work, ConfigSource::Environment),
                Err(e) => tracing::warn!("Ignoring work settings from environment: {}", e),
            }
        }

        // TRIALPLAN_LINE_SURVEY_PROJECTED
        if let Ok(projected_str) = env::var("TRIALPLAN_LINE_SURVEY_PROJECTED") {
            match parse_bool(&projected_str) {
                Some(projected) => {
                    self.line_survey_projected.update(projected, ConfigSource::Environment)
                }
                None => tracing::warn!(
                    "Invalid TRIALPLAN_LINE_SURVEY_PROJECTED value '{}': expected true or false",
                    projected_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments. Nothing is applied if any
    /// override is out of range.
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) -> Result<()> {
        let zone = overrides.zone.map(check_zone).transpose()?;
        let factor = overrides.cluster_threshold_factor.map(check_factor).transpose()?;

        if let Some(interpretation) = overrides.interpretation {
            self.interpretation.update(interpretation, ConfigSource::Cli);
        }

        if let Some(zone) = zone {
            self.zone.update(Some(zone), ConfigSource::Cli);
        }

        if let Some(factor) = factor {
            self.cluster_threshold_factor.update(factor, ConfigSource::Cli);
        }

        if overrides.geographic_lines {
            self.line_survey_projected.update(false, ConfigSource::Cli);
        }
        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "cluster_threshold_factor".to_string(),
            (self.cluster_threshold_factor.value.to_string(), self.cluster_threshold_factor.source),
        );

        map.insert(
            "shape_tolerance".to_string(),
            (format_shape_tolerance(self.shape_tolerance.value), self.shape_tolerance.source),
        );

        map.insert(
            "interpretation".to_string(),
            (self.interpretation.value.to_string(), self.interpretation.source),
        );

        let zone = match self.zone.value {
            Some(zone) => zone.to_string(),
            None => "estimated".to_string(),
        };
        map.insert("zone".to_string(), (zone, self.zone.source));

        map.insert(
            "plot_delimiter".to_string(),
            (self.plot_delimiter.value.to_string(), self.plot_delimiter.source),
        );

        map.insert(
            "field_delimiter".to_string(),
            (self.field_delimiter.value.to_string(), self.field_delimiter.source),
        );

        let work = &self.default_work.value;
        map.insert(
            "default_work".to_string(),
            (
                format!(
                    "work={} speed={} km/h hitch={} m pto={} rpm",
                    work.work, work.working_speed, work.hitch_height, work.pto_rpm
                ),
                self.default_work.source,
            ),
        );

        map.insert(
            "line_survey_projected".to_string(),
            (self.line_survey_projected.value.to_string(), self.line_survey_projected.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    cluster_threshold_factor: Option<f64>,
    shape_tolerance: Option<String>,
    interpretation: Option<CoordinateInterpretation>,
    zone: Option<i32>,
    plot_delimiter: Option<String>,
    field_delimiter: Option<String>,
    default_work: Option<WorkSettings>,
    line_survey_projected: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub interpretation: Option<CoordinateInterpretation>,
    pub zone: Option<i32>,
    pub cluster_threshold_factor: Option<f64>,
    /// Write line-survey positions as longitude/latitude
    pub geographic_lines: bool,
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    let parsed = raw.parse::<T>().ok();
    if parsed.is_none() {
        tracing::warn!("Invalid {} value '{}': expected a number", key, raw);
    }
    parsed
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn check_factor(factor: f64) -> Result<f64> {
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(TrialplanError::ConfigInvalid {
            key: "cluster_threshold_factor".to_string(),
            reason: format!("must be a positive number, got {}", factor),
        })
    }
}

fn check_zone(zone: i32) -> Result<i32> {
    if (MIN_ZONE..=MAX_ZONE).contains(&zone) {
        Ok(zone)
    } else {
        Err(TrialplanError::ConfigInvalid {
            key: "zone".to_string(),
            reason: format!("zone must be in {}..={}, got {}", MIN_ZONE, MAX_ZONE, zone),
        })
    }
}

/// Parse a shape tolerance: `5%` is relative, `0.05` or `0.05m` is absolute
pub fn parse_shape_tolerance(s: &str) -> Result<ShapeTolerance> {
    let invalid = || TrialplanError::ConfigInvalid {
        key: "shape_tolerance".to_string(),
        reason: format!("Invalid shape tolerance: {}. Use e.g. 5% or 0.05m", s),
    };
    let s = s.trim();

    let tolerance = if let Some(percent) = s.strip_suffix('%') {
        let value: f64 = percent.trim().parse().map_err(|_| invalid())?;
        ShapeTolerance::Relative(value / 100.0)
    } else {
        let value: f64 = s.strip_suffix('m').unwrap_or(s).trim().parse().map_err(|_| invalid())?;
        ShapeTolerance::Absolute(value)
    };

    match tolerance {
        ShapeTolerance::Absolute(v) | ShapeTolerance::Relative(v) if v.is_finite() && v >= 0.0 => {
            Ok(tolerance)
        }
        _ => Err(invalid()),
    }
}

fn format_shape_tolerance(tolerance: ShapeTolerance) -> String {
    match tolerance {
        ShapeTolerance::Absolute(v) => format!("{} m", v),
        ShapeTolerance::Relative(v) => format!("{}%", v * 100.0),
    }
}

/// Parse a single-character delimiter; `\t` and `tab` mean a tab
pub fn parse_delimiter(key: &str, s: &str) -> Result<char> {
    if s == "\\t" || s.eq_ignore_ascii_case("tab") {
        return Ok('\t');
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' => Ok(c),
        _ => Err(TrialplanError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("Invalid delimiter: '{}'. Use a single ASCII character", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.cluster_threshold_factor.value, 1.5);
        assert_eq!(config.cluster_threshold_factor.source, ConfigSource::Default);
        assert_eq!(config.shape_tolerance.value, ShapeTolerance::Relative(0.05));
        assert_eq!(config.plot_delimiter.value, ';');
        assert_eq!(config.field_delimiter.value, ',');
        assert_eq!(config.zone.value, None);
        assert!(config.line_survey_projected.value);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400); // Still CLI value
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
cluster_threshold_factor = 2.0
shape_tolerance = "0.1m"
interpretation = "projected"
zone = 32
plot_delimiter = "\t"
line_survey_projected = false

[default_work]
working_speed = 2.5
pto_rpm = 540
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.cluster_threshold_factor.value, 2.0);
        assert_eq!(config.cluster_threshold_factor.source, ConfigSource::File);
        assert_eq!(config.shape_tolerance.value, ShapeTolerance::Absolute(0.1));
        assert_eq!(config.interpretation.value, CoordinateInterpretation::Projected);
        assert_eq!(config.zone.value, Some(32));
        assert_eq!(config.plot_delimiter.value, '\t');
        assert_eq!(config.field_delimiter.source, ConfigSource::Default);
        assert_eq!(config.default_work.value.working_speed, 2.5);
        assert_eq!(config.default_work.value.pto_rpm, 540);
        assert_eq!(config.default_work.value.hitch_height, 0.6);
        assert!(!config.line_survey_projected.value);
    }

    #[test]
    fn test_file_with_out_of_range_work_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[default_work]\nhitch_height = 1.2").unwrap();

        let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, TrialplanError::ConfigInvalid { ref key, .. } if key == "default_work"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            interpretation: Some(CoordinateInterpretation::Geographic),
            zone: Some(33),
            cluster_threshold_factor: None,
            geographic_lines: true,
        };

        config.update_from_cli(overrides).unwrap();

        assert_eq!(config.interpretation.value, CoordinateInterpretation::Geographic);
        assert_eq!(config.interpretation.source, ConfigSource::Cli);
        assert_eq!(config.zone.value, Some(33));
        assert!(!config.line_survey_projected.value);
        // These should still be defaults
        assert_eq!(config.cluster_threshold_factor.source, ConfigSource::Default);
        assert_eq!(config.default_work.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_threshold_factor_override() {
        let mut config = LayeredConfig::with_defaults();
        config
            .update_from_cli(CliConfigOverrides {
                cluster_threshold_factor: Some(2.5),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.cluster_threshold_factor.value, 2.5);
        assert_eq!(config.cluster_threshold_factor.source, ConfigSource::Cli);
    }

    #[test]
    fn test_invalid_cli_overrides_change_nothing() {
        let mut config = LayeredConfig::with_defaults();
        let err = config
            .update_from_cli(CliConfigOverrides {
                interpretation: Some(CoordinateInterpretation::Projected),
                cluster_threshold_factor: Some(-1.0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TrialplanError::ConfigInvalid { ref key, .. } if key == "cluster_threshold_factor"));
        assert_eq!(config.interpretation.source, ConfigSource::Default);

        let err = config
            .update_from_cli(CliConfigOverrides { zone: Some(61), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, TrialplanError::ConfigInvalid { ref key, .. } if key == "zone"));
        assert_eq!(config.zone.value, None);
    }

    #[test]
    fn test_parse_shape_tolerance() {
        assert_eq!(parse_shape_tolerance("5%").unwrap(), ShapeTolerance::Relative(0.05));
        assert_eq!(parse_shape_tolerance("0.05").unwrap(), ShapeTolerance::Absolute(0.05));
        assert_eq!(parse_shape_tolerance("0.2 m").unwrap(), ShapeTolerance::Absolute(0.2));
        assert!(parse_shape_tolerance("-1").is_err());
        assert!(parse_shape_tolerance("wide").is_err());
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("plot_delimiter", ";").unwrap(), ';');
        assert_eq!(parse_delimiter("plot_delimiter", "tab").unwrap(), '\t');
        assert!(parse_delimiter("plot_delimiter", ";;").is_err());
        assert!(parse_delimiter("plot_delimiter", "").is_err());
        assert!(parse_delimiter("plot_delimiter", "\"").is_err());
        assert!(parse_delimiter("plot_delimiter", "§").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("cluster_threshold_factor"));
        assert!(map.contains_key("default_work"));
        assert!(map.contains_key("line_survey_projected"));

        let (tolerance, source) = &map["shape_tolerance"];
        assert_eq!(tolerance, "5%");
        assert_eq!(*source, ConfigSource::Default);
        assert_eq!(map["zone"].0, "estimated");
    }
}
