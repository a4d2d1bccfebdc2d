use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use trialplan_core::formats::CoordinateInterpretation;

/// trialplan - driving plans for field-trial plots
#[derive(Parser, Debug)]
#[command(name = "trialplan")]
#[command(about = "Plan guide lines, blocks and routes for field-trial plots", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import plots, plan blocks and route, and write the exports
    Plan(PlanArgs),

    /// Show derived plots, blocks and warnings without writing anything
    Inspect(InspectArgs),

    /// Show the effective configuration and where each value comes from
    Config(ConfigArgs),
}

/// How the first two CSV columns are read
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Interpretation {
    /// Guess per row from the magnitude of the values
    Auto,
    /// North and east in metres
    Projected,
    /// Latitude and longitude in degrees
    Geographic,
}

impl From<Interpretation> for CoordinateInterpretation {
    fn from(value: Interpretation) -> Self {
        match value {
            Interpretation::Auto => CoordinateInterpretation::Auto,
            Interpretation::Projected => CoordinateInterpretation::Projected,
            Interpretation::Geographic => CoordinateInterpretation::Geographic,
        }
    }
}

/// Input options shared by `plan` and `inspect`
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Plot corner file (north|lat; east|lon; altitude; plot_id)
    #[arg(long)]
    pub plots: PathBuf,

    /// Field boundary file (north|lat, east|lon, altitude)
    #[arg(long)]
    pub field: Option<PathBuf>,

    /// Start the route at this plot id
    #[arg(long)]
    pub start: Option<String>,

    /// Coordinate interpretation of the input columns
    #[arg(long, value_enum)]
    pub interpretation: Option<Interpretation>,

    /// Projected zone of the input (estimated from east when omitted)
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=60))]
    pub zone: Option<i32>,

    /// Neighbour distance as a multiple of the median plot width
    #[arg(long)]
    pub cluster_threshold_factor: Option<f64>,

    /// Configuration file (defaults to ./trialplan.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub import: ImportArgs,

    /// Directory the exports are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Write line-survey positions as longitude/latitude instead of east/north
    #[arg(long)]
    pub geographic_lines: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub import: ImportArgs,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file (defaults to ./trialplan.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
