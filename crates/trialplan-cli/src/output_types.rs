//! Structured output of the commands, shared by the table and JSON views

use serde::Serialize;
use tabled::Tabled;
use trialplan_core::models::Plot;
use trialplan_core::{PlanningSession, Warning};

/// One plot as shown by `inspect` and returned by `plan --json`
#[derive(Debug, Serialize, Tabled)]
pub struct PlotRow {
    #[tabled(rename = "#")]
    pub position: usize,
    #[tabled(rename = "Plot")]
    pub id: String,
    #[tabled(rename = "Block")]
    pub block: String,
    #[tabled(rename = "Width (m)")]
    pub width: String,
    #[tabled(rename = "Length (m)")]
    pub length: String,
    #[tabled(rename = "Entry")]
    pub entry: String,
    #[tabled(rename = "Exit")]
    pub exit: String,
    #[tabled(rename = "Work")]
    pub work: bool,
    #[tabled(rename = "Ignored")]
    pub ignored: bool,
}

impl PlotRow {
    fn new(position: usize, plot: &Plot, session: &PlanningSession) -> Self {
        Self {
            position,
            id: plot.id().to_string(),
            block: session.block_of(plot.id()).map(|b| b.to_string()).unwrap_or_default(),
            width: plot.width().map(|w| format!("{:.2}", w)).unwrap_or_default(),
            length: format!("{:.2}", plot.length()),
            entry: plot.entry().to_string(),
            exit: plot.exit().to_string(),
            work: plot.work().work,
            ignored: plot.work().ignored,
        }
    }

    /// Rows in driving order, positions starting at 1
    pub fn from_route(session: &PlanningSession) -> Vec<Self> {
        session.route().iter().enumerate().map(|(i, p)| Self::new(i + 1, p, session)).collect()
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct RejectionRow {
    #[tabled(rename = "Plot")]
    pub plot_id: String,
    #[tabled(rename = "Reason")]
    pub reason: String,
}

impl RejectionRow {
    pub fn from_session(session: &PlanningSession) -> Vec<Self> {
        session
            .rejections()
            .iter()
            .map(|r| Self { plot_id: r.plot_id.clone(), reason: r.error.to_string() })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub plots: Vec<PlotRow>,
    pub blocks: usize,
    pub route_length: f64,
    pub rejected: Vec<RejectionRow>,
    pub warnings: Vec<Warning>,
    /// Paths of the files written, empty for `inspect`
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
