//! Non-fatal findings collected while building a plan.
//!
//! Warnings never stop the pipeline. They are returned next to the value that
//! produced them and are also emitted through `tracing` at the point they occur.

use serde::Serialize;
use std::fmt;

/// A non-fatal issue found while processing input data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Opposite sides of a plot differ by more than the shape tolerance
    PlotShape {
        plot_id: String,
        /// |d01 - d23|
        first_pair_difference: f64,
        /// |d12 - d30|
        second_pair_difference: f64,
    },

    /// Projected zone was estimated from the east value, not from a real longitude
    ZoneAmbiguity { east: f64, zone: i32 },

    /// Plot ids were not all numeric, so plots were ordered lexically
    LexicalPlotOrder { sample_id: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PlotShape { plot_id, first_pair_difference, second_pair_difference } => {
                write!(
                    f,
                    "Plot {} is not rectangular: opposite sides differ by {:.3} and {:.3}",
                    plot_id, first_pair_difference, second_pair_difference
                )
            }
            Warning::ZoneAmbiguity { east, zone } => {
                write!(f, "Zone {} inferred from east value {:.3}; longitude may be off", zone, east)
            }
            Warning::LexicalPlotOrder { sample_id } => {
                write!(f, "Could not sort plots by number (id '{}'); using text order", sample_id)
            }
        }
    }
}

/// A computed value together with the warnings raised while computing it
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    /// Wrap a value that produced no warnings
    pub fn clean(value: T) -> Self {
        Self { value, warnings: Vec::new() }
    }

    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    /// Move this outcome's warnings into `sink` and return the bare value
    pub fn collect_into(self, sink: &mut Vec<Warning>) -> T {
        sink.extend(self.warnings);
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome { value: f(self.value), warnings: self.warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
