//! trialplan core - plot geometry, block clustering and route sequencing
//!
//! This crate turns surveyed corner points of field-trial plots into a driving
//! plan: a guide line per plot, plots grouped into blocks, and an ordered
//! route. File adapters for the survey input and the machine exports live in
//! [`formats`].

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod formats;
pub mod geo;
pub mod models;
pub mod planning;
pub mod session;

pub use diagnostics::{Outcome, Warning};
pub use error::{Result, TrialplanError};
pub use session::{PlanningSession, PlotRejection, SessionOptions};
