//! Planning stages that run after plot geometry is derived

pub mod cluster;
pub mod route;

pub use cluster::BlockClusterer;
pub use route::{route_length, route_polyline, RouteSequencer};
