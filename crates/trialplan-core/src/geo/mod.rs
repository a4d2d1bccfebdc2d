//! Coordinate-system math: the zoned projection, midpoints and distances

pub mod distance;
pub mod midpoint;
pub mod projection;

pub use distance::DistanceMethod;
pub use midpoint::MidpointMethod;
pub use projection::Projected;
