pub mod block;
pub mod coordinate;
pub mod field;
pub mod plot;
pub mod work;

pub use block::{Block, BlockOrdering};
pub use coordinate::{classify_planar, Coordinate, CoordinateSource, PlanarInput};
pub use field::Field;
pub use plot::{Plot, PlotSource, ShapeTolerance};
pub use work::{WorkAttributes, WorkSettings};
