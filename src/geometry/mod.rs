pub mod boundary;
pub mod bounds;
pub mod gate;
pub mod height_field;

pub use boundary::Boundary;
pub use bounds::TrackBounds;
pub use gate::{Gate, GateRecord, GateSequence, Segment};
pub use height_field::HeightField;
