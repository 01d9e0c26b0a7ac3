pub mod gate_sequence;

pub use gate_sequence::{Track, TrackBuilder};
