//! Drag-to-measure overlay: state machine, readouts and view projection

pub mod gesture;
pub mod projection;
pub mod readout;

pub use gesture::*;
pub use projection::*;
pub use readout::*;
