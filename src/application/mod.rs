//! Controllers that bind the pure domain to a chart engine and a painter

pub mod chart_resources;
pub mod minimap_controller;
pub mod overlay_controller;
pub mod ports;

pub use chart_resources::*;
pub use minimap_controller::*;
pub use overlay_controller::*;
pub use ports::*;
