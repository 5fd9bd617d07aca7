//! Minimap/timeline: session bands, sparkline geometry, viewport navigation

pub mod cache;
pub mod navigator;
pub mod sessions;
pub mod sparkline;

pub use cache::*;
pub use navigator::*;
pub use sessions::*;
pub use sparkline::*;
