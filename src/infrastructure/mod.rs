//! Browser-facing implementations of the application ports

pub mod chart_engine;
pub mod rendering;
pub mod services;

pub use chart_engine::LightweightChart;
pub use services::{BrowserTimeProvider, ConsoleLogger};
