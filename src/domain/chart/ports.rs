//! Ports to the external chart engine.
//!
//! The engine owns rendering, the visible range and pan/zoom input. The overlay
//! and the minimap only talk to it through [`ChartSurface`].

use super::value_objects::{LogicalRange, SurfaceSize};
use crate::domain::market_data::{Bar, Timestamp};
use std::rc::Rc;

/// Callback invoked by the engine after the visible logical range moved
pub type RangeChangeHandler = Rc<dyn Fn(Option<LogicalRange>)>;

/// Token returned by [`ChartSurface::subscribe_visible_range_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub trait ChartSurface {
    fn coordinate_to_logical(&self, x: f64) -> Option<f64>;
    fn coordinate_to_time(&self, x: f64) -> Option<Timestamp>;

    fn visible_logical_range(&self) -> Option<LogicalRange>;
    fn set_visible_logical_range(&self, range: LogicalRange);

    fn subscribe_visible_range_change(&self, handler: RangeChangeHandler) -> SubscriptionId;
    fn unsubscribe_visible_range_change(&self, id: SubscriptionId);

    /// Toggle the engine's own pan/zoom handling.
    fn set_input_interaction_enabled(&self, enabled: bool);

    /// Last bar reported by the crosshair-move notification.
    fn crosshair_bar(&self) -> Option<Bar>;

    fn surface_size(&self) -> SurfaceSize;
}
