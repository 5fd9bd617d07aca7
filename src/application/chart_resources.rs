//! Scoped ownership of the two chart resources gestures compete for: the
//! engine's own pan/zoom input and the visible-range-change subscription.

use crate::domain::chart::{ChartSurface, RangeChangeHandler, SubscriptionId};
use crate::domain::logging::LogComponent;
use crate::log_trace;
use std::rc::Rc;

/// Holds the chart's pan/zoom input disabled for as long as it lives.
pub struct InputLock<C: ChartSurface + ?Sized> {
    chart: Rc<C>,
}

impl<C: ChartSurface + ?Sized> InputLock<C> {
    pub fn acquire(chart: Rc<C>) -> Self {
        chart.set_input_interaction_enabled(false);
        log_trace!(LogComponent::Application("InputLock"), "chart input disabled");
        Self { chart }
    }
}

impl<C: ChartSurface + ?Sized> Drop for InputLock<C> {
    fn drop(&mut self) {
        self.chart.set_input_interaction_enabled(true);
        log_trace!(LogComponent::Application("InputLock"), "chart input restored");
    }
}

/// Single-slot visible-range subscription.
///
/// Arming always disarms the previous handler first, and dropping the
/// subscription disarms it.
pub struct RangeSubscription<C: ChartSurface + ?Sized> {
    chart: Rc<C>,
    active: Option<SubscriptionId>,
}

impl<C: ChartSurface + ?Sized> RangeSubscription<C> {
    pub fn new(chart: Rc<C>) -> Self {
        Self { chart, active: None }
    }

    pub fn arm(&mut self, handler: RangeChangeHandler) {
        self.disarm();
        self.active = Some(self.chart.subscribe_visible_range_change(handler));
    }

    pub fn disarm(&mut self) {
        if let Some(id) = self.active.take() {
            self.chart.unsubscribe_visible_range_change(id);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }
}

impl<C: ChartSurface + ?Sized> Drop for RangeSubscription<C> {
    fn drop(&mut self) {
        self.disarm();
    }
}
