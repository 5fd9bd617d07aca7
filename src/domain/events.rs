use crate::domain::chart::LogicalRange;
use crate::domain::measurement::{DismissReason, GestureMode};
use std::cell::RefCell;
use std::fmt::Debug;

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
}

/// Which component asked the chart to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSource {
    MinimapRecenter,
    MinimapPan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    GestureChanged { from: GestureMode, to: GestureMode },
    OverlayDismissed { reason: DismissReason },
    VisibleRangeRequested { range: LogicalRange, source: RangeSource },
}

impl DomainEvent for ViewerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ViewerEvent::GestureChanged { .. } => "GestureChanged",
            ViewerEvent::OverlayDismissed { .. } => "OverlayDismissed",
            ViewerEvent::VisibleRangeRequested { .. } => "VisibleRangeRequested",
        }
    }
}

pub trait EventDispatcher {
    fn publish(&self, event: ViewerEvent);
}

type Handler = Box<dyn Fn(&ViewerEvent)>;

/// Simple in-memory event dispatcher for a single UI thread
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    handlers: RefCell<Vec<Handler>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&ViewerEvent) + 'static,
    {
        self.handlers.borrow_mut().push(Box::new(handler));
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish(&self, event: ViewerEvent) {
        // handlers must not subscribe while being notified
        if let Ok(handlers) = self.handlers.try_borrow() {
            for handler in handlers.iter() {
                handler(&event);
            }
        }
    }
}

impl Debug for InMemoryEventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventDispatcher")
            .field("handlers", &self.handlers.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn publishes_to_every_subscriber() {
        let dispatcher = InMemoryEventDispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..2 {
            let seen = Rc::clone(&seen);
            dispatcher.subscribe(move |e| seen.borrow_mut().push(e.event_type()));
        }
        dispatcher.publish(ViewerEvent::OverlayDismissed { reason: DismissReason::Escape });
        assert_eq!(*seen.borrow(), vec!["OverlayDismissed", "OverlayDismissed"]);
    }
}
