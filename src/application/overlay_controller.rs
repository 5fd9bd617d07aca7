use super::chart_resources::{InputLock, RangeSubscription};
use super::ports::OverlayPainter;
use crate::config::{Modifiers, SplitModifier, ViewerConfig};
use crate::domain::chart::{ChartSurface, CoordinateMapper, RangeChangeHandler};
use crate::domain::errors::GeometryError;
use crate::domain::events::{EventDispatcher, InMemoryEventDispatcher, ViewerEvent};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Bar, Series};
use crate::domain::measurement::{
    DismissReason, GestureInput, GestureMachine, GestureMode, GestureState, OverlayRenderer, OverlayView, Transition,
};
use crate::log_debug;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const COMPONENT: LogComponent = LogComponent::Application("Overlay");

/// Pointer position relative to the chart container's left edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub on_chart: bool,
}

/// Owns one chart's measurement overlay: the gesture machine, the chart
/// resources it holds in each mode and the painter it repaints through.
pub struct OverlayController<C, V>
where
    C: ChartSurface + ?Sized + 'static,
    V: OverlayPainter + 'static,
{
    chart: Rc<C>,
    painter: V,
    series: Option<Rc<Series>>,
    machine: GestureMachine,
    renderer: OverlayRenderer,
    split_modifier: SplitModifier,
    input_lock: Option<InputLock<C>>,
    canceller: RangeSubscription<C>,
    events: Rc<InMemoryEventDispatcher>,
    view: OverlayView,
    destroyed: bool,
    this: Weak<RefCell<Self>>,
}

impl<C, V> OverlayController<C, V>
where
    C: ChartSurface + ?Sized + 'static,
    V: OverlayPainter + 'static,
{
    pub fn new(
        chart: Rc<C>,
        painter: V,
        config: &ViewerConfig,
        events: Rc<InMemoryEventDispatcher>,
    ) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                canceller: RangeSubscription::new(Rc::clone(&chart)),
                chart,
                painter,
                series: None,
                machine: GestureMachine::new(&config.overlay),
                renderer: OverlayRenderer::new(&config.overlay, &config.theme),
                split_modifier: config.overlay.split_modifier,
                input_lock: None,
                events,
                view: OverlayView::default(),
                destroyed: false,
                this: this.clone(),
            })
        })
    }

    pub fn mode(&self) -> GestureMode {
        self.machine.mode()
    }

    pub fn state(&self) -> &GestureState {
        self.machine.state()
    }

    /// Last view handed to the painter.
    pub fn view(&self) -> &OverlayView {
        &self.view
    }

    pub fn painter(&self) -> &V {
        &self.painter
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Replacing the series always returns the overlay to `Idle`.
    pub fn load_series(&mut self, series: Rc<Series>) {
        if self.destroyed {
            return;
        }
        self.apply(GestureInput::Dismiss(DismissReason::SeriesReplaced));
        log_debug!(COMPONENT, "series {} loaded ({} bars)", series.id().value(), series.len());
        self.series = Some(series);
    }

    pub fn pointer_down(&mut self, sample: PointerSample, modifiers: Modifiers) -> Transition {
        let bar = if sample.on_chart { self.bar_under(sample.x) } else { None };
        self.apply(GestureInput::PointerDown {
            x: sample.x,
            on_chart: sample.on_chart,
            bar,
            split_modifier: self.split_modifier.is_held(modifiers),
        })
    }

    pub fn pointer_move(&mut self, sample: PointerSample) -> Transition {
        if !self.machine.mode().holds_pointer() {
            return self.unchanged();
        }
        let bar = self.bar_under(sample.x);
        self.apply(GestureInput::PointerMove { x: sample.x, bar })
    }

    pub fn pointer_up(&mut self, sample: PointerSample) -> Transition {
        if !self.machine.mode().holds_pointer() {
            return self.unchanged();
        }
        let bar = if sample.on_chart { self.bar_under(sample.x) } else { None };
        self.apply(GestureInput::PointerUp { x: sample.x, bar })
    }

    /// Pointer left the window or the browser cancelled it. Only a gesture that
    /// holds the pointer is torn down; a frozen readout stays.
    pub fn pointer_cancel(&mut self) -> Transition {
        if !self.machine.mode().holds_pointer() {
            return self.unchanged();
        }
        self.apply(GestureInput::Dismiss(DismissReason::PointerLost))
    }

    pub fn escape(&mut self) -> Transition {
        self.dismiss(DismissReason::Escape)
    }

    pub fn dismiss(&mut self, reason: DismissReason) -> Transition {
        self.apply(GestureInput::Dismiss(reason))
    }

    /// Releases every chart resource and hides the overlay. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.apply(GestureInput::Dismiss(DismissReason::Destroyed));
        self.canceller.disarm();
        self.input_lock = None;
        self.series = None;
        self.destroyed = true;
        log_debug!(COMPONENT, "destroyed");
    }

    fn unchanged(&self) -> Transition {
        let mode = self.machine.mode();
        Transition { from: mode, to: mode, dismissed: None }
    }

    /// Crosshair bar first, then the coordinate mapper. Missing bars are not
    /// errors here; the machine decides what a missing bar means.
    fn bar_under(&self, x: f64) -> Option<Bar> {
        if let Some(bar) = self.chart.crosshair_bar().filter(Bar::is_valid) {
            return Some(bar);
        }
        let resolved = self
            .series
            .as_deref()
            .ok_or(GeometryError::NoSeries)
            .and_then(|series| CoordinateMapper::new(self.chart.as_ref(), series).bar_at_pixel(x));
        match resolved {
            Ok(bar) => Some(bar),
            Err(error) => {
                log_debug!(COMPONENT, "no bar at x={x:.1}: {error}");
                None
            }
        }
    }

    fn apply(&mut self, input: GestureInput) -> Transition {
        if self.destroyed {
            return self.unchanged();
        }
        let surface = self.chart.surface_size();
        let transition = self.machine.handle(input, surface);
        self.reconcile(transition);
        self.repaint();
        transition
    }

    /// Input is locked exactly while the pointer is held; the canceller is
    /// armed exactly while frozen.
    fn reconcile(&mut self, transition: Transition) {
        if transition.to.holds_pointer() {
            if self.input_lock.is_none() {
                self.input_lock = Some(InputLock::acquire(Rc::clone(&self.chart)));
            }
        } else {
            self.input_lock = None;
        }

        if transition.to == GestureMode::Frozen {
            if !self.canceller.is_armed() {
                self.arm_canceller();
            }
        } else {
            self.canceller.disarm();
        }

        if transition.changed_mode() {
            log_debug!(COMPONENT, "{} -> {}", transition.from, transition.to);
            self.events.publish(ViewerEvent::GestureChanged { from: transition.from, to: transition.to });
        }
        if let Some(reason) = transition.dismissed {
            log_debug!(COMPONENT, "dismissed: {reason}");
            self.events.publish(ViewerEvent::OverlayDismissed { reason });
        }
    }

    fn arm_canceller(&mut self) {
        let this = self.this.clone();
        let handler: RangeChangeHandler = Rc::new(move |_range| {
            let Some(controller) = this.upgrade() else { return };
            // Busy means the change came from our own call stack.
            if let Ok(mut controller) = controller.try_borrow_mut() {
                controller.dismiss(DismissReason::ViewChanged);
            }
        });
        self.canceller.arm(handler);
    }

    fn repaint(&mut self) {
        let view = match self.series.as_deref() {
            Some(series) => self.renderer.project(self.machine.state(), self.chart.surface_size(), series.resolution()),
            None => OverlayView::default(),
        };
        self.painter.paint(&view);
        self.view = view;
    }
}

impl<C, V> Drop for OverlayController<C, V>
where
    C: ChartSurface + ?Sized + 'static,
    V: OverlayPainter + 'static,
{
    fn drop(&mut self) {
        self.destroy();
    }
}
