use super::chart_resources::RangeSubscription;
use super::ports::{MinimapCanvas, MinimapCursor};
use crate::config::{MinimapConfig, ViewerConfig};
use crate::domain::chart::{ChartSurface, LogicalRange, RangeChangeHandler};
use crate::domain::events::{EventDispatcher, InMemoryEventDispatcher, RangeSource, ViewerEvent};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Series;
use crate::domain::minimap::{CacheKey, MinimapNavigator, MinimapScale, SparklineCache, SparklineGeometry};
use crate::time_utils::format_clock;
use crate::log_debug;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const COMPONENT: LogComponent = LogComponent::Application("Minimap");

/// Overview strip kept in lock-step with the chart's visible range.
///
/// The sparkline is rasterized once per [`CacheKey`]; range changes only blit
/// the snapshot and redraw the viewport rectangle.
pub struct MinimapController<C, P>
where
    C: ChartSurface + ?Sized + 'static,
    P: MinimapCanvas + 'static,
{
    chart: Rc<C>,
    canvas: P,
    style: MinimapConfig,
    utc_offset_minutes: i32,
    series: Option<Rc<Series>>,
    cache: SparklineCache,
    navigator: MinimapNavigator,
    follow: RangeSubscription<C>,
    events: Rc<InMemoryEventDispatcher>,
    destroyed: bool,
    this: Weak<RefCell<Self>>,
}

impl<C, P> MinimapController<C, P>
where
    C: ChartSurface + ?Sized + 'static,
    P: MinimapCanvas + 'static,
{
    pub fn new(
        chart: Rc<C>,
        canvas: P,
        config: &ViewerConfig,
        events: Rc<InMemoryEventDispatcher>,
    ) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                follow: RangeSubscription::new(Rc::clone(&chart)),
                chart,
                canvas,
                style: config.minimap.clone(),
                utc_offset_minutes: config.display_utc_offset_minutes,
                series: None,
                cache: SparklineCache::default(),
                navigator: MinimapNavigator::default(),
                events,
                destroyed: false,
                this: this.clone(),
            })
        })
    }

    pub fn canvas(&self) -> &P {
        &self.canvas
    }

    pub fn cache(&self) -> &SparklineCache {
        &self.cache
    }

    pub fn is_dragging(&self) -> bool {
        self.navigator.is_dragging()
    }

    pub fn is_following(&self) -> bool {
        self.follow.is_armed()
    }

    pub fn load_series(&mut self, series: Rc<Series>) {
        if self.destroyed {
            return;
        }
        log_debug!(COMPONENT, "series {} loaded ({} bars)", series.id().value(), series.len());
        self.series = Some(series);
        self.cache.invalidate();
        self.end_drag();
        self.redraw();
        self.follow_chart();
    }

    /// Container resized. The cache key carries the pixel size, so a real size
    /// change forces exactly one rebuild; the logical range is left alone.
    pub fn on_resize(&mut self) {
        if self.destroyed {
            return;
        }
        self.redraw();
    }

    pub fn on_visible_range_changed(&mut self) {
        if self.destroyed {
            return;
        }
        self.redraw();
    }

    /// Recenter the chart on the clicked bar and start a pan. Returns whether
    /// the press was consumed.
    pub fn pointer_down(&mut self, x: f64) -> bool {
        if self.destroyed {
            return false;
        }
        let (Some(scale), Some(current)) = (self.scale(), self.chart.visible_logical_range()) else {
            return false;
        };
        if !x.is_finite() || !current.is_finite() {
            return false;
        }
        let range = self.navigator.press(x, scale, current);
        self.write_range(range, RangeSource::MinimapRecenter);
        self.canvas.set_cursor(MinimapCursor::Grabbing);
        self.show_time(x, scale.logical_at(x), scale);
        true
    }

    /// Pointer moved anywhere on the page. Pans while dragging; otherwise shows
    /// the hover tooltip when the pointer is over the canvas.
    pub fn pointer_move(&mut self, x: f64, over_canvas: bool) {
        if self.destroyed || !x.is_finite() {
            return;
        }
        let Some(scale) = self.scale() else { return };
        if let Some(range) = self.navigator.drag_to(x, scale) {
            self.write_range(range, RangeSource::MinimapPan);
            self.show_time(x, range.center(), scale);
        } else if over_canvas {
            self.canvas.set_cursor(MinimapCursor::Grab);
            self.show_time(x, scale.logical_at(x), scale);
        }
    }

    pub fn pointer_up(&mut self) {
        if self.end_drag() {
            self.canvas.hide_tooltip();
        }
    }

    pub fn pointer_leave(&mut self) {
        if !self.navigator.is_dragging() {
            self.canvas.set_cursor(MinimapCursor::Default);
            self.canvas.hide_tooltip();
        }
    }

    /// Unsubscribes from the chart and clears the canvas. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.follow.disarm();
        self.end_drag();
        self.series = None;
        self.cache.invalidate();
        self.canvas.clear();
        self.destroyed = true;
        log_debug!(COMPONENT, "destroyed");
    }

    fn end_drag(&mut self) -> bool {
        let was_dragging = self.navigator.release();
        if was_dragging {
            self.canvas.set_cursor(MinimapCursor::Default);
        }
        was_dragging
    }

    fn follow_chart(&mut self) {
        let this = self.this.clone();
        let handler: RangeChangeHandler = Rc::new(move |_range| {
            let Some(controller) = this.upgrade() else { return };
            // Busy means we are writing the range ourselves and redraw after.
            if let Ok(mut controller) = controller.try_borrow_mut() {
                controller.on_visible_range_changed();
            }
        });
        self.follow.arm(handler);
    }

    fn scale(&self) -> Option<MinimapScale> {
        let series = self.series.as_deref()?;
        MinimapScale::new(series.len(), self.canvas.css_size().width)
    }

    fn write_range(&mut self, range: LogicalRange, source: RangeSource) {
        log_debug!(COMPONENT, "{:?} -> [{:.2}, {:.2}]", source, range.from, range.to);
        self.chart.set_visible_logical_range(range);
        self.redraw();
        self.events.publish(ViewerEvent::VisibleRangeRequested { range, source });
    }

    fn show_time(&mut self, x: f64, logical: f64, scale: MinimapScale) {
        let Some(series) = self.series.as_deref() else { return };
        let Some(bar) = series.bar_at_index(scale.bar_index(logical)) else { return };
        let label = format_clock(bar.time, self.utc_offset_minutes);
        self.canvas.show_tooltip(x, &label);
    }

    /// Rasterize the sparkline if its key changed, then blit it with the
    /// chart's current viewport read fresh from the chart.
    fn redraw(&mut self) {
        if !self.ensure_sparkline() {
            return;
        }
        let viewport = self
            .scale()
            .zip(self.chart.visible_logical_range())
            .and_then(|(scale, range)| scale.viewport_rect(range));
        self.canvas.blit_viewport(viewport, &self.style);
    }

    fn ensure_sparkline(&mut self) -> bool {
        let Some(series) = self.series.clone() else { return false };
        let css = self.canvas.css_size();
        if !css.is_drawable() {
            return false;
        }
        let key = CacheKey::new(series.id(), css.width, css.height, self.canvas.pixel_ratio());
        if self.cache.is_current(key) {
            return true;
        }
        let geometry = SparklineGeometry::compute(&series, css.width, css.height, &self.style);
        self.canvas.rasterize(key, &geometry, &self.style);
        self.cache.store(key);
        log_debug!(
            COMPONENT,
            "sparkline rebuilt {}x{} px (build #{})",
            key.pixel_width,
            key.pixel_height,
            self.cache.build_count()
        );
        true
    }
}

impl<C, P> Drop for MinimapController<C, P>
where
    C: ChartSurface + ?Sized + 'static,
    P: MinimapCanvas + 'static,
{
    fn drop(&mut self) {
        self.destroy();
    }
}
