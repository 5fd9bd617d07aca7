#![allow(dead_code)]

use price_viewer_wasm::application::{MinimapCanvas, MinimapCursor, OverlayPainter};
use price_viewer_wasm::config::MinimapConfig;
use price_viewer_wasm::domain::chart::{ChartSurface, LogicalRange, RangeChangeHandler, SubscriptionId, SurfaceSize};
use price_viewer_wasm::domain::market_data::{Bar, Series, SeriesBar, Timestamp};
use price_viewer_wasm::domain::measurement::OverlayView;
use price_viewer_wasm::domain::minimap::{CacheKey, SparklineGeometry, ViewportRect};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const START: i64 = 1_700_000_000;

/// `n` one-second bars, closes rising by one from 100.
pub fn series(n: usize) -> Rc<Series> {
    let bars = (0..n).map(|i| SeriesBar::close_only(START + i as i64, 100.0 + i as f64)).collect();
    Rc::new(Series::new(bars, 1).unwrap())
}

/// In-memory chart: one bar per `px_per_bar` pixels starting at x = 0.
pub struct FakeChart {
    pub range: Cell<Option<LogicalRange>>,
    handlers: RefCell<Vec<(SubscriptionId, RangeChangeHandler)>>,
    next_id: Cell<u64>,
    pub input_enabled: Cell<bool>,
    pub input_toggles: RefCell<Vec<bool>>,
    pub crosshair: Cell<Option<Bar>>,
    pub size: Cell<SurfaceSize>,
    pub px_per_bar: f64,
}

impl FakeChart {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            range: Cell::new(Some(LogicalRange::new(0.0, 40.0))),
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            input_enabled: Cell::new(true),
            input_toggles: RefCell::new(Vec::new()),
            crosshair: Cell::new(None),
            size: Cell::new(SurfaceSize::new(400.0, 300.0)),
            px_per_bar: 10.0,
        })
    }

    pub fn subscription_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Simulates the user panning the chart directly.
    pub fn user_scroll(&self, range: LogicalRange) {
        self.set_visible_logical_range(range);
    }
}

impl ChartSurface for FakeChart {
    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        Some(x / self.px_per_bar)
    }

    fn coordinate_to_time(&self, _x: f64) -> Option<Timestamp> {
        None
    }

    fn visible_logical_range(&self) -> Option<LogicalRange> {
        self.range.get()
    }

    fn set_visible_logical_range(&self, range: LogicalRange) {
        self.range.set(Some(range));
        let handlers: Vec<RangeChangeHandler> = self.handlers.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            handler(Some(range));
        }
    }

    fn subscribe_visible_range_change(&self, handler: RangeChangeHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe_visible_range_change(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    fn set_input_interaction_enabled(&self, enabled: bool) {
        self.input_enabled.set(enabled);
        self.input_toggles.borrow_mut().push(enabled);
    }

    fn crosshair_bar(&self) -> Option<Bar> {
        self.crosshair.get()
    }

    fn surface_size(&self) -> SurfaceSize {
        self.size.get()
    }
}

#[derive(Default)]
pub struct FakePainter {
    pub paints: Rc<RefCell<Vec<OverlayView>>>,
}

impl OverlayPainter for FakePainter {
    fn paint(&mut self, view: &OverlayView) {
        self.paints.borrow_mut().push(view.clone());
    }
}

pub struct FakeCanvas {
    pub size: Rc<Cell<SurfaceSize>>,
    pub ratio: f64,
    pub rasterized: Vec<CacheKey>,
    pub blits: Vec<Option<ViewportRect>>,
    pub tooltip: Option<(f64, String)>,
    pub cursor: MinimapCursor,
    pub cleared: usize,
}

impl FakeCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Rc::new(Cell::new(SurfaceSize::new(width, height))),
            ratio: 1.0,
            rasterized: Vec::new(),
            blits: Vec::new(),
            tooltip: None,
            cursor: MinimapCursor::Default,
            cleared: 0,
        }
    }
}

impl MinimapCanvas for FakeCanvas {
    fn css_size(&self) -> SurfaceSize {
        self.size.get()
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn rasterize(&mut self, key: CacheKey, _geometry: &SparklineGeometry, _style: &MinimapConfig) {
        self.rasterized.push(key);
    }

    fn blit_viewport(&mut self, viewport: Option<ViewportRect>, _style: &MinimapConfig) {
        self.blits.push(viewport);
    }

    fn show_tooltip(&mut self, x: f64, label: &str) {
        self.tooltip = Some((x, label.to_string()));
    }

    fn hide_tooltip(&mut self) {
        self.tooltip = None;
    }

    fn set_cursor(&mut self, cursor: MinimapCursor) {
        self.cursor = cursor;
    }

    fn clear(&mut self) {
        self.cleared += 1;
        self.tooltip = None;
    }
}
