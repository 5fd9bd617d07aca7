mod common;

use common::{FakeCanvas, FakeChart, FakePainter, series};
use price_viewer_wasm::application::{MinimapController, MinimapCursor, OverlayController, PointerSample};
use price_viewer_wasm::config::{Modifiers, ViewerConfig};
use price_viewer_wasm::domain::chart::{LogicalRange, SurfaceSize};
use price_viewer_wasm::domain::events::{InMemoryEventDispatcher, RangeSource, ViewerEvent};
use price_viewer_wasm::domain::measurement::GestureMode;
use price_viewer_wasm::domain::minimap::ViewportRect;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Minimap = Rc<RefCell<MinimapController<FakeChart, FakeCanvas>>>;

struct Fixture {
    chart: Rc<FakeChart>,
    minimap: Minimap,
    size: Rc<Cell<SurfaceSize>>,
    events: Rc<InMemoryEventDispatcher>,
}

/// 1000 bars on a 400px strip, chart showing bars 0..40.
fn setup() -> Fixture {
    let chart = FakeChart::new();
    let canvas = FakeCanvas::new(400.0, 40.0);
    let size = Rc::clone(&canvas.size);
    let events = Rc::new(InMemoryEventDispatcher::new());
    let minimap = MinimapController::new(Rc::clone(&chart), canvas, &ViewerConfig::default(), Rc::clone(&events));
    minimap.borrow_mut().load_series(series(1000));
    Fixture { chart, minimap, size, events }
}

fn rasterized(minimap: &Minimap) -> usize {
    minimap.borrow().canvas().rasterized.len()
}

fn last_blit(minimap: &Minimap) -> Option<ViewportRect> {
    minimap.borrow().canvas().blits.last().copied().flatten()
}

fn assert_rect(rect: Option<ViewportRect>, x: f64, width: f64) {
    let rect = rect.expect("viewport rectangle");
    assert!((rect.x - x).abs() < 1e-9, "x = {}, expected {x}", rect.x);
    assert!((rect.width - width).abs() < 1e-9, "width = {}, expected {width}", rect.width);
}

#[test]
fn loading_draws_sparkline_and_viewport_once() {
    let f = setup();
    assert_eq!(rasterized(&f.minimap), 1);
    assert_rect(last_blit(&f.minimap), 0.0, 16.0);
    assert!(f.minimap.borrow().is_following());
    assert_eq!(f.chart.subscription_count(), 1);
}

#[test]
fn click_recenters_keeping_the_span() {
    let f = setup();
    assert!(f.minimap.borrow_mut().pointer_down(200.0));

    assert_eq!(f.chart.range.get(), Some(LogicalRange::new(480.0, 520.0)));
    let m = f.minimap.borrow();
    assert!(m.is_dragging());
    assert_eq!(m.canvas().cursor, MinimapCursor::Grabbing);
    assert_eq!(m.canvas().tooltip, Some((200.0, "06:21:40".to_string())));
    drop(m);
    assert_rect(last_blit(&f.minimap), 192.0, 16.0);
}

#[test]
fn drag_pans_by_pixel_delta_without_rebuilding() {
    let f = setup();
    f.minimap.borrow_mut().pointer_down(200.0);
    for x in [210.0, 220.0, 230.0, 240.0] {
        f.minimap.borrow_mut().pointer_move(x, true);
    }

    assert_eq!(f.chart.range.get(), Some(LogicalRange::new(580.0, 620.0)));
    assert_eq!(rasterized(&f.minimap), 1);
    assert_eq!(f.minimap.borrow().canvas().tooltip, Some((240.0, "06:23:20".to_string())));

    f.minimap.borrow_mut().pointer_up();
    let m = f.minimap.borrow();
    assert!(!m.is_dragging());
    assert_eq!(m.canvas().cursor, MinimapCursor::Default);
    assert_eq!(m.canvas().tooltip, None);
}

#[test]
fn range_writes_are_published_with_their_source() {
    let f = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    f.events.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    f.minimap.borrow_mut().pointer_down(200.0);
    f.minimap.borrow_mut().pointer_move(240.0, true);

    assert_eq!(
        *log.borrow(),
        vec![
            ViewerEvent::VisibleRangeRequested {
                range: LogicalRange::new(480.0, 520.0),
                source: RangeSource::MinimapRecenter,
            },
            ViewerEvent::VisibleRangeRequested { range: LogicalRange::new(580.0, 620.0), source: RangeSource::MinimapPan },
        ]
    );
}

#[test]
fn hover_without_drag_only_shows_time() {
    let f = setup();
    f.minimap.borrow_mut().pointer_move(200.0, true);
    assert_eq!(f.chart.range.get(), Some(LogicalRange::new(0.0, 40.0)));
    {
        let m = f.minimap.borrow();
        assert_eq!(m.canvas().cursor, MinimapCursor::Grab);
        assert_eq!(m.canvas().tooltip, Some((200.0, "06:21:40".to_string())));
    }

    f.minimap.borrow_mut().pointer_leave();
    assert_eq!(f.minimap.borrow().canvas().tooltip, None);
}

#[test]
fn chart_scroll_moves_viewport_only() {
    let f = setup();
    let blits = f.minimap.borrow().canvas().blits.len();

    f.chart.user_scroll(LogicalRange::new(100.0, 140.0));

    assert_eq!(f.minimap.borrow().canvas().blits.len(), blits + 1);
    assert_rect(last_blit(&f.minimap), 40.0, 16.0);
    assert_eq!(rasterized(&f.minimap), 1);
}

#[test]
fn resize_rebuilds_once_per_new_size() {
    let f = setup();
    f.minimap.borrow_mut().on_resize();
    assert_eq!(rasterized(&f.minimap), 1);

    f.size.set(SurfaceSize::new(800.0, 40.0));
    f.minimap.borrow_mut().on_resize();
    f.minimap.borrow_mut().on_resize();
    assert_eq!(rasterized(&f.minimap), 2);
    assert_eq!(f.minimap.borrow().canvas().rasterized[1].pixel_width, 800);
    assert_eq!(f.chart.range.get(), Some(LogicalRange::new(0.0, 40.0)));
}

#[test]
fn zero_sized_strip_draws_nothing() {
    let f = setup();
    f.size.set(SurfaceSize::new(0.0, 40.0));
    let blits = f.minimap.borrow().canvas().blits.len();
    f.minimap.borrow_mut().on_resize();
    assert_eq!(f.minimap.borrow().canvas().blits.len(), blits);
    assert!(!f.minimap.borrow_mut().pointer_down(10.0));
}

#[test]
fn new_series_rebuilds_and_keeps_single_subscription() {
    let f = setup();
    f.minimap.borrow_mut().pointer_down(100.0);
    f.minimap.borrow_mut().load_series(series(500));
    assert_eq!(rasterized(&f.minimap), 2);
    assert!(!f.minimap.borrow().is_dragging());
    assert_eq!(f.chart.subscription_count(), 1);
}

#[test]
fn destroy_unsubscribes_and_is_idempotent() {
    let f = setup();
    f.minimap.borrow_mut().destroy();
    f.minimap.borrow_mut().destroy();
    assert_eq!(f.chart.subscription_count(), 0);
    assert_eq!(f.minimap.borrow().canvas().cleared, 1);
    assert!(!f.minimap.borrow_mut().pointer_down(200.0));
}

#[test]
fn minimap_navigation_dismisses_a_frozen_overlay() {
    let f = setup();
    let overlay = OverlayController::new(
        Rc::clone(&f.chart),
        FakePainter::default(),
        &ViewerConfig::default(),
        Rc::clone(&f.events),
    );
    overlay.borrow_mut().load_series(series(40));
    {
        let mut o = overlay.borrow_mut();
        o.pointer_down(PointerSample { x: 50.0, on_chart: true }, Modifiers::default());
        o.pointer_up(PointerSample { x: 150.0, on_chart: true });
    }
    assert_eq!(overlay.borrow().mode(), GestureMode::Frozen);
    assert_eq!(f.chart.subscription_count(), 2);

    f.minimap.borrow_mut().pointer_down(200.0);

    assert_eq!(overlay.borrow().mode(), GestureMode::Idle);
    assert_eq!(f.chart.subscription_count(), 1);
}
