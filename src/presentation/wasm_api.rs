//! JavaScript-facing classes. Each component is created against a
//! [`ChartHandle`], mounted with `render(container)` and torn down with
//! `destroy()`.

use crate::application::{MinimapController, OverlayController, PointerSample};
use crate::config::{Modifiers, ViewerConfig};
use crate::domain::chart::LogicalRange;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::events::{InMemoryEventDispatcher, ViewerEvent};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Series;
use crate::event_utils::{EventOptions, ResizeWatch, listen};
use crate::infrastructure::LightweightChart;
use crate::infrastructure::rendering::{HtmlMinimapCanvas, OverlayDom};
use crate::{log_debug, log_warn};
use gloo::events::EventListener;
use js_sys::{Function, Object, Reflect};
use leptos::ev;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, KeyboardEvent, MouseEvent, Window};

const COMPONENT: LogComponent = LogComponent::Presentation("WasmApi");

type Overlay = OverlayController<LightweightChart, OverlayDom>;
type Minimap = MinimapController<LightweightChart, HtmlMinimapCanvas>;

fn browser() -> AppResult<(Window, Document)> {
    let window = web_sys::window().ok_or_else(|| AppError::BrowserApi("window not available".to_string()))?;
    let document = window.document().ok_or_else(|| AppError::BrowserApi("document not available".to_string()))?;
    Ok((window, document))
}

/// Run `f` on a live, idle controller. Events that arrive while the controller
/// is already on the stack are dropped.
fn with_mut<T>(weak: &Weak<RefCell<T>>, f: impl FnOnce(&mut T)) {
    let Some(cell) = weak.upgrade() else { return };
    match cell.try_borrow_mut() {
        Ok(mut controller) => f(&mut controller),
        Err(_) => log_debug!(COMPONENT, "controller busy, event skipped"),
    }
}

fn modifiers_of(event: &MouseEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        alt: event.alt_key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
    }
}

fn sample_in(element: &HtmlElement, event: &MouseEvent) -> PointerSample {
    let rect = element.get_bounding_client_rect();
    let (x, y) = (f64::from(event.client_x()), f64::from(event.client_y()));
    PointerSample {
        x: x - rect.left(),
        on_chart: x >= rect.left() && x <= rect.right() && y >= rect.top() && y <= rect.bottom(),
    }
}

fn range_object(range: LogicalRange) -> JsValue {
    let object = Object::new();
    let _ = Reflect::set(&object, &"from".into(), &range.from.into());
    let _ = Reflect::set(&object, &"to".into(), &range.to.into());
    object.into()
}

/// Chart instance, its main series and the element it was created in
#[wasm_bindgen]
pub struct ChartHandle {
    chart: Rc<LightweightChart>,
}

#[wasm_bindgen]
impl ChartHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(chart: JsValue, main_series: JsValue, container: HtmlElement) -> ChartHandle {
        ChartHandle { chart: Rc::new(LightweightChart::new(chart, main_series, container)) }
    }
}

#[wasm_bindgen]
pub struct SeriesHandle {
    series: Rc<Series>,
}

#[wasm_bindgen]
impl SeriesHandle {
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<SeriesHandle, JsValue> {
        let series = Series::from_json(json).map_err(AppError::from)?;
        Ok(SeriesHandle { series: Rc::new(series) })
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.series.len()
    }

    #[wasm_bindgen(getter, js_name = resolutionSeconds)]
    pub fn resolution_seconds(&self) -> u32 {
        self.series.resolution().seconds()
    }
}

struct MountedOverlay {
    // Listeners go first so no event reaches a controller being torn down.
    _listeners: Vec<EventListener>,
    controller: Rc<RefCell<Overlay>>,
}

/// Drag-to-measure overlay over the chart container
#[wasm_bindgen]
pub struct MeasureOverlay {
    chart: Rc<LightweightChart>,
    config: ViewerConfig,
    series: Option<Rc<Series>>,
    mounted: Option<MountedOverlay>,
}

#[wasm_bindgen]
impl MeasureOverlay {
    #[wasm_bindgen(constructor)]
    pub fn new(chart: &ChartHandle, options_json: Option<String>) -> Result<MeasureOverlay, JsValue> {
        let config = ViewerConfig::from_json(options_json.as_deref().unwrap_or_default())?;
        Ok(MeasureOverlay { chart: Rc::clone(&chart.chart), config, series: None, mounted: None })
    }

    pub fn render(&mut self, container: HtmlElement) -> Result<(), JsValue> {
        self.destroy();
        let dom = OverlayDom::mount(&container, &self.config.theme)?;
        let events = Rc::new(InMemoryEventDispatcher::new());
        let controller = OverlayController::new(Rc::clone(&self.chart), dom, &self.config, events);
        if let Some(series) = &self.series {
            controller.borrow_mut().load_series(Rc::clone(series));
        }
        let listeners = wire_overlay(&controller, &container)?;
        self.mounted = Some(MountedOverlay { _listeners: listeners, controller });
        log_debug!(COMPONENT, "measure overlay mounted");
        Ok(())
    }

    /// Removes listeners, the range subscription, any input lock and the
    /// overlay elements. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.mounted.take().is_some() {
            log_debug!(COMPONENT, "measure overlay destroyed");
        }
    }

    #[wasm_bindgen(js_name = setSeries)]
    pub fn set_series(&mut self, series: &SeriesHandle) {
        self.series = Some(Rc::clone(&series.series));
        if let Some(mounted) = &self.mounted {
            with_mut(&Rc::downgrade(&mounted.controller), |overlay| overlay.load_series(Rc::clone(&series.series)));
        }
    }

    /// Current gesture mode: `Idle`, `Dragging`, `Frozen` or `Splitting`.
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.mounted
            .as_ref()
            .and_then(|mounted| mounted.controller.try_borrow().ok().map(|c| c.mode().to_string()))
            .unwrap_or_else(|| "Idle".to_string())
    }

    /// Dismiss a frozen or in-progress measurement.
    pub fn dismiss(&mut self) {
        if let Some(mounted) = &self.mounted {
            with_mut(&Rc::downgrade(&mounted.controller), |overlay| {
                overlay.escape();
            });
        }
    }
}

fn wire_overlay(controller: &Rc<RefCell<Overlay>>, container: &HtmlElement) -> AppResult<Vec<EventListener>> {
    let (window, document) = browser()?;
    let mut listeners = Vec::new();

    // Capture phase so a starting drag never reaches the chart's own pan.
    let (weak, host) = (Rc::downgrade(controller), container.clone());
    listeners.push(listen(
        &document,
        ev::mousedown,
        &EventOptions { passive: false, capture: true },
        move |event: &MouseEvent| {
            if event.button() != 0 {
                return;
            }
            let sample = sample_in(&host, event);
            let modifiers = modifiers_of(event);
            with_mut(&weak, |overlay| {
                if overlay.pointer_down(sample, modifiers).to.holds_pointer() {
                    event.prevent_default();
                    event.stop_propagation();
                }
            });
        },
    ));

    let (weak, host) = (Rc::downgrade(controller), container.clone());
    listeners.push(listen(&document, ev::mousemove, &EventOptions::default(), move |event: &MouseEvent| {
        let sample = sample_in(&host, event);
        with_mut(&weak, |overlay| {
            overlay.pointer_move(sample);
        });
    }));

    let (weak, host) = (Rc::downgrade(controller), container.clone());
    listeners.push(listen(&document, ev::mouseup, &EventOptions::default(), move |event: &MouseEvent| {
        let sample = sample_in(&host, event);
        with_mut(&weak, |overlay| {
            overlay.pointer_up(sample);
        });
    }));

    let weak = Rc::downgrade(controller);
    listeners.push(listen(&document, ev::keydown, &EventOptions::default(), move |event: &KeyboardEvent| {
        if event.key() == "Escape" {
            with_mut(&weak, |overlay| {
                overlay.escape();
            });
        }
    }));

    let weak = Rc::downgrade(controller);
    listeners.push(listen(&window, ev::blur, &EventOptions::default(), move |_| {
        with_mut(&weak, |overlay| {
            overlay.pointer_cancel();
        });
    }));

    if let Some(root) = document.document_element() {
        let weak = Rc::downgrade(controller);
        listeners.push(listen(&root, ev::mouseleave, &EventOptions::default(), move |_| {
            with_mut(&weak, |overlay| {
                overlay.pointer_cancel();
            });
        }));
    }

    Ok(listeners)
}

struct MountedTimeline {
    _resize: ResizeWatch,
    _listeners: Vec<EventListener>,
    controller: Rc<RefCell<Minimap>>,
}

type RangeCallback = Rc<RefCell<Option<Function>>>;
type Outbox = Rc<RefCell<Vec<LogicalRange>>>;

/// Minimap strip under the chart
#[wasm_bindgen]
pub struct Timeline {
    chart: Rc<LightweightChart>,
    config: ViewerConfig,
    series: Option<Rc<Series>>,
    on_range_change: RangeCallback,
    outbox: Outbox,
    mounted: Option<MountedTimeline>,
}

#[wasm_bindgen]
impl Timeline {
    #[wasm_bindgen(constructor)]
    pub fn new(chart: &ChartHandle, options_json: Option<String>) -> Result<Timeline, JsValue> {
        let config = ViewerConfig::from_json(options_json.as_deref().unwrap_or_default())?;
        Ok(Timeline {
            chart: Rc::clone(&chart.chart),
            config,
            series: None,
            on_range_change: Rc::new(RefCell::new(None)),
            outbox: Rc::new(RefCell::new(Vec::new())),
            mounted: None,
        })
    }

    pub fn render(&mut self, container: HtmlElement) -> Result<(), JsValue> {
        self.destroy();
        let canvas = HtmlMinimapCanvas::mount(&container)?;
        let canvas_element: HtmlElement = canvas.canvas_element().clone().into();

        let events = Rc::new(InMemoryEventDispatcher::new());
        let outbox = Rc::clone(&self.outbox);
        events.subscribe(move |event| {
            if let ViewerEvent::VisibleRangeRequested { range, .. } = event {
                outbox.borrow_mut().push(*range);
            }
        });

        let controller = MinimapController::new(Rc::clone(&self.chart), canvas, &self.config, events);
        if let Some(series) = &self.series {
            controller.borrow_mut().load_series(Rc::clone(series));
        }

        let listeners = self.wire(&controller, &canvas_element)?;
        let weak = Rc::downgrade(&controller);
        let resize = ResizeWatch::observe(&container, move || with_mut(&weak, |minimap| minimap.on_resize()))?;

        self.mounted = Some(MountedTimeline { _resize: resize, _listeners: listeners, controller });
        log_debug!(COMPONENT, "timeline mounted");
        Ok(())
    }

    /// Unsubscribes from the chart, removes listeners and the canvas. Safe to
    /// call repeatedly.
    pub fn destroy(&mut self) {
        if self.mounted.take().is_some() {
            self.outbox.borrow_mut().clear();
            log_debug!(COMPONENT, "timeline destroyed");
        }
    }

    #[wasm_bindgen(js_name = setSeries)]
    pub fn set_series(&mut self, series: &SeriesHandle) {
        self.series = Some(Rc::clone(&series.series));
        if let Some(mounted) = &self.mounted {
            with_mut(&Rc::downgrade(&mounted.controller), |minimap| minimap.load_series(Rc::clone(&series.series)));
        }
    }

    /// `callback({ from, to })` runs after the timeline moved the chart.
    #[wasm_bindgen(js_name = onRangeChange)]
    pub fn on_range_change(&self, callback: Function) {
        *self.on_range_change.borrow_mut() = Some(callback);
    }
}

impl Timeline {
    fn wire(&self, controller: &Rc<RefCell<Minimap>>, canvas: &HtmlElement) -> AppResult<Vec<EventListener>> {
        let (_, document) = browser()?;
        let mut listeners = Vec::new();

        let (weak, host) = (Rc::downgrade(controller), canvas.clone());
        let (outbox, callback) = (Rc::clone(&self.outbox), Rc::clone(&self.on_range_change));
        listeners.push(listen(canvas, ev::mousedown, &EventOptions::active(), move |event: &MouseEvent| {
            if event.button() != 0 {
                return;
            }
            let sample = sample_in(&host, event);
            with_mut(&weak, |minimap| {
                if minimap.pointer_down(sample.x) {
                    event.prevent_default();
                }
            });
            flush(&outbox, &callback);
        }));

        let (weak, host) = (Rc::downgrade(controller), canvas.clone());
        let (outbox, callback) = (Rc::clone(&self.outbox), Rc::clone(&self.on_range_change));
        listeners.push(listen(&document, ev::mousemove, &EventOptions::default(), move |event: &MouseEvent| {
            let sample = sample_in(&host, event);
            with_mut(&weak, |minimap| minimap.pointer_move(sample.x, sample.on_chart));
            flush(&outbox, &callback);
        }));

        let weak = Rc::downgrade(controller);
        listeners.push(listen(&document, ev::mouseup, &EventOptions::default(), move |_| {
            with_mut(&weak, |minimap| minimap.pointer_up());
        }));

        let weak = Rc::downgrade(controller);
        listeners.push(listen(canvas, ev::mouseleave, &EventOptions::default(), move |_| {
            with_mut(&weak, |minimap| minimap.pointer_leave());
        }));

        Ok(listeners)
    }
}

/// Deliver queued range writes once no controller is borrowed, so the JS
/// callback may call back into this API.
fn flush(outbox: &Outbox, callback: &RangeCallback) {
    let pending: Vec<LogicalRange> = outbox.borrow_mut().drain(..).collect();
    if pending.is_empty() {
        return;
    }
    let function = callback.borrow().clone();
    let Some(function) = function else { return };
    for range in pending {
        if let Err(error) = function.call1(&JsValue::NULL, &range_object(range)) {
            log_warn!(COMPONENT, "onRangeChange callback threw: {:?}", error);
        }
    }
}
