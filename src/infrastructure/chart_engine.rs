//! Bindings to the Lightweight Charts instance owned by the host page.

use crate::domain::chart::{ChartSurface, LogicalRange, RangeChangeHandler, SubscriptionId, SurfaceSize};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Bar, Price, Timestamp};
use crate::{log_debug, log_warn};
use js_sys::{Function, JSON, Map, Object, Reflect};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const COMPONENT: LogComponent = LogComponent::Infrastructure("LightweightChart");

#[wasm_bindgen]
extern "C" {
    /// `IChartApi`
    pub type ChartApi;

    #[wasm_bindgen(method, js_name = timeScale)]
    fn time_scale(this: &ChartApi) -> TimeScaleApi;

    #[wasm_bindgen(method, js_name = applyOptions)]
    fn apply_options(this: &ChartApi, options: &JsValue);

    #[wasm_bindgen(method, js_name = subscribeCrosshairMove)]
    fn subscribe_crosshair_move(this: &ChartApi, handler: &Function);

    #[wasm_bindgen(method, js_name = unsubscribeCrosshairMove)]
    fn unsubscribe_crosshair_move(this: &ChartApi, handler: &Function);

    /// `ITimeScaleApi`
    pub type TimeScaleApi;

    #[wasm_bindgen(method, js_name = coordinateToLogical)]
    fn coordinate_to_logical(this: &TimeScaleApi, x: f64) -> JsValue;

    #[wasm_bindgen(method, js_name = coordinateToTime)]
    fn coordinate_to_time(this: &TimeScaleApi, x: f64) -> JsValue;

    #[wasm_bindgen(method, js_name = getVisibleLogicalRange)]
    fn get_visible_logical_range(this: &TimeScaleApi) -> JsValue;

    #[wasm_bindgen(method, js_name = setVisibleLogicalRange)]
    fn set_visible_logical_range(this: &TimeScaleApi, range: &JsValue);

    #[wasm_bindgen(method, js_name = subscribeVisibleLogicalRangeChange)]
    fn subscribe_visible_logical_range_change(this: &TimeScaleApi, handler: &Function);

    #[wasm_bindgen(method, js_name = unsubscribeVisibleLogicalRangeChange)]
    fn unsubscribe_visible_logical_range_change(this: &TimeScaleApi, handler: &Function);
}

/// Pan/zoom options applied when gestures give the input back or take it
fn interaction_options(enabled: bool) -> serde_json::Value {
    serde_json::json!({
        "handleScroll": { "pressedMouseMove": enabled, "horzTouchDrag": enabled, "vertTouchDrag": false },
        "handleScale": { "axisPressedMouseMove": { "time": false, "price": enabled } },
    })
}

/// Adapter from a chart instance, its main series and container element to
/// [`ChartSurface`].
///
/// Handler functions are owned by the JS garbage collector once handed over,
/// so an unsubscribe issued from inside a notification never frees code that
/// is still on the JS stack.
pub struct LightweightChart {
    api: ChartApi,
    container: HtmlElement,
    crosshair: Rc<Cell<Option<Bar>>>,
    crosshair_handler: Function,
    range_handlers: RefCell<HashMap<SubscriptionId, Function>>,
    next_id: Cell<u64>,
}

impl LightweightChart {
    pub fn new(chart: JsValue, main_series: JsValue, container: HtmlElement) -> Self {
        let api: ChartApi = chart.unchecked_into();
        let crosshair = Rc::new(Cell::new(None));

        let slot = Rc::clone(&crosshair);
        let crosshair_handler: Function = Closure::<dyn FnMut(JsValue)>::new(move |param: JsValue| {
            slot.set(crosshair_bar_from(&param, &main_series));
        })
        .into_js_value()
        .unchecked_into();
        api.subscribe_crosshair_move(&crosshair_handler);

        Self {
            api,
            container,
            crosshair,
            crosshair_handler,
            range_handlers: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }
}

/// Reads `{ time, seriesData }` from a crosshair-move parameter. Candles
/// report `close`, line series report `value`.
fn crosshair_bar_from(param: &JsValue, series: &JsValue) -> Option<Bar> {
    let time = Reflect::get(param, &"time".into()).ok()?.as_f64()?;
    let data: Map = Reflect::get(param, &"seriesData".into()).ok()?.dyn_into().ok()?;
    let point = data.get(series);
    if point.is_undefined() {
        return None;
    }
    let price = ["close", "value"]
        .iter()
        .find_map(|key| Reflect::get(&point, &(*key).into()).ok()?.as_f64())?;
    Some(Bar::new(Timestamp::from_secs(time as i64), Price::from(price)))
}

fn parse_range(value: &JsValue) -> Option<LogicalRange> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    let from = Reflect::get(value, &"from".into()).ok()?.as_f64()?;
    let to = Reflect::get(value, &"to".into()).ok()?.as_f64()?;
    Some(LogicalRange::new(from, to))
}

impl ChartSurface for LightweightChart {
    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        self.api.time_scale().coordinate_to_logical(x).as_f64()
    }

    fn coordinate_to_time(&self, x: f64) -> Option<Timestamp> {
        self.api.time_scale().coordinate_to_time(x).as_f64().map(|t| Timestamp::from_secs(t as i64))
    }

    fn visible_logical_range(&self) -> Option<LogicalRange> {
        parse_range(&self.api.time_scale().get_visible_logical_range())
    }

    fn set_visible_logical_range(&self, range: LogicalRange) {
        let object = Object::new();
        let _ = Reflect::set(&object, &"from".into(), &range.from.into());
        let _ = Reflect::set(&object, &"to".into(), &range.to.into());
        self.api.time_scale().set_visible_logical_range(&object);
    }

    fn subscribe_visible_range_change(&self, handler: RangeChangeHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let function: Function = Closure::<dyn FnMut(JsValue)>::new(move |range: JsValue| {
            handler(parse_range(&range));
        })
        .into_js_value()
        .unchecked_into();
        self.api.time_scale().subscribe_visible_logical_range_change(&function);
        self.range_handlers.borrow_mut().insert(id, function);
        log_debug!(COMPONENT, "range handler {} subscribed", id.0);
        id
    }

    fn unsubscribe_visible_range_change(&self, id: SubscriptionId) {
        let removed = self.range_handlers.borrow_mut().remove(&id);
        if let Some(function) = removed {
            self.api.time_scale().unsubscribe_visible_logical_range_change(&function);
            log_debug!(COMPONENT, "range handler {} unsubscribed", id.0);
        }
    }

    fn set_input_interaction_enabled(&self, enabled: bool) {
        match JSON::parse(&interaction_options(enabled).to_string()) {
            Ok(options) => self.api.apply_options(&options),
            Err(error) => log_warn!(COMPONENT, "interaction options rejected: {:?}", error),
        }
    }

    fn crosshair_bar(&self) -> Option<Bar> {
        self.crosshair.get()
    }

    fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(f64::from(self.container.client_width()), f64::from(self.container.client_height()))
    }
}

impl Drop for LightweightChart {
    fn drop(&mut self) {
        self.api.unsubscribe_crosshair_move(&self.crosshair_handler);
        let time_scale = self.api.time_scale();
        for (_, function) in self.range_handlers.borrow_mut().drain() {
            time_scale.unsubscribe_visible_logical_range_change(&function);
        }
    }
}
