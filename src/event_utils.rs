use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use leptos::ev::EventDescriptor;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, EventTarget, ResizeObserver};

#[derive(Clone, Debug)]
pub struct EventOptions {
    pub passive: bool,
    pub capture: bool,
}

impl Default for EventOptions {
    fn default() -> Self {
        Self { passive: true, capture: false }
    }
}

impl EventOptions {
    /// Handlers that call `preventDefault` must not be passive.
    pub fn active() -> Self {
        Self { passive: false, capture: false }
    }
}

/// Attach a typed listener. Dropping the returned handle removes it.
pub fn listen<E>(
    target: &EventTarget,
    event: E,
    options: &EventOptions,
    mut cb: impl FnMut(&E::EventType) + 'static,
) -> EventListener
where
    E: EventDescriptor + 'static,
    E::EventType: JsCast,
{
    let opts = EventListenerOptions {
        phase: if options.capture { EventListenerPhase::Capture } else { EventListenerPhase::Bubble },
        passive: options.passive,
    };
    let event_name = (*event.name()).to_owned();
    EventListener::new_with_options(target, event_name, opts, move |ev| {
        cb(ev.unchecked_ref::<E::EventType>());
    })
}

/// `ResizeObserver` bound to one element; disconnects on drop.
pub struct ResizeWatch {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl ResizeWatch {
    pub fn observe(target: &Element, mut cb: impl FnMut() + 'static) -> Result<Self, wasm_bindgen::JsValue> {
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| cb());
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(target);
        Ok(Self { observer, _callback: callback })
    }
}

impl Drop for ResizeWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
