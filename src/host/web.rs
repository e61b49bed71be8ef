//! Browser host
//!
//! Binds the widget to the real page: `document.head` for script
//! injection, `ResizeObserver` and `window` `resize` for layout sync, and
//! the `google.maps` namespace for the library itself.
//!
//! JavaScript entry point: `mountPinMap(configJson?)` returns a handle with
//! `state()` and `stop()`.

use crate::config::Config;
use crate::constants::events;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::host::{
    Callback, Listener, MapsApi, Runtime, ScriptCallback, ScriptOutcome, ScriptSlot, TimerId,
    WatchId,
};
use crate::widget::options::{Animation, MapOptions, MarkerOptions, PopupOptions};
use crate::widget::MapWidget;
use gloo_timers::callback::Timeout;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlScriptElement, Window};

mod bindings {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Debug, Clone)]
        pub type Map;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], catch)]
        pub fn new(mount: &web_sys::HtmlElement, options: &JsValue) -> Result<Map, JsValue>;

        #[wasm_bindgen(method, js_name = setCenter)]
        pub fn set_center(this: &Map, center: &JsValue);

        #[wasm_bindgen(method, js_name = getDiv)]
        pub fn get_div(this: &Map) -> web_sys::HtmlElement;

        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Debug, Clone)]
        pub type Marker;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], catch)]
        pub fn new(options: &JsValue) -> Result<Marker, JsValue>;

        #[wasm_bindgen(method, js_name = setMap)]
        pub fn set_map(this: &Marker, map: &JsValue);

        #[wasm_bindgen(method, js_name = addListener, catch)]
        pub fn add_listener(
            this: &Marker,
            event: &str,
            handler: &js_sys::Function,
        ) -> Result<JsValue, JsValue>;

        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Debug, Clone)]
        pub type InfoWindow;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], catch)]
        pub fn new(options: &JsValue) -> Result<InfoWindow, JsValue>;

        #[wasm_bindgen(method)]
        pub fn open(this: &InfoWindow, map: &Map, anchor: &Marker);

        #[wasm_bindgen(method)]
        pub fn close(this: &InfoWindow);

        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        pub type Size;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"])]
        pub fn new(width: f64, height: f64) -> Size;

        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        pub type Point;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"])]
        pub fn new(x: f64, y: f64) -> Point;

        #[wasm_bindgen(js_namespace = ["google", "maps", "event"])]
        pub fn trigger(instance: &JsValue, event_name: &str);

        #[wasm_bindgen(
            js_namespace = ["google", "maps", "event"],
            js_name = clearInstanceListeners
        )]
        pub fn clear_instance_listeners(instance: &JsValue);

        pub type ResizeObserver;

        #[wasm_bindgen(constructor, catch)]
        pub fn new(callback: &js_sys::Function) -> Result<ResizeObserver, JsValue>;

        #[wasm_bindgen(method)]
        pub fn observe(this: &ResizeObserver, target: &web_sys::Element);

        #[wasm_bindgen(method)]
        pub fn disconnect(this: &ResizeObserver);
    }
}

thread_local! {
    static SCRIPT_SLOT: Rc<ScriptSlot> = Rc::new(ScriptSlot::new());
}

enum Watch {
    Observer {
        observer: bindings::ResizeObserver,
        _callback: Closure<dyn FnMut()>,
    },
    WindowResize {
        callback: Closure<dyn FnMut()>,
    },
}

/// The current page
pub struct WebHost {
    window: Window,
    document: Document,
    slot: Rc<ScriptSlot>,
    next_id: Cell<u32>,
    timers: RefCell<HashMap<TimerId, Timeout>>,
    fired: Rc<RefCell<Vec<TimerId>>>,
    watches: RefCell<HashMap<WatchId, Watch>>,
    click_handlers: RefCell<Vec<Closure<dyn FnMut()>>>,
}

fn host_err(e: JsValue) -> Error {
    Error::Host(format!("{:?}", e))
}

fn library_err(e: JsValue) -> Error {
    Error::Library(format!("{:?}", e))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    let json = serde_json::to_string(value)?;
    js_sys::JSON::parse(&json).map_err(host_err)
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<()> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(host_err)
}

impl WebHost {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| Error::Host("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| Error::Host("no document".to_string()))?;

        Ok(Self {
            window,
            document,
            slot: SCRIPT_SLOT.with(|slot| slot.clone()),
            next_id: Cell::new(0),
            timers: RefCell::new(HashMap::new()),
            fired: Rc::new(RefCell::new(Vec::new())),
            watches: RefCell::new(HashMap::new()),
            click_handlers: RefCell::new(Vec::new()),
        })
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    /// Walk a property path from `window`, e.g. `["google", "maps"]`
    fn global(&self, path: &[&str]) -> Option<JsValue> {
        let mut value: JsValue = self.window.clone().into();
        for key in path {
            value = js_sys::Reflect::get(&value, &JsValue::from_str(key)).ok()?;
            if value.is_undefined() || value.is_null() {
                return None;
            }
        }
        Some(value)
    }

    /// Drop timers that already fired
    fn prune_fired(&self) {
        let fired: Vec<TimerId> = self.fired.borrow_mut().drain(..).collect();
        if fired.is_empty() {
            return;
        }
        let mut timers = self.timers.borrow_mut();
        for id in fired {
            timers.remove(&id);
        }
    }
}

impl Runtime for WebHost {
    type Mount = HtmlElement;

    fn mount_point(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn library_present(&self) -> bool {
        self.global(&["google", "maps"]).is_some()
    }

    fn script_slot(&self) -> Rc<ScriptSlot> {
        self.slot.clone()
    }

    fn inject_script(&self, src: &str, done: ScriptCallback) -> Result<()> {
        let script: HtmlScriptElement = self
            .document
            .create_element("script")
            .map_err(host_err)?
            .dyn_into()
            .map_err(|_| Error::Host("created element is not a script".to_string()))?;
        script.set_src(src);
        script.set_async(true);
        script.set_defer(true);

        let done = Rc::new(RefCell::new(Some(done)));
        let settle = |outcome: ScriptOutcome| {
            let done = done.clone();
            Closure::<dyn FnMut()>::new(move || {
                let callback = done.borrow_mut().take();
                if let Some(callback) = callback {
                    callback(outcome);
                }
            })
        };
        let on_load = settle(ScriptOutcome::Loaded);
        let on_error = settle(ScriptOutcome::Failed);
        script.set_onload(Some(on_load.as_ref().unchecked_ref()));
        script.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let head = self
            .document
            .head()
            .ok_or_else(|| Error::Host("document has no head".to_string()))?;
        head.append_child(&script).map_err(host_err)?;

        // Owned by the script element from here on
        on_load.forget();
        on_error.forget();
        Ok(())
    }

    fn set_timeout(&self, delay: Duration, callback: Callback) -> TimerId {
        self.prune_fired();

        let id = TimerId(self.next_id());
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let fired = self.fired.clone();
        let timeout = Timeout::new(millis, move || {
            callback();
            fired.borrow_mut().push(id);
        });
        self.timers.borrow_mut().insert(id, timeout);
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.prune_fired();
        // Dropping a Timeout cancels it
        self.timers.borrow_mut().remove(&id);
    }

    fn observe_resize(&self, mount: &HtmlElement, listener: Listener) -> Result<Option<WatchId>> {
        if self.global(&["ResizeObserver"]).is_none() {
            return Ok(None);
        }

        let callback = Closure::<dyn FnMut()>::new(move || listener());
        let observer =
            bindings::ResizeObserver::new(callback.as_ref().unchecked_ref()).map_err(host_err)?;
        observer.observe(mount);

        let id = WatchId(self.next_id());
        self.watches.borrow_mut().insert(
            id,
            Watch::Observer {
                observer,
                _callback: callback,
            },
        );
        Ok(Some(id))
    }

    fn listen_window_resize(&self, listener: Listener) -> Result<WatchId> {
        let callback = Closure::<dyn FnMut()>::new(move || listener());
        self.window
            .add_event_listener_with_callback(events::RESIZE, callback.as_ref().unchecked_ref())
            .map_err(host_err)?;

        let id = WatchId(self.next_id());
        self.watches
            .borrow_mut()
            .insert(id, Watch::WindowResize { callback });
        Ok(id)
    }

    fn unwatch(&self, id: WatchId) {
        let watch = self.watches.borrow_mut().remove(&id);
        match watch {
            Some(Watch::Observer { observer, .. }) => observer.disconnect(),
            Some(Watch::WindowResize { callback }) => {
                let _ = self.window.remove_event_listener_with_callback(
                    events::RESIZE,
                    callback.as_ref().unchecked_ref(),
                );
            }
            None => {}
        }
    }
}

impl MapsApi for WebHost {
    type Map = bindings::Map;
    type Marker = bindings::Marker;
    type Popup = bindings::InfoWindow;

    fn create_map(&self, mount: &HtmlElement, options: &MapOptions) -> Result<bindings::Map> {
        bindings::Map::new(mount, &to_js(options)?).map_err(library_err)
    }

    fn create_marker(
        &self,
        map: &bindings::Map,
        options: &MarkerOptions,
    ) -> Result<bindings::Marker> {
        let js = to_js(options)?;
        set(&js, "map", map.as_ref())?;

        // The library wants its own Size/Point instances, not literals
        let icon = js_sys::Reflect::get(&js, &JsValue::from_str("icon")).map_err(host_err)?;
        let size = options.icon.scaled_size;
        let anchor = options.icon.anchor;
        set(&icon, "scaledSize", &bindings::Size::new(size.width, size.height).into())?;
        set(&icon, "anchor", &bindings::Point::new(anchor.x, anchor.y).into())?;

        let animation = match options.animation {
            Animation::Drop => "DROP",
            Animation::Bounce => "BOUNCE",
        };
        let animation = self
            .global(&["google", "maps", "Animation", animation])
            .ok_or_else(|| Error::Library(format!("unknown animation {}", animation)))?;
        set(&js, "animation", &animation)?;

        bindings::Marker::new(&js).map_err(library_err)
    }

    fn create_popup(&self, options: &PopupOptions) -> Result<bindings::InfoWindow> {
        bindings::InfoWindow::new(&to_js(options)?).map_err(library_err)
    }

    fn on_marker_click(&self, marker: &bindings::Marker, listener: Listener) -> Result<()> {
        let callback = Closure::<dyn FnMut()>::new(move || listener());
        marker
            .add_listener(events::CLICK, callback.as_ref().unchecked_ref())
            .map_err(library_err)?;
        self.click_handlers.borrow_mut().push(callback);
        Ok(())
    }

    fn open_popup(
        &self,
        popup: &bindings::InfoWindow,
        map: &bindings::Map,
        marker: &bindings::Marker,
    ) {
        popup.open(map, marker);
    }

    fn trigger_resize(&self, map: &bindings::Map) {
        bindings::trigger(map.as_ref(), events::RESIZE);
    }

    fn set_center(&self, map: &bindings::Map, center: Coordinates) {
        match to_js(&center) {
            Ok(center) => map.set_center(&center),
            Err(e) => warn!(error = %e, "could not re-center map"),
        }
    }

    fn close_popup(&self, popup: &bindings::InfoWindow) {
        popup.close();
    }

    fn detach_marker(&self, marker: &bindings::Marker) {
        bindings::clear_instance_listeners(marker.as_ref());
        marker.set_map(&JsValue::NULL);
    }

    fn dispose_map(&self, map: &bindings::Map) {
        bindings::clear_instance_listeners(map.as_ref());
        map.get_div().set_inner_html("");
    }
}

/// Handle returned to JavaScript by `mountPinMap`
#[wasm_bindgen]
pub struct PinMap {
    widget: MapWidget<WebHost>,
}

#[wasm_bindgen]
impl PinMap {
    /// `"idle" | "loading" | "ready" | "error"`
    pub fn state(&self) -> String {
        self.widget.state().to_string()
    }

    /// Tear the widget down; safe to call more than once
    pub fn stop(&self) {
        self.widget.stop();
    }
}

/// Mount a pin map into the page
///
/// `config_json` is an optional JSON object with the same sections as the
/// TOML config; missing fields take their defaults.
#[wasm_bindgen(js_name = mountPinMap)]
pub fn mount_pin_map(config_json: Option<String>) -> std::result::Result<PinMap, JsValue> {
    let to_js_err = |e: Error| JsValue::from_str(&e.to_string());

    let config = match config_json {
        Some(json) => serde_json::from_str::<Config>(&json)
            .map_err(Error::from)
            .map_err(to_js_err)?,
        None => Config::default(),
    };
    config.validate().map_err(to_js_err)?;

    let host = Rc::new(WebHost::new().map_err(to_js_err)?);
    let widget = MapWidget::new(host, config);
    widget.start();
    Ok(PinMap { widget })
}
