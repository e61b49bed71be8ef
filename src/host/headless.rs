//! In-memory host with a virtual clock
//!
//! Stands in for a browser page and the maps library. Nothing happens on
//! its own: script loads, resizes, clicks and the passage of time are all
//! driven explicitly, and every library call is recorded for inspection.
//! Used by the test suite and the `simulate` command.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::host::{
    Callback, Listener, MapsApi, Runtime, ScriptCallback, ScriptOutcome, ScriptSlot, TimerId,
    WatchId,
};
use crate::widget::options::{MapOptions, MarkerOptions, PopupOptions};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

/// Handle to a simulated map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapRef(pub usize);

/// Handle to a simulated marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerRef(pub usize);

/// Handle to a simulated popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupRef(pub usize);

/// Library call that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Map,
    Marker,
    Popup,
    /// Binding the marker click listener
    Click,
}

/// A call made into the simulated library
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryCall {
    MapCreated { map: MapRef, mount: String },
    MarkerCreated { marker: MarkerRef, map: MapRef, position: Coordinates },
    PopupCreated { popup: PopupRef },
    PopupOpened { popup: PopupRef, marker: MarkerRef, at: Duration },
    LayoutRecomputed { map: MapRef, at: Duration },
    Recentered { map: MapRef, center: Coordinates, at: Duration },
    PopupClosed { popup: PopupRef },
    MarkerDetached { marker: MarkerRef },
    MapDisposed { map: MapRef },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapRecord {
    pub mount: String,
    pub options: MapOptions,
    pub center: Coordinates,
    /// True once the map has been cleared from its mount
    pub disposed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub map: MapRef,
    pub options: MarkerOptions,
    /// False once the marker has been detached from its map
    pub attached: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupRecord {
    pub options: PopupOptions,
    /// Marker the popup was last opened on
    pub anchor: Option<MarkerRef>,
    pub open: bool,
}

struct State {
    now: Duration,
    next_id: u32,
    mounts: Vec<String>,
    library_present: bool,
    resize_observer: bool,
    fault: Option<Fault>,
    scripts: Vec<String>,
    pending_loads: VecDeque<ScriptCallback>,
    timers: BTreeMap<(Duration, TimerId), Callback>,
    container_observers: BTreeMap<WatchId, Listener>,
    window_listeners: BTreeMap<WatchId, Listener>,
    maps: Vec<MapRecord>,
    markers: Vec<MarkerRecord>,
    popups: Vec<PopupRecord>,
    click_handlers: HashMap<MarkerRef, Vec<Listener>>,
    calls: Vec<LibraryCall>,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simulated page plus maps library
pub struct HeadlessHost {
    state: RefCell<State>,
    slot: Rc<ScriptSlot>,
}

impl HeadlessHost {
    /// A page with a `map-container` element and no library loaded
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                now: Duration::ZERO,
                next_id: 0,
                mounts: vec![crate::config::defaults::DEFAULT_MOUNT_ID.to_string()],
                library_present: false,
                resize_observer: true,
                fault: None,
                scripts: Vec::new(),
                pending_loads: VecDeque::new(),
                timers: BTreeMap::new(),
                container_observers: BTreeMap::new(),
                window_listeners: BTreeMap::new(),
                maps: Vec::new(),
                markers: Vec::new(),
                popups: Vec::new(),
                click_handlers: HashMap::new(),
                calls: Vec::new(),
            }),
            slot: Rc::new(ScriptSlot::new()),
        }
    }

    /// Replace the page's elements with a single element of this id
    pub fn with_mount(self, id: &str) -> Self {
        self.state.borrow_mut().mounts = vec![id.to_string()];
        self
    }

    /// A page with no mount element at all
    pub fn without_mount(self) -> Self {
        self.state.borrow_mut().mounts.clear();
        self
    }

    /// The library was already injected by the surrounding page
    pub fn with_library(self) -> Self {
        self.state.borrow_mut().library_present = true;
        self
    }

    /// An environment without a size-observation facility
    pub fn without_resize_observer(self) -> Self {
        self.state.borrow_mut().resize_observer = false;
        self
    }

    /// Make one library constructor fail
    pub fn with_fault(self, fault: Fault) -> Self {
        self.state.borrow_mut().fault = Some(fault);
        self
    }

    // ------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------

    /// Finish the oldest in-flight script load successfully
    ///
    /// Returns false if no load was in flight.
    pub fn complete_script_load(&self) -> bool {
        let done = {
            let mut state = self.state.borrow_mut();
            let done = state.pending_loads.pop_front();
            if done.is_some() {
                state.library_present = true;
            }
            done
        };
        match done {
            Some(done) => {
                done(ScriptOutcome::Loaded);
                true
            }
            None => false,
        }
    }

    /// Fail the oldest in-flight script load
    ///
    /// Returns false if no load was in flight.
    pub fn fail_script_load(&self) -> bool {
        let done = self.state.borrow_mut().pending_loads.pop_front();
        match done {
            Some(done) => {
                done(ScriptOutcome::Failed);
                true
            }
            None => false,
        }
    }

    /// Report a size change of the mount element to every observer
    pub fn resize_container(&self) {
        let listeners: Vec<Listener> = self
            .state
            .borrow()
            .container_observers
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Fire the window resize event
    pub fn resize_window(&self) {
        let listeners: Vec<Listener> = self
            .state
            .borrow()
            .window_listeners
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Click a marker
    ///
    /// Returns false if the marker does not exist or was detached.
    pub fn click_marker(&self, marker: MarkerRef) -> bool {
        let handlers = {
            let state = self.state.borrow();
            match state.markers.get(marker.0) {
                Some(record) if record.attached => {
                    state.click_handlers.get(&marker).cloned().unwrap_or_default()
                }
                _ => return false,
            }
        };
        for handler in handlers {
            handler();
        }
        true
    }

    /// Move the virtual clock forward, firing due timers in order
    pub fn advance(&self, by: Duration) {
        let target = self.state.borrow().now + by;
        loop {
            let due = {
                let mut state = self.state.borrow_mut();
                let key = match state.timers.keys().next() {
                    Some(&key) if key.0 <= target => key,
                    _ => break,
                };
                state.now = key.0;
                state.timers.remove(&key)
            };
            if let Some(callback) = due {
                callback();
            }
        }
        self.state.borrow_mut().now = target;
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Every script URL injected so far
    pub fn injected_scripts(&self) -> Vec<String> {
        self.state.borrow().scripts.clone()
    }

    /// Script loads not yet completed or failed
    pub fn pending_loads(&self) -> usize {
        self.state.borrow().pending_loads.len()
    }

    /// Timers scheduled and not yet fired or cleared
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Observers and listeners still registered
    pub fn active_watches(&self) -> usize {
        let state = self.state.borrow();
        state.container_observers.len() + state.window_listeners.len()
    }

    pub fn maps(&self) -> Vec<MapRecord> {
        self.state.borrow().maps.clone()
    }

    pub fn markers(&self) -> Vec<MarkerRecord> {
        self.state.borrow().markers.clone()
    }

    pub fn popups(&self) -> Vec<PopupRecord> {
        self.state.borrow().popups.clone()
    }

    /// Library calls in the order they were made
    pub fn calls(&self) -> Vec<LibraryCall> {
        self.state.borrow().calls.clone()
    }

    fn check_fault(&self, fault: Fault) -> Result<()> {
        if self.state.borrow().fault == Some(fault) {
            return Err(Error::Library(format!("simulated {:?} failure", fault)));
        }
        Ok(())
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime for HeadlessHost {
    type Mount = String;

    fn mount_point(&self, id: &str) -> Option<String> {
        self.state
            .borrow()
            .mounts
            .iter()
            .find(|mount| mount.as_str() == id)
            .cloned()
    }

    fn library_present(&self) -> bool {
        self.state.borrow().library_present
    }

    fn script_slot(&self) -> Rc<ScriptSlot> {
        self.slot.clone()
    }

    fn inject_script(&self, src: &str, done: ScriptCallback) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.scripts.push(src.to_string());
        state.pending_loads.push_back(done);
        Ok(())
    }

    fn set_timeout(&self, delay: Duration, callback: Callback) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id());
        let due = state.now + delay;
        state.timers.insert((due, id), callback);
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.state.borrow_mut().timers.retain(|key, _| key.1 != id);
    }

    fn observe_resize(&self, _mount: &String, listener: Listener) -> Result<Option<WatchId>> {
        let mut state = self.state.borrow_mut();
        if !state.resize_observer {
            return Ok(None);
        }
        let id = WatchId(state.next_id());
        state.container_observers.insert(id, listener);
        Ok(Some(id))
    }

    fn listen_window_resize(&self, listener: Listener) -> Result<WatchId> {
        let mut state = self.state.borrow_mut();
        let id = WatchId(state.next_id());
        state.window_listeners.insert(id, listener);
        Ok(id)
    }

    fn unwatch(&self, id: WatchId) {
        let mut state = self.state.borrow_mut();
        state.container_observers.remove(&id);
        state.window_listeners.remove(&id);
    }
}

impl MapsApi for HeadlessHost {
    type Map = MapRef;
    type Marker = MarkerRef;
    type Popup = PopupRef;

    fn create_map(&self, mount: &String, options: &MapOptions) -> Result<MapRef> {
        self.check_fault(Fault::Map)?;
        let mut state = self.state.borrow_mut();
        let map = MapRef(state.maps.len());
        state.maps.push(MapRecord {
            mount: mount.clone(),
            options: options.clone(),
            center: options.center,
            disposed: false,
        });
        state.calls.push(LibraryCall::MapCreated {
            map,
            mount: mount.clone(),
        });
        Ok(map)
    }

    fn create_marker(&self, map: &MapRef, options: &MarkerOptions) -> Result<MarkerRef> {
        self.check_fault(Fault::Marker)?;
        let mut state = self.state.borrow_mut();
        let marker = MarkerRef(state.markers.len());
        state.markers.push(MarkerRecord {
            map: *map,
            options: options.clone(),
            attached: true,
        });
        state.calls.push(LibraryCall::MarkerCreated {
            marker,
            map: *map,
            position: options.position,
        });
        Ok(marker)
    }

    fn create_popup(&self, options: &PopupOptions) -> Result<PopupRef> {
        self.check_fault(Fault::Popup)?;
        let mut state = self.state.borrow_mut();
        let popup = PopupRef(state.popups.len());
        state.popups.push(PopupRecord {
            options: options.clone(),
            anchor: None,
            open: false,
        });
        state.calls.push(LibraryCall::PopupCreated { popup });
        Ok(popup)
    }

    fn on_marker_click(&self, marker: &MarkerRef, listener: Listener) -> Result<()> {
        self.check_fault(Fault::Click)?;
        self.state
            .borrow_mut()
            .click_handlers
            .entry(*marker)
            .or_default()
            .push(listener);
        Ok(())
    }

    fn open_popup(&self, popup: &PopupRef, _map: &MapRef, marker: &MarkerRef) {
        let mut state = self.state.borrow_mut();
        let at = state.now;
        if let Some(record) = state.popups.get_mut(popup.0) {
            record.anchor = Some(*marker);
            record.open = true;
        }
        state.calls.push(LibraryCall::PopupOpened {
            popup: *popup,
            marker: *marker,
            at,
        });
    }

    fn trigger_resize(&self, map: &MapRef) {
        let mut state = self.state.borrow_mut();
        let at = state.now;
        state.calls.push(LibraryCall::LayoutRecomputed { map: *map, at });
    }

    fn set_center(&self, map: &MapRef, center: Coordinates) {
        let mut state = self.state.borrow_mut();
        let at = state.now;
        if let Some(record) = state.maps.get_mut(map.0) {
            record.center = center;
        }
        state.calls.push(LibraryCall::Recentered {
            map: *map,
            center,
            at,
        });
    }

    fn close_popup(&self, popup: &PopupRef) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.popups.get_mut(popup.0) {
            record.open = false;
        }
        state.calls.push(LibraryCall::PopupClosed { popup: *popup });
    }

    fn detach_marker(&self, marker: &MarkerRef) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.markers.get_mut(marker.0) {
            record.attached = false;
        }
        state.click_handlers.remove(marker);
        state.calls.push(LibraryCall::MarkerDetached { marker: *marker });
    }

    fn dispose_map(&self, map: &MapRef) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.maps.get_mut(map.0) {
            record.disposed = true;
        }
        state.calls.push(LibraryCall::MapDisposed { map: *map });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_timers_fire_in_order() {
        let host = HeadlessHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (tag, ms) in [("late", 300), ("early", 100), ("tie", 100)] {
            let log = log.clone();
            host.set_timeout(
                Duration::from_millis(ms),
                Box::new(move || log.borrow_mut().push(tag)),
            );
        }

        host.advance(Duration::from_millis(99));
        assert!(log.borrow().is_empty());

        host.advance(Duration::from_millis(1));
        assert_eq!(*log.borrow(), vec!["early", "tie"]);

        host.advance(Duration::from_secs(1));
        assert_eq!(*log.borrow(), vec!["early", "tie", "late"]);
        assert_eq!(host.now(), Duration::from_millis(1100));
    }

    #[test]
    fn test_cleared_timer_never_fires() {
        let host = HeadlessHost::new();
        let fired = Rc::new(Cell::new(false));

        let flag = fired.clone();
        let id = host.set_timeout(Duration::from_millis(10), Box::new(move || flag.set(true)));
        host.clear_timeout(id);
        host.advance(Duration::from_secs(1));

        assert!(!fired.get());
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn test_timer_scheduled_from_timer_runs_in_same_advance() {
        let host = Rc::new(HeadlessHost::new());
        let fired = Rc::new(Cell::new(0));

        let inner_host = host.clone();
        let counter = fired.clone();
        host.set_timeout(
            Duration::from_millis(10),
            Box::new(move || {
                let counter = counter.clone();
                inner_host.set_timeout(
                    Duration::from_millis(10),
                    Box::new(move || counter.set(counter.get() + 1)),
                );
            }),
        );

        host.advance(Duration::from_millis(20));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_script_load_marks_library_present() {
        let host = HeadlessHost::new();
        let outcome = Rc::new(Cell::new(None));

        let seen = outcome.clone();
        host.inject_script(
            "https://example.test/lib.js",
            Box::new(move |o: ScriptOutcome| seen.set(Some(o))),
        )
        .unwrap();
        assert!(!host.library_present());
        assert_eq!(host.pending_loads(), 1);

        assert!(host.complete_script_load());
        assert!(host.library_present());
        assert_eq!(outcome.get(), Some(ScriptOutcome::Loaded));
        assert!(!host.complete_script_load());
    }

    #[test]
    fn test_mount_lookup() {
        assert_eq!(
            HeadlessHost::new().mount_point("map-container"),
            Some("map-container".to_string())
        );
        assert_eq!(HeadlessHost::new().mount_point("elsewhere"), None);
        assert_eq!(HeadlessHost::new().without_mount().mount_point("map-container"), None);
        assert!(HeadlessHost::new().with_mount("pin").mount_point("pin").is_some());
    }

    #[test]
    fn test_unwatch_stops_delivery() {
        let host = HeadlessHost::new();
        let calls = Rc::new(Cell::new(0));

        let counter = calls.clone();
        let id = host
            .listen_window_resize(Rc::new(move || counter.set(counter.get() + 1)))
            .unwrap();
        host.resize_window();
        host.unwatch(id);
        host.resize_window();

        assert_eq!(calls.get(), 1);
        assert_eq!(host.active_watches(), 0);
    }

    #[test]
    fn test_fault_injection() {
        let host = HeadlessHost::new().with_fault(Fault::Marker);
        let options = MapOptions::from_config(&crate::config::Config::default());

        let map = host.create_map(&"map-container".to_string(), &options).unwrap();
        let marker_options = MarkerOptions::from_config(&crate::config::Config::default());
        assert!(host.create_marker(&map, &marker_options).is_err());
        assert!(host.markers().is_empty());
    }
}
