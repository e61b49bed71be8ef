//! Host environments
//!
//! The widget never touches a document or a maps library directly. It talks
//! to a host through two traits:
//!
//! - [`Runtime`]: the page and its event loop (mount lookup, script
//!   injection, timers, size observation, window resize)
//! - [`MapsApi`]: the external mapping library
//!
//! ## Flex Point
//! Adding a new host requires:
//! 1. Create `src/host/{host_name}.rs` implementing both traits
//! 2. Add `pub mod {host_name};` below
//!
//! All callbacks are invoked from the host's single-threaded event loop,
//! never re-entrantly from inside the registering call.

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::coord::Coordinates;
use crate::error::Result;
use crate::widget::options::{MapOptions, MarkerOptions, PopupOptions};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// One-shot continuation
pub type Callback = Box<dyn FnOnce()>;

/// Repeating listener
pub type Listener = Rc<dyn Fn()>;

/// Continuation for the end of a script load
pub type ScriptCallback = Box<dyn FnOnce(ScriptOutcome)>;

/// Handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

/// Handle for a registered observer or listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u32);

/// How a script load ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Loaded,
    Failed,
}

/// The page and its event loop
pub trait Runtime {
    /// Mount element handle
    type Mount;

    /// Look up the mount element by id
    fn mount_point(&self, id: &str) -> Option<Self::Mount>;

    /// Whether the maps library is already in the global environment
    fn library_present(&self) -> bool;

    /// The shared record of script loads for this page
    fn script_slot(&self) -> Rc<ScriptSlot>;

    /// Append an async, deferred script tag; `done` runs once when it loads
    /// or fails
    fn inject_script(&self, src: &str, done: ScriptCallback) -> Result<()>;

    /// Run `callback` once after `delay`
    fn set_timeout(&self, delay: Duration, callback: Callback) -> TimerId;

    /// Cancel a timer; unknown or already-fired ids are ignored
    fn clear_timeout(&self, id: TimerId);

    /// Observe size changes of the mount element
    ///
    /// Returns `Ok(None)` when the environment has no size-observation
    /// facility.
    fn observe_resize(&self, mount: &Self::Mount, listener: Listener) -> Result<Option<WatchId>>;

    /// Listen for the window resize event
    fn listen_window_resize(&self, listener: Listener) -> Result<WatchId>;

    /// Drop an observer or listener; unknown ids are ignored
    fn unwatch(&self, id: WatchId);
}

/// The external mapping library
pub trait MapsApi: Runtime {
    type Map: Clone;
    type Marker: Clone;
    type Popup: Clone;

    fn create_map(&self, mount: &Self::Mount, options: &MapOptions) -> Result<Self::Map>;

    fn create_marker(&self, map: &Self::Map, options: &MarkerOptions) -> Result<Self::Marker>;

    fn create_popup(&self, options: &PopupOptions) -> Result<Self::Popup>;

    /// Bind a listener to marker clicks
    fn on_marker_click(&self, marker: &Self::Marker, listener: Listener) -> Result<()>;

    /// Open the popup anchored to the marker
    fn open_popup(&self, popup: &Self::Popup, map: &Self::Map, marker: &Self::Marker);

    /// Fire the library's resize event so it recomputes layout
    fn trigger_resize(&self, map: &Self::Map);

    fn set_center(&self, map: &Self::Map, center: Coordinates);

    fn close_popup(&self, popup: &Self::Popup);

    /// Detach the marker from its map and drop its click listeners
    fn detach_marker(&self, marker: &Self::Marker);

    /// Clear the map out of its mount element
    fn dispose_map(&self, map: &Self::Map);
}

/// Lifecycle of the shared script slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Absent,
    Loading,
    Loaded,
}

enum SlotState {
    Absent,
    Loading(Vec<ScriptCallback>),
    Loaded,
}

/// Process-wide record of whether the library script is absent, in flight,
/// or loaded
///
/// Only the loader mutates it. While a load is in flight, later callers are
/// queued and settled together when it ends, so the script is injected once.
pub struct ScriptSlot {
    state: RefCell<SlotState>,
}

impl ScriptSlot {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SlotState::Absent),
        }
    }

    pub fn status(&self) -> SlotStatus {
        match &*self.state.borrow() {
            SlotState::Absent => SlotStatus::Absent,
            SlotState::Loading(_) => SlotStatus::Loading,
            SlotState::Loaded => SlotStatus::Loaded,
        }
    }

    /// Number of callers waiting on the in-flight load
    pub fn waiting(&self) -> usize {
        match &*self.state.borrow() {
            SlotState::Loading(waiters) => waiters.len(),
            _ => 0,
        }
    }

    /// Record that the library is present without a load through this slot
    pub fn mark_loaded(&self) {
        *self.state.borrow_mut() = SlotState::Loaded;
    }

    /// Forget a finished load; waiters of an in-flight load are kept
    pub(crate) fn reset(&self) {
        let mut state = self.state.borrow_mut();
        if matches!(*state, SlotState::Loaded) {
            *state = SlotState::Absent;
        }
    }

    /// Enter `Loading` with `done` as the first waiter
    ///
    /// Hands `done` back if a load is already in flight or finished.
    pub(crate) fn begin(&self, done: ScriptCallback) -> std::result::Result<(), ScriptCallback> {
        let mut state = self.state.borrow_mut();
        if matches!(*state, SlotState::Absent) {
            *state = SlotState::Loading(vec![done]);
            Ok(())
        } else {
            Err(done)
        }
    }

    /// Queue `done` behind the in-flight load
    ///
    /// Hands `done` back if there is no load in flight.
    pub(crate) fn join(&self, done: ScriptCallback) -> std::result::Result<(), ScriptCallback> {
        match &mut *self.state.borrow_mut() {
            SlotState::Loading(waiters) => {
                waiters.push(done);
                Ok(())
            }
            _ => Err(done),
        }
    }

    /// End the in-flight load and run every waiter
    ///
    /// A failed load returns the slot to `Absent` so a later mount can try
    /// again.
    pub(crate) fn settle(&self, outcome: ScriptOutcome) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            let next = match outcome {
                ScriptOutcome::Loaded => SlotState::Loaded,
                ScriptOutcome::Failed => SlotState::Absent,
            };
            match std::mem::replace(&mut *state, next) {
                SlotState::Loading(waiters) => waiters,
                _ => Vec::new(),
            }
        };

        debug!(?outcome, waiters = waiters.len(), "script slot settled");
        for done in waiters {
            done(outcome);
        }
    }
}

impl Default for ScriptSlot {
    fn default() -> Self {
        Self::new()
    }
}
