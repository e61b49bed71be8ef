//! The map widget
//!
//! One pin, one popup, one map. The widget runs three steps in order:
//!
//! 1. load the maps library if the page doesn't already have it
//! 2. build the map, marker and popup around the configured coordinate
//! 3. keep the map laid out as its container and the window resize
//!
//! State moves `Idle → Loading → {Ready, Error}`. Ready and Error are
//! terminal; a fresh widget starts over at Idle. Nothing is retried.

pub mod loader;
pub mod options;
pub mod popup;
pub mod resize;
pub mod style;


use crate::config::Config;
use crate::error::{Error, Result};
use crate::host::{MapsApi, ScriptOutcome};
use options::WidgetOptions;
use resize::ResizeSync;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    /// Created, not started
    Idle,
    /// Waiting for the library or building the view
    Loading,
    /// Map, marker and popup are built
    Ready,
    /// Script load or construction failed
    Error,
}

impl WidgetState {
    pub fn is_loading(&self) -> bool {
        *self == Self::Loading
    }

    pub fn has_error(&self) -> bool {
        *self == Self::Error
    }

    pub fn is_ready(&self) -> bool {
        *self == Self::Ready
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Library objects owned by a ready widget
pub struct View<H: MapsApi> {
    pub map: H::Map,
    pub marker: H::Marker,
    pub popup: H::Popup,
}

impl<H: MapsApi> Clone for View<H> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            marker: self.marker.clone(),
            popup: self.popup.clone(),
        }
    }
}

/// Embedded single-pin map
///
/// Dropping the widget tears it down.
pub struct MapWidget<H: MapsApi + 'static> {
    shared: Rc<Shared<H>>,
}

struct Shared<H: MapsApi> {
    host: Rc<H>,
    config: Config,
    options: WidgetOptions,
    inner: RefCell<Inner<H>>,
}

struct Inner<H: MapsApi> {
    state: WidgetState,
    started: bool,
    /// False once torn down; callbacks check it before acting
    live: bool,
    view: Option<View<H>>,
    resize: ResizeSync,
}

impl<H: MapsApi + 'static> MapWidget<H> {
    pub fn new(host: Rc<H>, config: Config) -> Self {
        let options = WidgetOptions::from_config(&config);
        Self {
            shared: Rc::new(Shared {
                host,
                config,
                options,
                inner: RefCell::new(Inner {
                    state: WidgetState::Idle,
                    started: false,
                    live: true,
                    view: None,
                    resize: ResizeSync::default(),
                }),
            }),
        }
    }

    /// Mount: load the library if needed, then build the map
    ///
    /// Runs once per widget; later calls are ignored. Failures end in
    /// [`WidgetState::Error`] and never escape.
    pub fn start(&self) {
        self.shared.start();
    }

    /// Unmount: stop observing, cancel pending timers, release the view
    ///
    /// Idempotent.
    pub fn stop(&self) {
        self.shared.teardown();
    }

    pub fn state(&self) -> WidgetState {
        self.shared.inner.borrow().state
    }

    /// The built map, marker and popup, if ready and not torn down
    pub fn view(&self) -> Option<View<H>> {
        self.shared.inner.borrow().view.clone()
    }

    /// Whether [`MapWidget::stop`] has run
    pub fn is_torn_down(&self) -> bool {
        !self.shared.inner.borrow().live
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.shared.options
    }
}

impl<H: MapsApi + 'static> Drop for MapWidget<H> {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl<H: MapsApi + 'static> Shared<H> {
    fn start(self: &Rc<Self>) {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.live {
                warn!("start() after teardown ignored");
                return;
            }
            if inner.started {
                warn!("start() called twice, ignoring");
                return;
            }
            inner.started = true;
            inner.state = WidgetState::Loading;
        }

        info!(center = %self.config.center(), "starting map widget");

        let weak = Rc::downgrade(self);
        loader::ensure_library(
            &*self.host,
            &self.config.script_url(),
            Box::new(move |outcome| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_script(outcome);
                }
            }),
        );
    }

    fn is_live(&self) -> bool {
        self.inner.borrow().live
    }

    fn on_script(self: &Rc<Self>, outcome: ScriptOutcome) {
        if !self.is_live() {
            debug!(?outcome, "script load finished after teardown, ignoring");
            return;
        }
        match outcome {
            ScriptOutcome::Loaded => self.initialize(),
            ScriptOutcome::Failed => {
                let e = Error::ScriptLoad("failed to load the maps script".to_string());
                error!(error = %e, "map widget failed");
                self.inner.borrow_mut().state = WidgetState::Error;
            }
        }
    }

    fn initialize(self: &Rc<Self>) {
        match self.build_view() {
            Ok((mount, view)) => {
                {
                    let mut inner = self.inner.borrow_mut();
                    inner.view = Some(view);
                    inner.state = WidgetState::Ready;
                }
                info!(zoom = self.config.map.zoom, "map ready");
                self.attach_resize_sync(&mount);
            }
            Err(e) => {
                error!(error = %e, "map initialization failed");
                self.inner.borrow_mut().state = WidgetState::Error;
            }
        }
    }

    fn build_view(self: &Rc<Self>) -> Result<(H::Mount, View<H>)> {
        let mount_id = &self.config.map.mount_id;
        let mount = self
            .host
            .mount_point(mount_id)
            .ok_or_else(|| Error::MountPointMissing(mount_id.clone()))?;

        let map = self.host.create_map(&mount, &self.options.map)?;
        let marker = match self.host.create_marker(&map, &self.options.marker) {
            Ok(marker) => marker,
            Err(e) => {
                self.release(&map, None, None);
                return Err(e);
            }
        };
        let popup = match self.host.create_popup(&self.options.popup) {
            Ok(popup) => popup,
            Err(e) => {
                self.release(&map, Some(&marker), None);
                return Err(e);
            }
        };

        let weak = Rc::downgrade(self);
        let bound = self.host.on_marker_click(
            &marker,
            Rc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.open_popup();
                }
            }),
        );
        if let Err(e) = bound {
            self.release(&map, Some(&marker), Some(&popup));
            return Err(e);
        }

        Ok((mount, View { map, marker, popup }))
    }

    /// Hand back whatever part of the view was built
    fn release(&self, map: &H::Map, marker: Option<&H::Marker>, popup: Option<&H::Popup>) {
        if let Some(popup) = popup {
            self.host.close_popup(popup);
        }
        if let Some(marker) = marker {
            self.host.detach_marker(marker);
        }
        self.host.dispose_map(map);
    }

    fn open_popup(&self) {
        let view = {
            let inner = self.inner.borrow();
            if !inner.live {
                return;
            }
            match &inner.view {
                Some(view) => view.clone(),
                None => return,
            }
        };
        self.host.open_popup(&view.popup, &view.map, &view.marker);
        debug!("popup opened");
    }

    fn teardown(&self) {
        let (watches, timers, view) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.live {
                return;
            }
            inner.live = false;
            let (watches, timers) = inner.resize.drain();
            (watches, timers, inner.view.take())
        };

        for id in watches {
            self.host.unwatch(id);
        }
        for id in timers {
            self.host.clear_timeout(id);
        }
        if let Some(view) = view {
            self.release(&view.map, Some(&view.marker), Some(&view.popup));
        }
        info!("map widget torn down");
    }
}
