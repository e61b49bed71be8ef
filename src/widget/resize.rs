//! Resize synchronization
//!
//! The library only lays itself out when told to. Once the view is
//! attached, container size changes trigger a layout recompute and window
//! resizes trigger a recompute plus a re-center on the pin, each after its
//! configured delay. A new signal of the same kind while one is pending
//! restarts the delay.

use super::Shared;
use crate::host::{Listener, MapsApi, TimerId, WatchId};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// What asked for a re-layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTrigger {
    /// The mount element changed size
    Container,
    /// The window fired `resize`
    Window,
}

/// Observers and pending timers registered by a widget
#[derive(Debug, Default)]
pub(crate) struct ResizeSync {
    watches: Vec<WatchId>,
    container_timer: Option<TimerId>,
    window_timer: Option<TimerId>,
}

impl ResizeSync {
    fn pending(&mut self, trigger: ResizeTrigger) -> &mut Option<TimerId> {
        match trigger {
            ResizeTrigger::Container => &mut self.container_timer,
            ResizeTrigger::Window => &mut self.window_timer,
        }
    }

    /// Take everything registered, leaving nothing behind
    pub(crate) fn drain(&mut self) -> (Vec<WatchId>, Vec<TimerId>) {
        let watches = std::mem::take(&mut self.watches);
        let timers = [self.container_timer.take(), self.window_timer.take()]
            .into_iter()
            .flatten()
            .collect();
        (watches, timers)
    }
}

impl<H: MapsApi + 'static> Shared<H> {
    fn delay_for(&self, trigger: ResizeTrigger) -> Duration {
        match trigger {
            ResizeTrigger::Container => self.config.container_delay(),
            ResizeTrigger::Window => self.config.window_delay(),
        }
    }

    fn listener(self: &Rc<Self>, trigger: ResizeTrigger) -> Listener {
        let weak = Rc::downgrade(self);
        Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.schedule(trigger);
            }
        })
    }

    /// Start observing; called once the view is attached
    pub(super) fn attach_resize_sync(self: &Rc<Self>, mount: &H::Mount) {
        let mut watches = Vec::new();

        match self
            .host
            .observe_resize(mount, self.listener(ResizeTrigger::Container))
        {
            Ok(Some(id)) => watches.push(id),
            Ok(None) => debug!("size observation unavailable, relying on window resize"),
            Err(e) => warn!(error = %e, "could not observe container size"),
        }

        match self
            .host
            .listen_window_resize(self.listener(ResizeTrigger::Window))
        {
            Ok(id) => watches.push(id),
            Err(e) => warn!(error = %e, "could not listen for window resize"),
        }

        debug!(watches = watches.len(), "resize sync attached");
        self.inner.borrow_mut().resize.watches.extend(watches);
    }

    fn schedule(self: &Rc<Self>, trigger: ResizeTrigger) {
        {
            let inner = self.inner.borrow();
            if !inner.live || inner.view.is_none() {
                return;
            }
        }

        let weak = Rc::downgrade(self);
        let id = self.host.set_timeout(
            self.delay_for(trigger),
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.relayout(trigger);
                }
            }),
        );

        let previous = self.inner.borrow_mut().resize.pending(trigger).replace(id);
        if let Some(previous) = previous {
            self.host.clear_timeout(previous);
        }
    }

    fn relayout(&self, trigger: ResizeTrigger) {
        let map = {
            let mut inner = self.inner.borrow_mut();
            *inner.resize.pending(trigger) = None;
            if !inner.live {
                return;
            }
            match &inner.view {
                Some(view) => view.map.clone(),
                None => return,
            }
        };

        self.host.trigger_resize(&map);
        if trigger == ResizeTrigger::Window {
            self.host.set_center(&map, self.config.center());
        }
        debug!(?trigger, "map layout recomputed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_registry() {
        let mut sync = ResizeSync::default();
        sync.watches.push(WatchId(1));
        sync.watches.push(WatchId(2));
        *sync.pending(ResizeTrigger::Window) = Some(TimerId(3));

        let (watches, timers) = sync.drain();
        assert_eq!(watches, vec![WatchId(1), WatchId(2)]);
        assert_eq!(timers, vec![TimerId(3)]);

        let (watches, timers) = sync.drain();
        assert!(watches.is_empty());
        assert!(timers.is_empty());
    }
}
