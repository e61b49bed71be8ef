//! Script loading
//!
//! Makes sure the maps library is in the page before any map API is used,
//! injecting its script at most once per page no matter how many widgets
//! ask for it.

use crate::host::{Runtime, ScriptCallback, ScriptOutcome, SlotStatus};
use tracing::{debug, error, info, warn};

/// Ensure the maps library is loaded, then run `done` with the outcome
///
/// - Library already present (e.g. injected by the host page): `done` runs
///   immediately with [`ScriptOutcome::Loaded`] and nothing is injected.
/// - A load is already in flight: `done` is queued behind it.
/// - Otherwise the script at `src` is injected and `done` runs when it
///   loads or fails.
pub fn ensure_library<R: Runtime + ?Sized>(runtime: &R, src: &str, done: ScriptCallback) {
    let slot = runtime.script_slot();

    if runtime.library_present() {
        if slot.status() == SlotStatus::Absent {
            slot.mark_loaded();
        }
        debug!("maps library already present, skipping script injection");
        done(ScriptOutcome::Loaded);
        return;
    }

    let done = match slot.join(done) {
        Ok(()) => {
            debug!(waiting = slot.waiting(), "joined in-flight script load");
            return;
        }
        Err(done) => done,
    };

    if slot.status() == SlotStatus::Loaded {
        // The page dropped the library after it loaded
        warn!("maps library missing despite an earlier load, reloading");
        slot.reset();
    }

    if let Err(done) = slot.begin(done) {
        error!(status = ?slot.status(), "script slot in unexpected state");
        done(ScriptOutcome::Failed);
        return;
    }

    info!(
        endpoint = src.split('?').next().unwrap_or(src),
        "injecting maps script"
    );

    let settle = slot.clone();
    if let Err(e) = runtime.inject_script(src, Box::new(move |outcome| settle.settle(outcome))) {
        error!(error = %e, "could not inject maps script");
        slot.settle(ScriptOutcome::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::headless::HeadlessHost;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SRC: &str = "https://maps.googleapis.com/maps/api/js?key=k&libraries=places";

    fn recorder(log: &Rc<RefCell<Vec<ScriptOutcome>>>) -> ScriptCallback {
        let log = log.clone();
        Box::new(move |outcome| log.borrow_mut().push(outcome))
    }

    #[test]
    fn test_present_library_skips_injection() {
        let host = HeadlessHost::new().with_library();
        let log = Rc::new(RefCell::new(Vec::new()));

        ensure_library(&host, SRC, recorder(&log));

        assert_eq!(*log.borrow(), vec![ScriptOutcome::Loaded]);
        assert!(host.injected_scripts().is_empty());
        assert_eq!(host.script_slot().status(), SlotStatus::Loaded);
    }

    #[test]
    fn test_absent_library_injects_once() {
        let host = HeadlessHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        ensure_library(&host, SRC, recorder(&log));
        ensure_library(&host, SRC, recorder(&log));

        assert_eq!(host.injected_scripts(), vec![SRC.to_string()]);
        assert!(log.borrow().is_empty());

        host.complete_script_load();
        assert_eq!(*log.borrow(), vec![ScriptOutcome::Loaded, ScriptOutcome::Loaded]);

        // Later callers find the library present
        ensure_library(&host, SRC, recorder(&log));
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(host.injected_scripts().len(), 1);
    }

    #[test]
    fn test_failure_reaches_every_waiter_and_allows_retry() {
        let host = HeadlessHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        ensure_library(&host, SRC, recorder(&log));
        ensure_library(&host, SRC, recorder(&log));
        host.fail_script_load();

        assert_eq!(*log.borrow(), vec![ScriptOutcome::Failed, ScriptOutcome::Failed]);
        assert_eq!(host.script_slot().status(), SlotStatus::Absent);

        ensure_library(&host, SRC, recorder(&log));
        assert_eq!(host.injected_scripts().len(), 2);
    }
}
