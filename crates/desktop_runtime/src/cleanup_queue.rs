//! Process-wide mailbox of window cleanup requests.
//!
//! Window close appends a request; each app manager drains only the requests addressed to its
//! app id. Draining is a single synchronous partition-and-write-back step, so interleaved
//! consumers never see each other's entries and no entry is delivered twice.

use std::{cell::RefCell, rc::Rc};

use desktop_app_contract::{ApplicationId, WindowId};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One pending cleanup for the app presented by a closed window.
pub struct CleanupRequest {
    /// Window that was closed.
    pub window_id: WindowId,
    /// App the window presented.
    pub app_id: ApplicationId,
}

#[derive(Debug, Clone, Default)]
/// Shared cleanup mailbox.
pub struct CleanupQueue {
    pending: Rc<RefCell<Vec<CleanupRequest>>>,
}

impl CleanupQueue {
    /// Appends a request. Duplicates are kept; consumers are idempotent.
    pub fn request_cleanup(&self, window_id: WindowId, app_id: ApplicationId) {
        self.pending
            .borrow_mut()
            .push(CleanupRequest { window_id, app_id });
    }

    /// Removes and returns every request addressed to `app_id`.
    ///
    /// The remainder is written back only when something matched.
    pub fn consume_cleanup_requests(&self, app_id: &ApplicationId) -> Vec<CleanupRequest> {
        let mut pending = self.pending.borrow_mut();
        if !pending.iter().any(|request| request.app_id == *app_id) {
            return Vec::new();
        }
        let (matched, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut *pending)
            .into_iter()
            .partition(|request| request.app_id == *app_id);
        *pending = remaining;
        matched
    }

    /// Returns the number of pending requests.
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Returns whether no requests are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}
