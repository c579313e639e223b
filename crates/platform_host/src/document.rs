//! Document-level host surfaces (tab title).

use std::{cell::RefCell, rc::Rc};

/// Host service for the browser tab title.
pub trait DocumentTitleService {
    /// Returns the current title.
    fn title(&self) -> String;

    /// Replaces the title.
    fn set_title(&self, title: &str);
}

#[derive(Debug, Clone, Copy, Default)]
/// Title service for targets without a document.
pub struct NoopDocumentTitle;

impl DocumentTitleService for NoopDocumentTitle {
    fn title(&self) -> String {
        String::new()
    }

    fn set_title(&self, _title: &str) {}
}

#[derive(Debug, Clone, Default)]
/// In-memory title service that keeps a write history.
pub struct MemoryDocumentTitle {
    history: Rc<RefCell<Vec<String>>>,
}

impl MemoryDocumentTitle {
    /// Returns every title written, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }
}

impl DocumentTitleService for MemoryDocumentTitle {
    fn title(&self) -> String {
        self.history.borrow().last().cloned().unwrap_or_default()
    }

    fn set_title(&self, title: &str) {
        self.history.borrow_mut().push(title.to_string());
    }
}
