//! Document title and page lifecycle adapters.

use std::rc::Rc;

use desktop_app_contract::PageLifecycleEvent;
use platform_host::DocumentTitleService;

#[derive(Debug, Clone, Copy, Default)]
/// Browser tab title service backed by `document.title`.
pub struct WebDocumentTitle;

impl DocumentTitleService for WebDocumentTitle {
    fn title(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::window()
                .and_then(|w| w.document())
                .map(|d| d.title())
                .unwrap_or_default()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            String::new()
        }
    }

    fn set_title(&self, title: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                document.set_title(title);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = title;
        }
    }
}

/// Guard keeping page lifecycle listeners installed; dropping it removes them.
pub struct PageLifecycleListener {
    #[cfg(target_arch = "wasm32")]
    visibility: wasm_bindgen::closure::Closure<dyn FnMut()>,
    #[cfg(target_arch = "wasm32")]
    pagehide: wasm_bindgen::closure::Closure<dyn FnMut()>,
}

/// Installs `visibilitychange` and `pagehide` listeners forwarding to `callback`.
///
/// Returns `None` when no document exists (non-browser targets).
pub fn install_page_lifecycle_listener(
    callback: Rc<dyn Fn(PageLifecycleEvent)>,
) -> Option<PageLifecycleListener> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::{closure::Closure, JsCast};

        let window = web_sys::window()?;
        let document = window.document()?;

        let visibility = Closure::<dyn FnMut()>::new({
            let document = document.clone();
            let callback = callback.clone();
            move || {
                callback(if document.hidden() {
                    PageLifecycleEvent::Hidden
                } else {
                    PageLifecycleEvent::Visible
                })
            }
        });
        let pagehide = Closure::<dyn FnMut()>::new(move || callback(PageLifecycleEvent::Unload));

        document
            .add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())
            .ok()?;
        window
            .add_event_listener_with_callback("pagehide", pagehide.as_ref().unchecked_ref())
            .ok()?;

        Some(PageLifecycleListener {
            visibility,
            pagehide,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = callback;
        None
    }
}

impl Drop for PageLifecycleListener {
    fn drop(&mut self) {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;

            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    let _ = document.remove_event_listener_with_callback(
                        "visibilitychange",
                        self.visibility.as_ref().unchecked_ref(),
                    );
                }
                let _ = window.remove_event_listener_with_callback(
                    "pagehide",
                    self.pagehide.as_ref().unchecked_ref(),
                );
            }
        }
    }
}
