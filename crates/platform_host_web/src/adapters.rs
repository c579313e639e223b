//! Host-strategy selection and host service bundle construction.

use std::rc::Rc;

use platform_host::{HostCapabilities, HostServices, HostStrategy, MediaHandle, MemoryMediaHandle};

use crate::{WebDocumentTitle, WebDurableStore, WebSleeper, WebSpawner};

/// Returns the host strategy for the active build target.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(target_arch = "wasm32")]
    {
        HostStrategy::Browser
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        HostStrategy::Headless
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Creates a media handle for the active target.
///
/// Falls back to an in-memory handle when no audio element can be created.
pub fn media_handle() -> Rc<dyn MediaHandle> {
    #[cfg(target_arch = "wasm32")]
    {
        match crate::WebMediaHandle::new() {
            Ok(handle) => return Rc::new(handle),
            Err(err) => console_warn(&err),
        }
    }

    Rc::new(MemoryMediaHandle::default())
}

#[cfg(target_arch = "wasm32")]
fn console_warn(message: &str) {
    web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(message));
}

/// Builds the host service bundle for the selected strategy.
pub fn build_host_services() -> HostServices {
    let strategy = selected_host_strategy();
    match strategy {
        HostStrategy::Browser => HostServices {
            store: Rc::new(WebDurableStore),
            document_title: Rc::new(WebDocumentTitle),
            media_factory: Rc::new(media_handle),
            clock: Rc::new(platform_host::SystemClock),
            sleeper: Rc::new(WebSleeper),
            spawner: Rc::new(WebSpawner),
            capabilities: HostCapabilities::for_strategy(strategy),
            host_strategy: strategy,
        },
        HostStrategy::Headless => HostServices::headless(Rc::new(WebSpawner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_build_selects_headless_bundle() {
        assert_eq!(host_strategy_name(), "headless");
        let services = build_host_services();
        assert_eq!(services.host_strategy, HostStrategy::Headless);
        assert!(!services.store.is_available());
    }
}
