//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate is the concrete browser-side host wiring layer: `localStorage` persistence,
//! `<audio>` playback, the tab title, page visibility events, timeouts, and task spawning.
//! Native builds compile the same API with inert fallbacks.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod adapters;
pub mod document;
pub mod media;
pub mod storage;
pub mod task;

pub use adapters::{build_host_services, host_strategy_name, media_handle, selected_host_strategy};
pub use document::{install_page_lifecycle_listener, PageLifecycleListener, WebDocumentTitle};
#[cfg(target_arch = "wasm32")]
pub use media::WebMediaHandle;
pub use storage::local_storage::WebDurableStore;
pub use task::{WebSleeper, WebSpawner};
