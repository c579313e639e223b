//! Cozy Desk desktop runtime: window manager reducer, feature atoms, timer and media managers,
//! and the Leptos shell that ties them together.

pub mod apps;
pub mod atoms;
pub mod bus;
pub mod cleanup_queue;
pub mod components;
mod effect_executor;
pub mod features;
pub mod host;
pub mod lifecycle;
pub mod media;
pub mod model;
pub mod persistence;
pub mod reducer;
mod runtime_context;
pub mod timer;
pub mod title;
pub mod window_manager;

#[cfg(test)]
mod test_support;

pub use components::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext, DesktopShell};
pub use lifecycle::LifecycleCoordinator;
pub use model::*;
pub use persistence::{load_boot_snapshot, persist_layout_snapshot};
pub use reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect};
