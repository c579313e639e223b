//! Typed host-domain contracts shared by the desktop runtime and browser adapters.
//!
//! This crate is the API-first boundary for platform services: durable key/value storage, wall
//! clock and bounded waits, media playback handles, and the tab title. Concrete browser adapters
//! live in `platform_host_web`; in-memory adapters here back headless composition and tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod document;
pub mod host;
pub mod media;
pub mod storage;
pub mod time;

pub use document::{DocumentTitleService, MemoryDocumentTitle, NoopDocumentTitle};
pub use host::{CapabilityStatus, HostCapabilities, HostServices, HostStrategy};
pub use media::{
    resolve_media_url, MediaCall, MediaEndedCallback, MediaHandle, MediaHandleFactory,
    MediaTimeCallback, MemoryMediaHandle,
};
pub use storage::durable::{
    load_json_with, save_json_with, DurableStore, MemoryDurableStore, NoopDurableStore,
};
pub use time::{
    unix_time_ms_now, Clock, InstantSleeper, ManualClock, PendingSleeper, Sleeper, SystemClock,
};
