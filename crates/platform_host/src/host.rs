//! Shared host-bundle and capability models for browser and headless runtime composition.

use std::rc::Rc;

use futures::task::LocalSpawn;

use crate::{
    Clock, DocumentTitleService, DurableStore, MediaHandle, MediaHandleFactory, MemoryMediaHandle,
    NoopDocumentTitle, NoopDurableStore, PendingSleeper, Sleeper, SystemClock,
};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed runtime composition.
    Browser,
    /// Headless composition with in-memory or no-op adapters (tests, non-wasm targets).
    Headless,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics and runtime inspection.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Headless => "headless",
        }
    }
}

/// Host availability state for one optional capability domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Capability is available.
    Available,
    /// Capability is not supported on the active host.
    Unavailable,
    /// Capability exists but stays blocked until a user gesture (browser autoplay policy).
    RequiresUserActivation,
}

impl CapabilityStatus {
    /// Returns whether the capability can be used immediately.
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Host capability snapshot exposed to runtime wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Durable key/value storage.
    pub durable_storage: CapabilityStatus,
    /// Audio playback.
    pub media_playback: CapabilityStatus,
    /// Tab title updates.
    pub document_title: CapabilityStatus,
}

impl HostCapabilities {
    /// Browser-default capability posture.
    pub const fn browser() -> Self {
        Self {
            durable_storage: CapabilityStatus::Available,
            media_playback: CapabilityStatus::RequiresUserActivation,
            document_title: CapabilityStatus::Available,
        }
    }

    /// Headless capability posture.
    pub const fn headless() -> Self {
        Self {
            durable_storage: CapabilityStatus::Unavailable,
            media_playback: CapabilityStatus::Unavailable,
            document_title: CapabilityStatus::Unavailable,
        }
    }

    /// Returns the default capability posture for `strategy`.
    pub const fn for_strategy(strategy: HostStrategy) -> Self {
        match strategy {
            HostStrategy::Browser => Self::browser(),
            HostStrategy::Headless => Self::headless(),
        }
    }
}

/// Runtime-selected host service bundle injected into the desktop runtime.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `desktop_runtime`, which keeps the runtime decoupled from browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Durable key/value store backing feature atoms and the desktop layout.
    pub store: Rc<dyn DurableStore>,
    /// Tab title service.
    pub document_title: Rc<dyn DocumentTitleService>,
    /// Factory for media handles owned by the ambience and music managers.
    pub media_factory: MediaHandleFactory,
    /// Wall clock used by the timer worker and session records.
    pub clock: Rc<dyn Clock>,
    /// Bounded-wait timer used by media loading.
    pub sleeper: Rc<dyn Sleeper>,
    /// Local task spawner for worker loops and media `play()` calls.
    pub spawner: Rc<dyn LocalSpawn>,
    /// Host availability snapshot.
    pub capabilities: HostCapabilities,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Builds a headless bundle: no persistence, no title, in-memory media, and the given
    /// spawner.
    pub fn headless(spawner: Rc<dyn LocalSpawn>) -> Self {
        Self {
            store: Rc::new(NoopDurableStore),
            document_title: Rc::new(NoopDocumentTitle),
            media_factory: Rc::new(|| Rc::new(MemoryMediaHandle::default()) as Rc<dyn MediaHandle>),
            clock: Rc::new(SystemClock),
            sleeper: Rc::new(PendingSleeper),
            spawner,
            capabilities: HostCapabilities::headless(),
            host_strategy: HostStrategy::Headless,
        }
    }

    /// Returns a fresh media handle from the configured factory.
    pub fn new_media_handle(&self) -> Rc<dyn MediaHandle> {
        (self.media_factory)()
    }
}
