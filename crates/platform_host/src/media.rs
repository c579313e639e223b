//! Media playback handle contracts and an in-memory recording adapter.
//!
//! A [`MediaHandle`] mirrors the subset of an HTML media element the runtime media managers
//! drive. Only [`MediaHandle::play`] is asynchronous and fallible.

use std::{cell::RefCell, rc::Rc};

use futures::future::LocalBoxFuture;

/// Callback invoked when playback reaches the end of the current source.
pub type MediaEndedCallback = Rc<dyn Fn()>;
/// Callback invoked with the playback position in seconds.
pub type MediaTimeCallback = Rc<dyn Fn(f64)>;

/// Playback handle owned by exactly one runtime media manager.
pub trait MediaHandle {
    /// Returns the absolute URL currently loaded, if any.
    fn src(&self) -> Option<String>;

    /// Resolves `src` to the absolute URL the handle would load for it.
    fn resolve_url(&self, src: &str) -> String;

    /// Replaces the media source.
    fn set_src(&self, url: &str);

    /// Removes the media source and releases buffered data.
    fn clear_src(&self);

    /// Starts loading the current source without playing it.
    fn load(&self);

    /// Requests playback. Resolves with an error when the host rejects playback.
    fn play(&self) -> LocalBoxFuture<'static, Result<(), String>>;

    /// Pauses playback.
    fn pause(&self);

    /// Sets output volume in `[0, 1]`.
    fn set_volume(&self, volume: f64);

    /// Mutes or unmutes output.
    fn set_muted(&self, muted: bool);

    /// Enables or disables looping of the current source.
    fn set_looping(&self, looping: bool);

    /// Returns the playback position in seconds.
    fn current_time(&self) -> f64;

    /// Moves the playback position to `seconds`.
    fn seek(&self, seconds: f64);

    /// Resolves once the current source can play through.
    fn ready(&self) -> LocalBoxFuture<'static, ()>;

    /// Installs (or clears) the end-of-media callback.
    fn set_on_ended(&self, callback: Option<MediaEndedCallback>);

    /// Installs (or clears) the playback-position callback.
    fn set_on_time_update(&self, callback: Option<MediaTimeCallback>);
}

/// Factory producing fresh media handles for managers on mount.
pub type MediaHandleFactory = Rc<dyn Fn() -> Rc<dyn MediaHandle>>;

/// Resolves a media `src` against `origin` the way a document base URL would.
pub fn resolve_media_url(origin: &str, src: &str) -> String {
    let src = src.trim();
    if src.contains("://") || src.starts_with("data:") || src.starts_with("blob:") {
        return src.to_string();
    }
    if let Some(rest) = src.strip_prefix("//") {
        return format!("https://{rest}");
    }
    let origin = origin.trim_end_matches('/');
    if src.starts_with('/') {
        format!("{origin}{src}")
    } else {
        format!("{origin}/{src}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// One recorded call against a [`MemoryMediaHandle`].
pub enum MediaCall {
    /// `set_src` was called.
    SetSrc,
    /// `clear_src` was called.
    ClearSrc,
    /// `load` was called.
    Load,
    /// `play` was called.
    Play,
    /// `pause` was called.
    Pause,
    /// `seek` was called with the given position.
    Seek(f64),
}

#[derive(Default)]
struct MemoryMediaState {
    src: Option<String>,
    paused: bool,
    volume: f64,
    muted: bool,
    looping: bool,
    current_time: f64,
    calls: Vec<MediaCall>,
    reject_play: Option<String>,
    ready_immediately: bool,
    on_ended: Option<MediaEndedCallback>,
    on_time_update: Option<MediaTimeCallback>,
}

#[derive(Clone)]
/// In-memory media handle that records calls, for headless tests and non-browser targets.
pub struct MemoryMediaHandle {
    origin: Rc<str>,
    inner: Rc<RefCell<MemoryMediaState>>,
}

impl Default for MemoryMediaHandle {
    fn default() -> Self {
        Self::new("http://localhost")
    }
}

impl MemoryMediaHandle {
    /// Creates a paused handle resolving relative sources against `origin`.
    pub fn new(origin: &str) -> Self {
        Self {
            origin: Rc::from(origin),
            inner: Rc::new(RefCell::new(MemoryMediaState {
                paused: true,
                volume: 1.0,
                ready_immediately: true,
                ..MemoryMediaState::default()
            })),
        }
    }

    /// Makes the next `play` call reject with `reason`.
    pub fn reject_next_play(&self, reason: impl Into<String>) {
        self.inner.borrow_mut().reject_play = Some(reason.into());
    }

    /// Controls whether [`MediaHandle::ready`] resolves immediately or never.
    pub fn set_ready_immediately(&self, ready: bool) {
        self.inner.borrow_mut().ready_immediately = ready;
    }

    /// Returns all recorded calls in order.
    pub fn calls(&self) -> Vec<MediaCall> {
        self.inner.borrow().calls.clone()
    }

    /// Returns how many times `call` was recorded.
    pub fn count(&self, call: MediaCall) -> usize {
        self.inner.borrow().calls.iter().filter(|c| **c == call).count()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    /// Returns whether the handle is paused.
    pub fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    /// Returns the applied volume.
    pub fn volume(&self) -> f64 {
        self.inner.borrow().volume
    }

    /// Returns whether output is muted.
    pub fn is_muted(&self) -> bool {
        self.inner.borrow().muted
    }

    /// Returns whether looping is enabled.
    pub fn is_looping(&self) -> bool {
        self.inner.borrow().looping
    }

    /// Simulates the current source reaching its end.
    pub fn finish(&self) {
        let callback = {
            let mut state = self.inner.borrow_mut();
            state.paused = true;
            state.on_ended.clone()
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Simulates playback progressing to `seconds`.
    pub fn advance_to(&self, seconds: f64) {
        let callback = {
            let mut state = self.inner.borrow_mut();
            state.current_time = seconds;
            state.on_time_update.clone()
        };
        if let Some(callback) = callback {
            callback(seconds);
        }
    }

    fn record(&self, call: MediaCall) {
        self.inner.borrow_mut().calls.push(call);
    }
}

impl MediaHandle for MemoryMediaHandle {
    fn src(&self) -> Option<String> {
        self.inner.borrow().src.clone()
    }

    fn resolve_url(&self, src: &str) -> String {
        resolve_media_url(&self.origin, src)
    }

    fn set_src(&self, url: &str) {
        let resolved = self.resolve_url(url);
        {
            let mut state = self.inner.borrow_mut();
            state.src = Some(resolved);
            state.paused = true;
            state.current_time = 0.0;
        }
        self.record(MediaCall::SetSrc);
    }

    fn clear_src(&self) {
        {
            let mut state = self.inner.borrow_mut();
            state.src = None;
            state.paused = true;
            state.current_time = 0.0;
        }
        self.record(MediaCall::ClearSrc);
    }

    fn load(&self) {
        self.record(MediaCall::Load);
    }

    fn play(&self) -> LocalBoxFuture<'static, Result<(), String>> {
        self.record(MediaCall::Play);
        let result = {
            let mut state = self.inner.borrow_mut();
            match state.reject_play.take() {
                Some(reason) => Err(reason),
                None if state.src.is_none() => Err("no media source".to_string()),
                None => {
                    state.paused = false;
                    Ok(())
                }
            }
        };
        Box::pin(futures::future::ready(result))
    }

    fn pause(&self) {
        self.inner.borrow_mut().paused = true;
        self.record(MediaCall::Pause);
    }

    fn set_volume(&self, volume: f64) {
        self.inner.borrow_mut().volume = volume.clamp(0.0, 1.0);
    }

    fn set_muted(&self, muted: bool) {
        self.inner.borrow_mut().muted = muted;
    }

    fn set_looping(&self, looping: bool) {
        self.inner.borrow_mut().looping = looping;
    }

    fn current_time(&self) -> f64 {
        self.inner.borrow().current_time
    }

    fn seek(&self, seconds: f64) {
        self.inner.borrow_mut().current_time = seconds.max(0.0);
        self.record(MediaCall::Seek(seconds));
    }

    fn ready(&self) -> LocalBoxFuture<'static, ()> {
        if self.inner.borrow().ready_immediately {
            Box::pin(futures::future::ready(()))
        } else {
            Box::pin(futures::future::pending())
        }
    }

    fn set_on_ended(&self, callback: Option<MediaEndedCallback>) {
        self.inner.borrow_mut().on_ended = callback;
    }

    fn set_on_time_update(&self, callback: Option<MediaTimeCallback>) {
        self.inner.borrow_mut().on_time_update = callback;
    }
}
