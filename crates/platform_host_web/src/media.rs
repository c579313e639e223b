//! `HtmlAudioElement`-backed media handle.

use std::{cell::RefCell, rc::Rc};

use futures::{channel::oneshot, future::LocalBoxFuture};
use platform_host::{resolve_media_url, MediaEndedCallback, MediaHandle, MediaTimeCallback};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

const HAVE_ENOUGH_DATA: u16 = 4;

/// Pending `ready()` futures. One `canplaythrough` releases all of them.
#[derive(Clone, Default)]
struct ReadyWaiters(Rc<RefCell<Vec<oneshot::Sender<()>>>>);

impl ReadyWaiters {
    /// Resolves on the next release. Stays pending if the waiters are dropped first.
    fn wait(&self) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        self.0.borrow_mut().push(tx);
        Box::pin(async move {
            if rx.await.is_err() {
                futures::future::pending::<()>().await;
            }
        })
    }

    /// Resolves every current waiter and returns how many there were.
    fn release(&self) -> usize {
        let waiters = std::mem::take(&mut *self.0.borrow_mut());
        let count = waiters.len();
        for tx in waiters {
            let _ = tx.send(());
        }
        count
    }
}

/// Browser media handle owning one detached `<audio>` element.
pub struct WebMediaHandle {
    audio: HtmlAudioElement,
    ready_waiters: ReadyWaiters,
    on_ready: Closure<dyn FnMut()>,
    on_ended: RefCell<Option<Closure<dyn FnMut()>>>,
    on_time_update: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl WebMediaHandle {
    /// Creates a handle with a fresh audio element.
    ///
    /// # Errors
    ///
    /// Returns an error when the element cannot be constructed.
    pub fn new() -> Result<Self, String> {
        let audio =
            HtmlAudioElement::new().map_err(|e| format!("audio element creation failed: {e:?}"))?;
        audio.set_preload("auto");
        let ready_waiters = ReadyWaiters::default();
        // Detaches itself so later seeks and rebuffers do not re-enter it.
        let on_ready = Closure::<dyn FnMut()>::new({
            let audio = audio.clone();
            let waiters = ready_waiters.clone();
            move || {
                audio.set_oncanplaythrough(None);
                waiters.release();
            }
        });
        Ok(Self {
            audio,
            ready_waiters,
            on_ready,
            on_ended: RefCell::new(None),
            on_time_update: RefCell::new(None),
        })
    }

    fn document_base() -> String {
        web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default()
    }
}

impl MediaHandle for WebMediaHandle {
    fn src(&self) -> Option<String> {
        let src = self.audio.src();
        (!src.is_empty()).then_some(src)
    }

    fn resolve_url(&self, src: &str) -> String {
        let base = Self::document_base();
        web_sys::Url::new_with_base(src, &base)
            .map(|url| url.href())
            .unwrap_or_else(|_| resolve_media_url(&base, src))
    }

    fn set_src(&self, url: &str) {
        self.audio.set_src(url);
    }

    fn clear_src(&self) {
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
    }

    fn load(&self) {
        self.audio.load();
    }

    fn play(&self) -> LocalBoxFuture<'static, Result<(), String>> {
        let promise = self.audio.play();
        Box::pin(async move {
            let promise = promise.map_err(|e| format!("play() threw: {e:?}"))?;
            JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|e| format!("play() rejected: {e:?}"))
        })
    }

    fn pause(&self) {
        let _ = self.audio.pause();
    }

    fn set_volume(&self, volume: f64) {
        self.audio.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_muted(&self, muted: bool) {
        self.audio.set_muted(muted);
    }

    fn set_looping(&self, looping: bool) {
        self.audio.set_loop(looping);
    }

    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn seek(&self, seconds: f64) {
        self.audio.set_current_time(seconds.max(0.0));
    }

    fn ready(&self) -> LocalBoxFuture<'static, ()> {
        if self.audio.ready_state() >= HAVE_ENOUGH_DATA {
            return Box::pin(futures::future::ready(()));
        }
        let ready = self.ready_waiters.wait();
        self.audio
            .set_oncanplaythrough(Some(self.on_ready.as_ref().unchecked_ref()));
        ready
    }

    fn set_on_ended(&self, callback: Option<MediaEndedCallback>) {
        let closure = callback.map(|callback| Closure::<dyn FnMut()>::new(move || callback()));
        self.audio
            .set_onended(closure.as_ref().map(|c| c.as_ref().unchecked_ref()));
        *self.on_ended.borrow_mut() = closure;
    }

    fn set_on_time_update(&self, callback: Option<MediaTimeCallback>) {
        let audio = self.audio.clone();
        let closure = callback.map(|callback| {
            Closure::<dyn FnMut()>::new(move || callback(audio.current_time()))
        });
        self.audio
            .set_ontimeupdate(closure.as_ref().map(|c| c.as_ref().unchecked_ref()));
        *self.on_time_update.borrow_mut() = closure;
    }
}

impl Drop for WebMediaHandle {
    fn drop(&mut self) {
        self.audio.set_onended(None);
        self.audio.set_ontimeupdate(None);
        self.audio.set_oncanplaythrough(None);
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    #[test]
    fn one_release_resolves_every_waiter_once() {
        let waiters = ReadyWaiters::default();
        let first = waiters.wait();
        let second = waiters.wait();
        assert_eq!(waiters.release(), 2);
        assert_eq!(first.now_or_never(), Some(()));
        assert_eq!(second.now_or_never(), Some(()));

        // A repeated canplaythrough with nobody waiting is a no-op.
        assert_eq!(waiters.release(), 0);

        let mut later = waiters.wait();
        assert!((&mut later).now_or_never().is_none());
        assert_eq!(waiters.release(), 1);
        assert_eq!(later.now_or_never(), Some(()));
    }

    #[test]
    fn dropped_waiters_leave_the_future_pending() {
        let waiters = ReadyWaiters::default();
        let pending = waiters.wait();
        drop(waiters);
        assert!(pending.now_or_never().is_none());
    }
}
