//! Browser task spawning and timeout adapters.

use std::time::Duration;

use futures::{
    future::LocalBoxFuture,
    task::{LocalFutureObj, LocalSpawn, SpawnError},
};
use platform_host::Sleeper;

#[derive(Debug, Clone, Copy, Default)]
/// Spawns local futures on the browser microtask queue.
pub struct WebSpawner;

impl LocalSpawn for WebSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(future);
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            drop(future);
            Err(SpawnError::shutdown())
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Sleeper backed by `window.setTimeout`.
pub struct WebSleeper;

impl Sleeper for WebSleeper {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        #[cfg(target_arch = "wasm32")]
        {
            let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
            let promise = js_sys::Promise::new(&mut |resolve, _reject| {
                if let Some(window) = web_sys::window() {
                    let _ = window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
                }
            });
            Box::pin(async move {
                let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = duration;
            Box::pin(futures::future::pending())
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::task::LocalSpawnExt;

    use super::*;

    #[test]
    fn native_spawner_refuses_work() {
        assert!(WebSpawner.spawn_local(async {}).is_err());
    }
}
