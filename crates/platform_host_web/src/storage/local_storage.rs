//! `localStorage`-backed durable store implementation.
//!
//! Writes are synchronous full-value replacements. Quota and security errors surface as `Err`
//! strings; callers log them and keep their in-memory value.

use platform_host::DurableStore;

#[derive(Debug, Clone, Copy, Default)]
/// Browser durable store backed by `window.localStorage`.
pub struct WebDurableStore;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_string())
}

impl DurableStore for WebDurableStore {
    fn is_available(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage().is_ok()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            false
        }
    }

    fn load_raw(&self, key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .get_item(key)
                .map_err(|e| format!("localStorage get_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn save_raw(&self, key: &str, raw_json: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .set_item(key, raw_json)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw_json);
            Ok(())
        }
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}
