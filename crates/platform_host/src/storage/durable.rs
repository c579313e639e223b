//! Synchronous durable key/value storage contracts and adapters.
//!
//! Values are full JSON documents stored as text per key. Writes replace the whole value; there
//! are no partial or delta writes.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};

/// Host service for durable JSON values keyed by string (browser `localStorage` equivalent).
pub trait DurableStore {
    /// Returns whether a persistence medium exists on the current target.
    fn is_available(&self) -> bool;

    /// Loads a raw JSON string for `key`.
    fn load_raw(&self, key: &str) -> Result<Option<String>, String>;

    /// Saves a raw JSON string for `key`, replacing any previous value.
    fn save_raw(&self, key: &str, raw_json: &str) -> Result<(), String>;

    /// Deletes `key`.
    fn remove(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store used when no persistence medium exists (non-browser targets, headless tests).
///
/// Loads always return `None` and writes succeed without effect.
pub struct NoopDurableStore;

impl DurableStore for NoopDurableStore {
    fn is_available(&self) -> bool {
        false
    }

    fn load_raw(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn save_raw(&self, _key: &str, _raw_json: &str) -> Result<(), String> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory durable store keyed by string, with an optional byte quota.
pub struct MemoryDurableStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryDurableStore {
    /// Creates a store that rejects writes once the stored payload would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            inner: Rc::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Returns the raw stored value for `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl DurableStore for MemoryDurableStore {
    fn is_available(&self) -> bool {
        true
    }

    fn load_raw(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn save_raw(&self, key: &str, raw_json: &str) -> Result<(), String> {
        if let Some(quota) = self.quota_bytes {
            let next = self.used_bytes_without(key) + key.len() + raw_json.len();
            if next > quota {
                return Err(format!(
                    "quota exceeded writing `{key}`: {next} bytes > {quota} bytes"
                ));
            }
        }
        self.inner
            .borrow_mut()
            .insert(key.to_string(), raw_json.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

/// Loads and deserializes a typed value through a [`DurableStore`] implementation.
///
/// # Errors
///
/// Returns an error when the store read or JSON deserialization fails.
pub fn load_json_with<S: DurableStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    if !store.is_available() {
        return Ok(None);
    }
    let Some(raw) = store.load_raw(key)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(Some(value))
}

/// Serializes and saves a typed value through a [`DurableStore`] implementation.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub fn save_json_with<S: DurableStore + ?Sized, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    if !store.is_available() {
        return Ok(());
    }
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save_raw(key, &raw)
}
