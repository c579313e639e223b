//! Observable feature-state cells with an optional durable persistence binding.
//!
//! An [`Atom`] holds one feature value. Every write computes the next value, compares it
//! JSON-structurally with the current one, and when it changed commits it to memory, mirrors it
//! to the durable store, and only then notifies subscribers. Storage failures are logged and leave
//! the in-memory value as the source of truth.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use leptos::logging;
use platform_host::{load_json_with, save_json_with, DurableStore};
use serde::{de::DeserializeOwned, Serialize};

type Listener<T> = Rc<dyn Fn(&T)>;

struct PersistenceBinding {
    store: Rc<dyn DurableStore>,
    key: &'static str,
}

struct AtomInner<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_listener_id: Cell<u64>,
    version: Cell<u64>,
    persistence: Option<PersistenceBinding>,
}

/// Shared observable cell for one feature's state.
pub struct Atom<T> {
    inner: Rc<AtomInner<T>>,
}

impl<T> Clone for Atom<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Atom<T>
where
    T: Clone + Serialize + 'static,
{
    /// Creates an in-memory atom.
    pub fn new(value: T) -> Self {
        Self::with_binding(value, None)
    }

    /// Creates an atom mirrored to `key` in `store`.
    ///
    /// A stored value is passed through `merge` before use so callers can force fields that must
    /// never survive a reload. Missing, corrupt, or unavailable storage falls back to `default`.
    pub fn persisted(
        store: Rc<dyn DurableStore>,
        key: &'static str,
        default: T,
        merge: impl FnOnce(T) -> T,
    ) -> Self
    where
        T: DeserializeOwned,
    {
        let initial = match load_json_with::<_, T>(store.as_ref(), key) {
            Ok(Some(stored)) => merge(stored),
            Ok(None) => default,
            Err(err) => {
                logging::warn!("load `{key}` failed, using defaults: {err}");
                default
            }
        };
        Self::with_binding(initial, Some(PersistenceBinding { store, key }))
    }

    fn with_binding(value: T, persistence: Option<PersistenceBinding>) -> Self {
        Self {
            inner: Rc::new(AtomInner {
                value: RefCell::new(value),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(1),
                version: Cell::new(0),
                persistence,
            }),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Writes a direct value. Returns whether the value changed.
    pub fn set(&self, next: T) -> bool {
        self.commit(next)
    }

    /// Writes the value computed by `f` from the previous value. Returns whether it changed.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let next = f(&self.inner.value.borrow());
        self.commit(next)
    }

    fn commit(&self, next: T) -> bool {
        {
            let current = self.inner.value.borrow();
            if structurally_equal(&*current, &next) {
                return false;
            }
        }
        *self.inner.value.borrow_mut() = next;
        let version = self.inner.version.get().wrapping_add(1);
        self.inner.version.set(version);

        if let Some(binding) = &self.inner.persistence {
            let saved = save_json_with(
                binding.store.as_ref(),
                binding.key,
                &*self.inner.value.borrow(),
            );
            if let Err(err) = saved {
                logging::warn!("persist `{}` failed: {err}", binding.key);
            }
        }

        self.notify(version);
        true
    }

    fn notify(&self, version: u64) {
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        let snapshot = self.get();
        for listener in listeners {
            // A nested write already delivered a newer value to every listener.
            if self.inner.version.get() != version {
                return;
            }
            listener(&snapshot);
        }
    }

    /// Subscribes to every committed change. Dropping the returned handle unsubscribes.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        let listener: Listener<T> = Rc::new(listener);
        self.inner.listeners.borrow_mut().push((id, listener));

        let weak: Weak<AtomInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Subscribes to one slice of the value; `listener` runs only when the slice changes.
    pub fn select<S>(
        &self,
        selector: impl Fn(&T) -> S + 'static,
        listener: impl Fn(&S) + 'static,
    ) -> Subscription
    where
        S: PartialEq + Clone + 'static,
    {
        let last = RefCell::new(self.with(|value| selector(value)));
        self.subscribe(move |value| {
            let next = selector(value);
            {
                let mut last = last.borrow_mut();
                if *last == next {
                    return;
                }
                *last = next.clone();
            }
            listener(&next);
        })
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

fn structurally_equal<T: Serialize>(current: &T, next: &T) -> bool {
    match (serde_json::to_value(current), serde_json::to_value(next)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Drop-based subscription handle.
pub struct Subscription {
    unsubscribe: Rc<dyn Fn()>,
    active: Cell<bool>,
}

impl Subscription {
    /// Creates a handle from an unsubscribe callback.
    pub fn new(unsubscribe: impl Fn() + 'static) -> Self {
        Self {
            unsubscribe: Rc::new(unsubscribe),
            active: Cell::new(true),
        }
    }

    /// Unsubscribes if still active.
    pub fn unsubscribe(&self) {
        if self.active.replace(false) {
            (self.unsubscribe)();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use platform_host::MemoryDurableStore;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Counter {
        count: u32,
        label: String,
    }

    #[test]
    fn unchanged_writes_do_not_notify_or_persist() {
        let store = MemoryDurableStore::default();
        let atom = Atom::persisted(Rc::new(store.clone()), "counter", Counter::default(), |c| c);
        let hits = Rc::new(Cell::new(0));
        let _sub = atom.subscribe({
            let hits = hits.clone();
            move |_| hits.set(hits.get() + 1)
        });

        assert!(!atom.set(Counter::default()));
        assert_eq!(hits.get(), 0);
        assert_eq!(store.raw("counter"), None);

        assert!(atom.update(|c| Counter {
            count: c.count + 1,
            ..c.clone()
        }));
        assert_eq!(hits.get(), 1);
        assert_eq!(store.raw("counter").as_deref(), Some(r#"{"count":1,"label":""}"#));
    }

    #[test]
    fn store_is_written_before_listeners_run() {
        let store = MemoryDurableStore::default();
        let atom = Atom::persisted(Rc::new(store.clone()), "counter", Counter::default(), |c| c);
        let seen_in_store = Rc::new(RefCell::new(None));
        let _sub = atom.subscribe({
            let store = store.clone();
            let seen = seen_in_store.clone();
            move |_| *seen.borrow_mut() = store.raw("counter")
        });

        atom.update(|c| Counter {
            count: 7,
            ..c.clone()
        });
        assert_eq!(
            seen_in_store.borrow().as_deref(),
            Some(r#"{"count":7,"label":""}"#)
        );
    }

    #[test]
    fn failed_save_keeps_memory_value() {
        let store = MemoryDurableStore::with_quota(4);
        let atom = Atom::persisted(Rc::new(store.clone()), "counter", Counter::default(), |c| c);
        atom.update(|c| Counter {
            count: 3,
            ..c.clone()
        });
        assert_eq!(atom.get().count, 3);
        assert_eq!(store.raw("counter"), None);
    }

    #[test]
    fn persisted_constructor_merges_and_survives_corrupt_data() {
        let store = MemoryDurableStore::default();
        store
            .save_raw("counter", r#"{"count":9,"label":"x"}"#)
            .expect("seed");
        let atom = Atom::persisted(Rc::new(store.clone()), "counter", Counter::default(), |c| {
            Counter { count: 0, ..c }
        });
        assert_eq!(
            atom.get(),
            Counter {
                count: 0,
                label: "x".to_string()
            }
        );

        store.save_raw("counter", "{oops").expect("seed corrupt");
        let atom = Atom::persisted(Rc::new(store), "counter", Counter::default(), |c| c);
        assert_eq!(atom.get(), Counter::default());
    }

    #[test]
    fn select_fires_only_for_slice_changes_and_drop_unsubscribes() {
        let atom = Atom::new(Counter::default());
        let labels = Rc::new(RefCell::new(Vec::new()));
        let sub = atom.select(|c| c.label.clone(), {
            let labels = labels.clone();
            move |label: &String| labels.borrow_mut().push(label.clone())
        });

        atom.update(|c| Counter {
            count: 1,
            ..c.clone()
        });
        atom.update(|c| Counter {
            label: "a".to_string(),
            ..c.clone()
        });
        assert_eq!(*labels.borrow(), vec!["a".to_string()]);

        drop(sub);
        assert_eq!(atom.subscriber_count(), 0);
        atom.update(|c| Counter {
            label: "b".to_string(),
            ..c.clone()
        });
        assert_eq!(labels.borrow().len(), 1);
    }

    #[test]
    fn nested_write_from_listener_delivers_latest_value_last() {
        let atom = Atom::new(Counter::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _clamp = atom.subscribe({
            let atom = atom.clone();
            move |c: &Counter| {
                if c.count > 10 {
                    atom.update(|c| Counter {
                        count: 10,
                        ..c.clone()
                    });
                }
            }
        });
        let _record = atom.subscribe({
            let seen = seen.clone();
            move |c: &Counter| seen.borrow_mut().push(c.count)
        });

        atom.update(|c| Counter {
            count: 42,
            ..c.clone()
        });
        assert_eq!(atom.get().count, 10);
        assert_eq!(*seen.borrow(), vec![10]);
    }
}
