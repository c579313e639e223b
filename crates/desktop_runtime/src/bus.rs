//! In-process topic broadcast between runtime managers and mounted app views.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
};

use serde_json::Value;

use crate::atoms::Subscription;

/// Asks the timer manager to reset. The manager publishes it with a `windowId` after a window close.
pub const TIMER_RESET_TOPIC: &str = "timer-reset";

type TopicListener = Rc<dyn Fn(&Value)>;

#[derive(Default)]
struct BusState {
    topic_subscribers: HashMap<String, Vec<(u64, TopicListener)>>,
    next_id: Cell<u64>,
}

#[derive(Clone, Default)]
/// Runtime-owned topic bus.
pub struct RuntimeBus {
    state: Rc<RefCell<BusState>>,
}

impl RuntimeBus {
    /// Subscribes to `topic`. Dropping the handle unsubscribes.
    pub fn subscribe(&self, topic: &str, listener: impl Fn(&Value) + 'static) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id.get() + 1;
            state.next_id.set(id);
            let listener: TopicListener = Rc::new(listener);
            state
                .topic_subscribers
                .entry(topic.to_string())
                .or_default()
                .push((id, listener));
            id
        };

        let weak: Weak<RefCell<BusState>> = Rc::downgrade(&self.state);
        let topic = topic.to_string();
        Subscription::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            if let Some(subscribers) = state.topic_subscribers.get_mut(&topic) {
                subscribers.retain(|(sid, _)| *sid != id);
                if subscribers.is_empty() {
                    state.topic_subscribers.remove(&topic);
                }
            }
        })
    }

    /// Delivers `payload` to every current subscriber of `topic`. Returns the delivery count.
    pub fn publish(&self, topic: &str, payload: Value) -> usize {
        let listeners: Vec<TopicListener> = self
            .state
            .borrow()
            .topic_subscribers
            .get(topic)
            .map(|subscribers| subscribers.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();
        for listener in &listeners {
            listener(&payload);
        }
        listeners.len()
    }

    /// Returns the number of subscribers for `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.state
            .borrow()
            .topic_subscribers
            .get(topic)
            .map_or(0, Vec::len)
    }
}
