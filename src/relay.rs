//! Progression events and the publish/subscribe relay that carries them.
//!
//! The relay is an explicit object handed to both the publisher (the
//! progression engine) and its listeners. It keeps no queue and no history:
//! an event published while nobody listens for its tag is dropped.
//!
//! Two rules are left to callers:
//! - unsubscribe on teardown, or the handler keeps being invoked;
//! - a handler must not synchronously publish the tag it is handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Something worth celebrating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressionEvent {
    LevelUp { new_level: u32 },
    NewBadge { badge: String },
}

impl ProgressionEvent {
    pub fn tag(&self) -> EventTag {
        match self {
            ProgressionEvent::LevelUp { .. } => EventTag::LevelUp,
            ProgressionEvent::NewBadge { .. } => EventTag::NewBadge,
        }
    }
}

/// Discriminant of [`ProgressionEvent`], used to route subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    LevelUp,
    NewBadge,
}

impl EventTag {
    pub const ALL: [EventTag; 2] = [EventTag::LevelUp, EventTag::NewBadge];
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTag::LevelUp => f.write_str("level_up"),
            EventTag::NewBadge => f.write_str("new_badge"),
        }
    }
}

/// A registered handler. Returning an error marks the delivery as failed
/// without affecting other handlers.
pub type Handler = Arc<dyn Fn(&ProgressionEvent) -> anyhow::Result<()> + Send + Sync>;

/// Handle returned by [`NotificationRelay::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    tag: EventTag,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Synchronous, in-order, failure-isolating event relay.
#[derive(Default)]
pub struct NotificationRelay {
    registry: Mutex<Registry>,
}

impl NotificationRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, tag: EventTag, handler: F) -> SubscriptionId
    where
        F: Fn(&ProgressionEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscriptions.push(Subscription {
            id,
            tag,
            handler: Arc::new(handler),
        });
        debug!("Subscribed {:?} to {}", id, tag);
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered for `tag`.
    pub fn unsubscribe(&self, tag: EventTag, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let before = registry.subscriptions.len();
        registry
            .subscriptions
            .retain(|sub| !(sub.id == id && sub.tag == tag));
        before != registry.subscriptions.len()
    }

    pub fn subscriber_count(&self, tag: EventTag) -> usize {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.subscriptions.iter().filter(|sub| sub.tag == tag).count()
    }

    /// Deliver `event` to every handler registered for its tag, in
    /// registration order. Returns the number of handlers invoked.
    pub fn publish(&self, event: &ProgressionEvent) -> usize {
        let tag = event.tag();

        // Handlers run without the lock held so they may (un)subscribe.
        let handlers: Vec<(SubscriptionId, Handler)> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry
                .subscriptions
                .iter()
                .filter(|sub| sub.tag == tag)
                .map(|sub| (sub.id, Arc::clone(&sub.handler)))
                .collect()
        };

        if handlers.is_empty() {
            debug!("No subscribers for {}, dropping event", tag);
            return 0;
        }

        for (id, handler) in &handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Subscriber {:?} failed handling {}: {}", id, tag, e),
                Err(_) => warn!("Subscriber {:?} panicked handling {}", id, tag),
            }
        }

        handlers.len()
    }
}

impl fmt::Debug for NotificationRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationRelay")
            .field("level_up", &self.subscriber_count(EventTag::LevelUp))
            .field("new_badge", &self.subscriber_count(EventTag::NewBadge))
            .finish()
    }
}
