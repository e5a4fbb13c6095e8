//! Change notification for table mutations.
//!
//! Subscribers are an ordered registry of callbacks per table, invoked
//! synchronously within the mutating call, in registration order, after the
//! persistence write succeeded. There is no deferred event queue. A callback
//! that mutates the same table during its own notification risks a reentrant
//! read-modify-write race; avoiding that is caller discipline. On a
//! multi-threaded runtime this direct invocation would have to become an
//! ordered channel drained on the subscriber's own execution context.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::Document;

/// Kind of mutation an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// New document inserted
    Create,
    /// Existing document patched
    Update,
    /// Document removed
    Delete,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Create => write!(f, "create"),
            EventType::Update => write!(f, "update"),
            EventType::Delete => write!(f, "delete"),
        }
    }
}

/// Notification describing one mutation on one table.
#[derive(Debug, Clone)]
pub struct StorageEvent {
    /// Mutation kind
    pub event_type: EventType,
    /// Table the mutation happened on
    pub table: String,
    /// The inserted, merged, or removed document
    pub document: Document,
}

impl StorageEvent {
    /// Event for a fresh insert.
    pub fn create(table: impl Into<String>, document: Document) -> Self {
        Self {
            event_type: EventType::Create,
            table: table.into(),
            document,
        }
    }

    /// Event carrying the merged document of an update.
    pub fn update(table: impl Into<String>, document: Document) -> Self {
        Self {
            event_type: EventType::Update,
            table: table.into(),
            document,
        }
    }

    /// Event carrying the removed document of a delete.
    pub fn delete(table: impl Into<String>, document: Document) -> Self {
        Self {
            event_type: EventType::Delete,
            table: table.into(),
            document,
        }
    }
}

/// Handle identifying one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

pub(crate) type Subscriber = Rc<dyn Fn(&StorageEvent)>;

/// Ordered per-table registry of subscriber callbacks.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    by_table: HashMap<String, Vec<(SubscriptionId, Subscriber)>>,
}

impl SubscriberRegistry {
    pub(crate) fn register(&mut self, table: &str, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId::fresh();
        self.by_table
            .entry(table.to_string())
            .or_default()
            .push((id, subscriber));
        id
    }

    /// Removes a subscriber. Unknown ids are a no-op, so removal is
    /// idempotent.
    pub(crate) fn remove(&mut self, id: SubscriptionId) {
        for subscribers in self.by_table.values_mut() {
            subscribers.retain(|(sid, _)| *sid != id);
        }
    }

    /// Clones out the current subscriber list for one table, in
    /// registration order. The snapshot lets the engine release its borrow
    /// of the registry before any callback runs.
    pub(crate) fn snapshot(&self, table: &str) -> Vec<Subscriber> {
        self.by_table
            .get(table)
            .map(|subscribers| subscribers.iter().map(|(_, s)| Rc::clone(s)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::cell::RefCell;

    fn sample_document() -> Document {
        Document::new("doc-1".into(), 0, Map::new())
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(EventType::Create.to_string(), "create");
        assert_eq!(EventType::Update.to_string(), "update");
        assert_eq!(EventType::Delete.to_string(), "delete");
    }

    #[test]
    fn test_registry_scopes_by_table() {
        let mut registry = SubscriberRegistry::default();
        registry.register("subscriptions", Rc::new(|_| {}));

        assert_eq!(registry.snapshot("subscriptions").len(), 1);
        assert!(registry.snapshot("currencies").is_empty());
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut registry = SubscriberRegistry::default();

        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            registry.register(
                "subscriptions",
                Rc::new(move |_| order.borrow_mut().push(tag)),
            );
        }

        let event = StorageEvent::create("subscriptions", sample_document());
        for subscriber in registry.snapshot("subscriptions") {
            subscriber(&event);
        }
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = SubscriberRegistry::default();
        let id = registry.register("subscriptions", Rc::new(|_| {}));

        registry.remove(id);
        assert!(registry.snapshot("subscriptions").is_empty());
        // second removal is a no-op
        registry.remove(id);
    }
}
