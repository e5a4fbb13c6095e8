//! The storage engine: durable CRUD over per-table document lists.
//!
//! Each table is one ordered `Vec<Document>` serialized as a single JSON
//! array under `<prefix><table>` in the key-value medium. Every mutation
//! reads the full list, rewrites it, persists it in one `set`, and only
//! then notifies subscribers; a failed persist emits nothing and leaves the
//! stored list exactly as it was.
//!
//! The engine is single-context: no locking, no conflict detection. Two
//! callers sharing one medium race their read-modify-write cycles and the
//! last write wins. Re-evaluate before letting multiple execution contexts
//! at the same backing store.

use std::cell::RefCell;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::observability::{Logger, Severity};
use crate::query::{filter, sort, Query};

use super::document::{strip_reserved, Document};
use super::errors::{StorageError, StorageResult};
use super::events::{StorageEvent, SubscriberRegistry, SubscriptionId};
use super::medium::KvMedium;

/// Durable CRUD, query execution, and change notification over a flat
/// key-value medium.
pub struct StorageEngine {
    medium: RefCell<Box<dyn KvMedium>>,
    prefix: String,
    subscribers: RefCell<SubscriberRegistry>,
}

impl StorageEngine {
    /// Creates an engine over `medium`, namespacing every table key with
    /// `prefix`.
    pub fn new(prefix: impl Into<String>, medium: Box<dyn KvMedium>) -> Self {
        Self {
            medium: RefCell::new(medium),
            prefix: prefix.into(),
            subscribers: RefCell::new(SubscriberRegistry::default()),
        }
    }

    fn table_key(&self, table: &str) -> String {
        format!("{}{}", self.prefix, table)
    }

    /// Writes an empty list under the table's key if the key is absent.
    pub fn initialize_table(&self, table: &str) -> StorageResult<()> {
        let key = self.table_key(table);
        let mut medium = self.medium.borrow_mut();
        if medium.get(&key)?.is_none() {
            medium.set(&key, "[]")?;
            Logger::log(Severity::Info, "table_initialized", &[("table", table)]);
        }
        Ok(())
    }

    /// Decodes and returns the full document list of a table.
    ///
    /// An absent key is the first-use state and yields an empty list. A
    /// value that is present but undecodable is corruption and fails; the
    /// two cases are never conflated.
    pub fn get_all(&self, table: &str) -> StorageResult<Vec<Document>> {
        let raw = self.medium.borrow().get(&self.table_key(table))?;
        match raw {
            None => Ok(Vec::new()),
            Some(encoded) => serde_json::from_str(&encoded).map_err(|e| {
                Logger::log_stderr(
                    Severity::Error,
                    "table_corrupted",
                    &[("table", table), ("reason", &e.to_string())],
                );
                StorageError::corrupted_table(table, e.to_string())
            }),
        }
    }

    /// Linear scan for a document by id; `None` when absent.
    pub fn get_by_id(&self, table: &str, id: &str) -> StorageResult<Option<Document>> {
        Ok(self.get_all(table)?.into_iter().find(|doc| doc.id == id))
    }

    /// Runs the query pipeline: filter, then stable multi-key sort, then
    /// skip, then limit, in exactly that order.
    pub fn query(&self, table: &str, query: &Query) -> StorageResult<Vec<Document>> {
        let mut documents = self.get_all(table)?;

        documents.retain(|doc| filter::matches(doc, &query.conditions));
        sort::sort_documents(&mut documents, &query.sort);

        let mut documents: Vec<Document> = match query.skip {
            Some(skip) => documents.into_iter().skip(skip).collect(),
            None => documents,
        };
        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }

        Ok(documents)
    }

    /// Appends a fresh document assembled from `payload` and persists the
    /// table. The id is a new UUID and both timestamps are the current
    /// time; reserved keys in the payload are discarded. The 'create' event
    /// fires only after the persistence write succeeded.
    pub fn insert(&self, table: &str, payload: Map<String, Value>) -> StorageResult<Document> {
        let mut fields = payload;
        strip_reserved(&mut fields);

        let document = Document::new(Uuid::new_v4().to_string(), now_millis(), fields);

        let mut documents = self.get_all(table)?;
        documents.push(document.clone());
        self.persist(table, &documents)?;

        self.notify(StorageEvent::create(table, document.clone()));
        Ok(document)
    }

    /// Shallow-merges `patch` onto the document with `id`, bumps
    /// `updated_at`, persists, and emits 'update' with the merged document.
    /// Fails with the not-found error when the id is absent.
    pub fn update(
        &self,
        table: &str,
        id: &str,
        patch: &Map<String, Value>,
    ) -> StorageResult<Document> {
        let mut documents = self.get_all(table)?;
        let position = documents
            .iter()
            .position(|doc| doc.id == id)
            .ok_or_else(|| StorageError::not_found(table, id))?;

        let doc = &mut documents[position];
        for (key, value) in patch {
            if !is_reserved(key) {
                doc.fields.insert(key.clone(), value.clone());
            }
        }
        // strictly increasing even when the clock has not advanced a full
        // millisecond since the last write
        doc.updated_at = now_millis().max(doc.updated_at + 1);

        let merged = doc.clone();
        self.persist(table, &documents)?;

        self.notify(StorageEvent::update(table, merged.clone()));
        Ok(merged)
    }

    /// Removes the document with `id`, persists, and emits 'delete' with
    /// the removed document. Fails with the not-found error when the id is
    /// absent.
    pub fn delete(&self, table: &str, id: &str) -> StorageResult<Document> {
        let mut documents = self.get_all(table)?;
        let position = documents
            .iter()
            .position(|doc| doc.id == id)
            .ok_or_else(|| StorageError::not_found(table, id))?;

        let removed = documents.remove(position);
        self.persist(table, &documents)?;

        self.notify(StorageEvent::delete(table, removed.clone()));
        Ok(removed)
    }

    /// Replaces the table's list with the empty list. No per-document
    /// events are emitted.
    pub fn clear(&self, table: &str) -> StorageResult<()> {
        self.persist(table, &[])
    }

    /// Registers a callback for every mutation on `table`, invoked
    /// synchronously in registration order.
    pub fn subscribe(
        &self,
        table: &str,
        subscriber: impl Fn(&StorageEvent) + 'static,
    ) -> SubscriptionId {
        self.subscribers
            .borrow_mut()
            .register(table, std::rc::Rc::new(subscriber))
    }

    /// Removes a subscriber; unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().remove(id);
    }

    fn persist(&self, table: &str, documents: &[Document]) -> StorageResult<()> {
        let encoded = serde_json::to_string(documents).map_err(|e| {
            StorageError::write_failed_no_source(format!(
                "failed to encode table '{}': {}",
                table, e
            ))
        })?;
        self.medium
            .borrow_mut()
            .set(&self.table_key(table), &encoded)
    }

    /// Delivers an event to the table's subscribers. The registry borrow is
    /// released before any callback runs, so callbacks may call back into
    /// the engine; reentrant writes remain the caller's hazard.
    fn notify(&self, event: StorageEvent) {
        let snapshot = self.subscribers.borrow().snapshot(&event.table);
        for subscriber in snapshot {
            subscriber(&event);
        }
    }
}

fn is_reserved(key: &str) -> bool {
    super::document::RESERVED_FIELDS.contains(&key)
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
