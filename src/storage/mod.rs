//! Storage module: durable CRUD over per-table document lists.
//!
//! Each table is one ordered list of documents, serialized as a single JSON
//! array under a namespaced key in a flat key-value medium. Every mutation
//! is a full read-modify-persist of that list.

pub mod document;
pub mod engine;
pub mod errors;
pub mod events;
pub mod medium;

pub use self::document::Document;
pub use self::engine::StorageEngine;
pub use self::errors::{StorageError, StorageErrorKind, StorageResult};
pub use self::events::{EventType, StorageEvent, SubscriptionId};
pub use self::medium::{FileMedium, KvMedium, MemoryMedium};
