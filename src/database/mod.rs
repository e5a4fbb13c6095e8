//! The database facade: one uniform typed handle per declared table.
//!
//! `Database::open` binds a validator and the storage engine for every
//! table the schema declares. All reads and writes from the surrounding
//! application go through `Table` handles; the facade applies defaults and
//! validation before delegating to the engine.

pub mod errors;

use serde_json::{Map, Value};

use crate::query::Query;
use crate::schema::{DatabaseSchema, TableSchema, Validator};
use crate::storage::{
    Document, KvMedium, StorageEngine, StorageEvent, StorageResult, SubscriptionId,
};

use std::collections::HashMap;

pub use self::errors::{DatabaseError, DatabaseResult};

/// Facade construction options.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// Namespace prepended to every table key in the medium
    pub prefix: String,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            prefix: "db_".into(),
        }
    }
}

impl DatabaseOptions {
    /// Options with the given namespace prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

/// A schema-bound database over one persistence medium.
pub struct Database {
    engine: StorageEngine,
    validators: HashMap<String, Validator>,
}

impl Database {
    /// Opens the database: builds one validator per declared table and
    /// initializes every table key in the medium.
    pub fn open(
        schema: DatabaseSchema,
        options: DatabaseOptions,
        medium: Box<dyn KvMedium>,
    ) -> DatabaseResult<Self> {
        let engine = StorageEngine::new(options.prefix, medium);

        let mut validators = HashMap::new();
        for (name, table_schema) in schema.iter() {
            validators.insert(name.clone(), Validator::new(table_schema.clone()));
        }

        for name in validators.keys() {
            engine.initialize_table(name)?;
        }

        Ok(Self { engine, validators })
    }

    /// Returns the handle for a declared table. An undeclared name is a
    /// configuration error, never a runtime data error.
    pub fn table(&self, name: &str) -> DatabaseResult<Table<'_>> {
        let (name, validator) = self
            .validators
            .get_key_value(name)
            .ok_or_else(|| DatabaseError::UnknownTable(name.to_string()))?;
        Ok(Table {
            name: name.as_str(),
            engine: &self.engine,
            validator,
        })
    }

    /// Returns the declared schema of a table, if any.
    pub fn schema_of(&self, name: &str) -> Option<&TableSchema> {
        self.validators.get(name).map(Validator::schema)
    }

    /// Clears every declared table. No per-document events are emitted.
    pub fn clear_all(&self) -> DatabaseResult<()> {
        for name in self.validators.keys() {
            self.engine.clear(name)?;
        }
        Ok(())
    }
}

/// Uniform typed handle for one table.
///
/// This is the only sanctioned access path for the surrounding application.
pub struct Table<'a> {
    name: &'a str,
    engine: &'a StorageEngine,
    validator: &'a Validator,
}

impl std::fmt::Debug for Table<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").field("name", &self.name).finish()
    }
}

impl Table<'_> {
    /// The table's name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Full document list in insertion order.
    pub fn get_all(&self) -> StorageResult<Vec<Document>> {
        self.engine.get_all(self.name)
    }

    /// Document by id; `None` when absent.
    pub fn get_by_id(&self, id: &str) -> StorageResult<Option<Document>> {
        self.engine.get_by_id(self.name, id)
    }

    /// Filtered, sorted, paged document list.
    pub fn query(&self, query: &Query) -> StorageResult<Vec<Document>> {
        self.engine.query(self.name, query)
    }

    /// Applies schema defaults, validates, and inserts. Returns the stored
    /// document with its engine-assigned id and timestamps.
    pub fn insert(&self, payload: Map<String, Value>) -> DatabaseResult<Document> {
        let defaulted = self.validator.apply_defaults(&payload);
        self.validator.validate(&defaulted)?;
        Ok(self.engine.insert(self.name, defaulted)?)
    }

    /// Validates the raw patch (partial-update semantics) and merges it
    /// onto the stored document. Returns the merged document.
    pub fn update(&self, id: &str, patch: Map<String, Value>) -> DatabaseResult<Document> {
        self.validator.validate_patch(&patch)?;
        Ok(self.engine.update(self.name, id, &patch)?)
    }

    /// Removes a document; returns it. Fails with the not-found error when
    /// the id is absent.
    pub fn delete(&self, id: &str) -> DatabaseResult<Document> {
        Ok(self.engine.delete(self.name, id)?)
    }

    /// Replaces the table with the empty list; emits no events.
    pub fn clear(&self) -> StorageResult<()> {
        self.engine.clear(self.name)
    }

    /// Registers a change subscriber scoped to this table.
    pub fn subscribe(&self, subscriber: impl Fn(&StorageEvent) + 'static) -> SubscriptionId {
        self.engine.subscribe(self.name, subscriber)
    }

    /// Removes a subscriber; unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.engine.unsubscribe(id);
    }
}
