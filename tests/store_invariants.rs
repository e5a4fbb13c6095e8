//! Storage invariant tests:
//! - ids are unique among live documents
//! - insert/getById round-trips modulo schema defaults
//! - update patches exactly the patch fields and strictly bumps updatedAt
//! - delete removes, and unknown ids fail with the not-found error
//! - an absent table key and a corrupted table value are distinct cases
//! - a failed persist leaves the stored list untouched

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use subradb::database::{Database, DatabaseError, DatabaseOptions};
use subradb::schema::{DatabaseSchema, FieldDef, FieldType, TableSchema};
use subradb::storage::{KvMedium, MemoryMedium, StorageErrorKind};

// =============================================================================
// Helpers
// =============================================================================

fn schema() -> DatabaseSchema {
    DatabaseSchema::new().table(
        "subscriptions",
        TableSchema::new()
            .field("name", FieldDef::required(FieldType::String))
            .field("amount", FieldDef::required(FieldType::Number))
            .field(
                "currency",
                FieldDef::required(FieldType::String).with_default(json!("USD")),
            ),
    )
}

fn open_db() -> Database {
    open_with(Box::new(MemoryMedium::new()))
}

fn open_with(medium: Box<dyn KvMedium>) -> Database {
    Database::open(schema(), DatabaseOptions::with_prefix("test_"), medium).unwrap()
}

fn payload(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

fn subscription(name: &str, amount: f64) -> Map<String, Value> {
    payload(json!({ "name": name, "amount": amount }))
}

// =============================================================================
// Id uniqueness
// =============================================================================

/// Every insert gets an id distinct from all live documents.
#[test]
fn test_inserted_ids_are_unique() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();

    let mut seen = HashSet::new();
    for i in 0..50 {
        let doc = table.insert(subscription("sub", f64::from(i))).unwrap();
        assert!(seen.insert(doc.id.clone()), "duplicate id {}", doc.id);
    }
}

// =============================================================================
// Round-trip law
// =============================================================================

/// insert followed by getById returns the input modulo schema defaults.
#[test]
fn test_insert_get_by_id_roundtrip() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();

    let doc = table.insert(subscription("Netflix", 15.99)).unwrap();
    let fetched = table.get_by_id(&doc.id).unwrap().unwrap();

    assert_eq!(fetched, doc);
    assert_eq!(fetched.field("name"), Some(json!("Netflix")));
    assert_eq!(fetched.field("amount"), Some(json!(15.99)));
    // the defaulted field is part of the stored document
    assert_eq!(fetched.field("currency"), Some(json!("USD")));
    assert!(fetched.created_at <= fetched.updated_at);
}

// =============================================================================
// Update semantics
// =============================================================================

/// Patch fields change, everything else is untouched, updatedAt strictly
/// grows.
#[test]
fn test_update_patches_and_bumps_updated_at() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();

    let before = table.insert(subscription("Netflix", 15.99)).unwrap();
    let after = table
        .update(&before.id, payload(json!({ "amount": 17.99 })))
        .unwrap();

    assert_eq!(after.field("amount"), Some(json!(17.99)));
    assert_eq!(after.field("name"), before.field("name"));
    assert_eq!(after.field("currency"), before.field("currency"));
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);

    let fetched = table.get_by_id(&before.id).unwrap().unwrap();
    assert_eq!(fetched, after);
}

/// Back-to-back updates in the same millisecond still strictly grow
/// updatedAt.
#[test]
fn test_rapid_updates_keep_updated_at_strictly_increasing() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();
    let doc = table.insert(subscription("Netflix", 1.0)).unwrap();

    let mut last = doc.updated_at;
    for i in 0..20 {
        let merged = table
            .update(&doc.id, payload(json!({ "amount": f64::from(i) })))
            .unwrap();
        assert!(merged.updated_at > last);
        last = merged.updated_at;
    }
}

/// Updating an unknown id fails with the distinguished not-found error.
#[test]
fn test_update_unknown_id_not_found() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();
    let err = table.update("missing", Map::new()).unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Delete semantics
// =============================================================================

#[test]
fn test_delete_then_get_by_id_is_absent() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();

    let doc = table.insert(subscription("Netflix", 15.99)).unwrap();
    let other = table.insert(subscription("Spotify", 9.99)).unwrap();

    table.delete(&doc.id).unwrap();
    assert_eq!(table.get_by_id(&doc.id).unwrap(), None);
    // the other document survives
    assert!(table.get_by_id(&other.id).unwrap().is_some());

    let err = table.delete(&doc.id).unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// First-use state vs corruption
// =============================================================================

/// An absent key reads as the empty table; garbage under the key does not.
#[test]
fn test_absent_and_corrupted_tables_are_distinct() {
    let mut medium = MemoryMedium::new();
    medium.set("test_subscriptions", "{definitely not json").unwrap();
    // opening initializes only absent keys, the garbage survives
    let db = open_with(Box::new(medium));
    let table = db.table("subscriptions").unwrap();

    let err = table.get_all().unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::Corruption);

    // a fresh database by contrast reads empty
    let db = open_db();
    assert_eq!(db.table("subscriptions").unwrap().get_all().unwrap(), vec![]);
}

/// A decodable list whose members are not documents is also corruption.
#[test]
fn test_list_of_non_documents_is_corruption() {
    let mut medium = MemoryMedium::new();
    medium.set("test_subscriptions", "[{\"name\":\"no id\"}]").unwrap();
    let db = open_with(Box::new(medium));

    let err = db.table("subscriptions").unwrap().get_all().unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::Corruption);
}

// =============================================================================
// Failure atomicity
// =============================================================================

/// A mutation whose persist fails leaves the stored list exactly as it was.
#[test]
fn test_failed_mutation_leaves_table_unchanged() {
    let db = open_with(Box::new(MemoryMedium::with_capacity(220)));
    let table = db.table("subscriptions").unwrap();

    let doc = table.insert(subscription("Netflix", 15.99)).unwrap();

    let err = table
        .update(&doc.id, payload(json!({ "name": "x".repeat(300) })))
        .unwrap_err();
    match err {
        DatabaseError::Storage(e) => {
            assert_eq!(e.kind(), StorageErrorKind::CapacityExceeded)
        }
        other => panic!("expected a storage error, got {}", other),
    }

    let fetched = table.get_by_id(&doc.id).unwrap().unwrap();
    assert_eq!(fetched, doc);
}

// =============================================================================
// Validation gate
// =============================================================================

/// A payload missing a required field with no default never reaches the
/// medium.
#[test]
fn test_invalid_insert_is_rejected_before_persisting() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();

    let err = table.insert(payload(json!({ "amount": 1.0 }))).unwrap_err();
    assert!(matches!(err, DatabaseError::Validation(_)));
    assert!(table.get_all().unwrap().is_empty());
}
