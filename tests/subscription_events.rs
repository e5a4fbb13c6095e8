//! Change-notification tests: one synchronous event per mutation, scoped to
//! the subscribed table, delivered in registration order; unsubscribe is
//! idempotent; clear and failed mutations emit nothing.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Map, Value};

use subradb::database::{Database, DatabaseOptions};
use subradb::schema::{DatabaseSchema, FieldDef, FieldType, TableSchema};
use subradb::storage::{EventType, MemoryMedium};

fn schema() -> DatabaseSchema {
    let subscription_table = TableSchema::new()
        .field("name", FieldDef::required(FieldType::String))
        .field("amount", FieldDef::optional(FieldType::Number));
    DatabaseSchema::new()
        .table("subscriptions", subscription_table)
        .table(
            "currencies",
            TableSchema::new().field("code", FieldDef::required(FieldType::String)),
        )
}

fn open_db() -> Database {
    Database::open(
        schema(),
        DatabaseOptions::with_prefix("test_"),
        Box::new(MemoryMedium::new()),
    )
    .unwrap()
}

fn payload(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

/// Collects (event type, document id) pairs.
fn recording() -> (
    Rc<RefCell<Vec<(EventType, String)>>>,
    impl Fn(&subradb::storage::StorageEvent) + 'static,
) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let callback = move |event: &subradb::storage::StorageEvent| {
        sink.borrow_mut()
            .push((event.event_type, event.document.id.clone()));
    };
    (log, callback)
}

#[test]
fn test_one_event_per_mutation() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();
    let (log, callback) = recording();
    table.subscribe(callback);

    let doc = table.insert(payload(json!({ "name": "Netflix" }))).unwrap();
    table
        .update(&doc.id, payload(json!({ "amount": 15.99 })))
        .unwrap();
    table.delete(&doc.id).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            (EventType::Create, doc.id.clone()),
            (EventType::Update, doc.id.clone()),
            (EventType::Delete, doc.id.clone()),
        ]
    );
}

#[test]
fn test_events_are_scoped_to_the_table() {
    let db = open_db();
    let subscriptions = db.table("subscriptions").unwrap();
    let currencies = db.table("currencies").unwrap();

    let (log, callback) = recording();
    subscriptions.subscribe(callback);

    currencies
        .insert(payload(json!({ "code": "USD" })))
        .unwrap();
    assert!(log.borrow().is_empty());

    subscriptions
        .insert(payload(json!({ "name": "Netflix" })))
        .unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_subscribers_run_in_registration_order() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();

    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = Rc::clone(&order);
        table.subscribe(move |_| order.borrow_mut().push(tag));
    }

    table.insert(payload(json!({ "name": "Netflix" }))).unwrap();
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_unsubscribe_stops_delivery_and_is_idempotent() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();
    let (log, callback) = recording();
    let id = table.subscribe(callback);

    table.insert(payload(json!({ "name": "Netflix" }))).unwrap();
    assert_eq!(log.borrow().len(), 1);

    table.unsubscribe(id);
    table.insert(payload(json!({ "name": "Spotify" }))).unwrap();
    assert_eq!(log.borrow().len(), 1);

    // removing again is a no-op
    table.unsubscribe(id);
}

#[test]
fn test_events_carry_the_mutated_document() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        table.subscribe(move |event| seen.borrow_mut().push(event.document.clone()));
    }

    let doc = table.insert(payload(json!({ "name": "Netflix" }))).unwrap();
    let merged = table
        .update(&doc.id, payload(json!({ "amount": 15.99 })))
        .unwrap();
    table.delete(&doc.id).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen[0], doc);
    // update delivers the merged document, delete the removed one
    assert_eq!(seen[1], merged);
    assert_eq!(seen[2], merged);
}

#[test]
fn test_clear_emits_no_per_document_events() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();

    table.insert(payload(json!({ "name": "Netflix" }))).unwrap();
    table.insert(payload(json!({ "name": "Spotify" }))).unwrap();

    let (log, callback) = recording();
    table.subscribe(callback);

    table.clear().unwrap();
    assert!(table.get_all().unwrap().is_empty());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_rejected_insert_emits_nothing() {
    let db = open_db();
    let table = db.table("subscriptions").unwrap();
    let (log, callback) = recording();
    table.subscribe(callback);

    // missing required name
    assert!(table.insert(payload(json!({ "amount": 1.0 }))).is_err());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_subscriber_may_read_the_table_during_notification() {
    let db = Rc::new(open_db());
    let table = db.table("subscriptions").unwrap();

    let counts = Rc::new(RefCell::new(Vec::new()));
    {
        let db = Rc::clone(&db);
        let counts = Rc::clone(&counts);
        table.subscribe(move |_| {
            let len = db
                .table("subscriptions")
                .unwrap()
                .get_all()
                .unwrap()
                .len();
            counts.borrow_mut().push(len);
        });
    }

    let table = db.table("subscriptions").unwrap();
    table.insert(payload(json!({ "name": "Netflix" }))).unwrap();
    table.insert(payload(json!({ "name": "Spotify" }))).unwrap();

    // the write is persisted before the event fires
    assert_eq!(*counts.borrow(), vec![1, 2]);
}
