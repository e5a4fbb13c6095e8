//! subradb - embedded document store for the Subra subscription tracker
//!
//! A schema-validated document store over a flat key-value medium:
//! typed tables, linear-scan queries, synchronous change notification.

pub mod database;
pub mod observability;
pub mod query;
pub mod schema;
pub mod storage;
pub mod tracker;
