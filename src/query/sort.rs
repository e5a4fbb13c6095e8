//! Stable multi-key sorting of query results.
//!
//! Sort keys apply in the given order as successive tie-breakers, each
//! ascending or descending, using natural value ordering. Missing fields
//! and cross-type pairs are treated as equal at that key, never an error,
//! so ties fall back to the original insertion order (the sort is stable).

use std::cmp::Ordering;

use serde_json::Value;

use crate::storage::Document;

use super::types::{SortOrder, SortSpec};

/// Sorts documents in place according to the sort keys.
pub fn sort_documents(documents: &mut [Document], specs: &[SortSpec]) {
    if specs.is_empty() {
        return;
    }
    documents.sort_by(|a, b| {
        for spec in specs {
            let ordering = compare_values(a.field(&spec.field), b.field(&spec.field));
            let ordering = match spec.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Natural ordering within one type; anything else compares equal.
fn compare_values(a: Option<Value>, b: Option<Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(&b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}
