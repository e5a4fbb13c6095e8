//! Predicate filtering over documents.
//!
//! All conditions must match (AND semantics). Type-mismatched comparisons
//! yield no-match rather than an error: a range operator on a non-numeric
//! pair, `like` on a non-string, or `in` with a non-array comparand simply
//! fail the condition. Callers depend on this leniency.

use serde_json::Value;

use crate::storage::Document;

use super::types::{QueryCondition, QueryOperator};

/// Whether a document matches every condition.
pub fn matches(document: &Document, conditions: &[QueryCondition]) -> bool {
    conditions
        .iter()
        .all(|condition| matches_condition(document, condition))
}

fn matches_condition(document: &Document, condition: &QueryCondition) -> bool {
    let field_value = document.field(&condition.field);

    match condition.operator {
        QueryOperator::Eq => field_value.as_ref() == Some(&condition.value),
        // an absent field is not equal to any comparand, so neq matches it
        QueryOperator::Neq => field_value.as_ref() != Some(&condition.value),
        QueryOperator::Gt => numeric(&field_value, &condition.value, |a, b| a > b),
        QueryOperator::Gte => numeric(&field_value, &condition.value, |a, b| a >= b),
        QueryOperator::Lt => numeric(&field_value, &condition.value, |a, b| a < b),
        QueryOperator::Lte => numeric(&field_value, &condition.value, |a, b| a <= b),
        QueryOperator::In => membership(&field_value, &condition.value),
        QueryOperator::Nin => match condition.value.as_array() {
            Some(_) => !membership(&field_value, &condition.value),
            None => false,
        },
        QueryOperator::Exists => {
            let wanted = condition.value.as_bool().unwrap_or(false);
            field_value.is_some() == wanted
        }
        QueryOperator::Like => match (&field_value, &condition.value) {
            (Some(Value::String(haystack)), Value::String(needle)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => false,
        },
    }
}

fn numeric(field_value: &Option<Value>, comparand: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
    match (
        field_value.as_ref().and_then(Value::as_f64),
        comparand.as_f64(),
    ) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn membership(field_value: &Option<Value>, comparand: &Value) -> bool {
    match (field_value, comparand.as_array()) {
        (Some(value), Some(candidates)) => candidates.contains(value),
        _ => false,
    }
}
