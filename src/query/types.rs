//! Query specification types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter operators. Range operators compare numbers only; a non-numeric
/// pair yields no-match rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOperator {
    /// Strict equality, no coercion
    Eq,
    /// Strict inequality
    Neq,
    /// Numeric greater-than
    Gt,
    /// Numeric greater-or-equal
    Gte,
    /// Numeric less-than
    Lt,
    /// Numeric less-or-equal
    Lte,
    /// Membership in the condition's array value
    In,
    /// Absence from the condition's array value
    Nin,
    /// Field presence, gated by the condition's boolean value
    Exists,
    /// Case-insensitive substring on string fields
    Like,
}

/// One field/operator/value predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    /// Field to test, reserved names included
    pub field: String,
    /// Filter operator
    pub operator: QueryOperator,
    /// Comparand
    pub value: Value,
}

impl QueryCondition {
    pub fn new(field: impl Into<String>, operator: QueryOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, QueryOperator::Eq, value)
    }

    pub fn neq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, QueryOperator::Neq, value)
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, QueryOperator::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, QueryOperator::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, QueryOperator::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, QueryOperator::Lte, value)
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, QueryOperator::In, Value::Array(values))
    }

    pub fn nin(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, QueryOperator::Nin, Value::Array(values))
    }

    pub fn exists(field: impl Into<String>, present: bool) -> Self {
        Self::new(field, QueryOperator::Exists, Value::Bool(present))
    }

    pub fn like(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::new(field, QueryOperator::Like, Value::String(needle.into()))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to order by, reserved names included
    pub field: String,
    /// Direction
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Full query specification. All parts are optional; the default query
/// returns the table in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Conditions, combined with AND semantics
    #[serde(default)]
    pub conditions: Vec<QueryCondition>,
    /// Sort keys applied as successive tie-breakers
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    /// Truncate the result to this many documents, after skip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Drop this many leading documents, before limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition. Builder-style.
    pub fn filter(mut self, condition: QueryCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a sort key. Builder-style.
    pub fn order_by(mut self, spec: SortSpec) -> Self {
        self.sort.push(spec);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }
}
