//! Schema type definitions.
//!
//! Supported field types:
//! - string: UTF-8 string
//! - number: finite 64-bit floating point
//! - boolean: true/false
//! - date: epoch milliseconds
//! - object: non-array, non-null JSON object
//! - array: JSON array
//! - null: the JSON null literal
//!
//! A table schema maps field names to definitions. Fields not declared by
//! the schema pass through unvalidated; documents are open-world.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// Finite 64-bit floating point
    Number,
    /// Boolean
    Boolean,
    /// Epoch milliseconds
    Date,
    /// Non-array, non-null JSON object
    Object,
    /// JSON array
    Array,
    /// The JSON null literal
    Null,
}

impl FieldType {
    /// Returns the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Null => "null",
        }
    }
}

/// A single field contract: type, requiredness, optional default, and an
/// indexed hint. The hint is declarative only; every query is a linear scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field must be present on insert
    #[serde(default)]
    pub required: bool,
    /// Value applied when the caller leaves the field undefined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Indexed hint, recorded but not acted on
    #[serde(default)]
    pub indexed: bool,
}

impl FieldDef {
    /// Create a required field of the given type.
    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
            default: None,
            indexed: false,
        }
    }

    /// Create an optional field of the given type.
    pub fn optional(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            default: None,
            indexed: false,
        }
    }

    /// Attach a default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Mark the field as an index candidate.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// Field contract for one table. Immutable after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    fields: HashMap<String, FieldDef>,
}

impl TableSchema {
    /// Create an empty table schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Builder-style; last declaration of a name wins.
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    /// Look up a field definition.
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Iterate over declared fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldDef)> {
        self.fields.iter()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The full database contract: table name to table schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    tables: HashMap<String, TableSchema>,
}

impl DatabaseSchema {
    /// Create an empty database schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table. Builder-style.
    pub fn table(mut self, name: impl Into<String>, schema: TableSchema) -> Self {
        self.tables.insert(name.into(), schema);
        self
    }

    /// Look up a table schema.
    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Iterate over declared tables.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TableSchema)> {
        self.tables.iter()
    }

    /// Declared table names.
    pub fn table_names(&self) -> impl Iterator<Item = &String> {
        self.tables.keys()
    }
}
