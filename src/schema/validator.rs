//! Per-table document validation and defaulting.
//!
//! Validation semantics:
//! - Required fields must be present on insert payloads.
//! - Present declared fields must match their declared runtime type.
//! - Null is rejected for every type except `null`.
//! - Numbers and dates must be finite.
//! - Undeclared fields pass through unvalidated; documents are open-world.
//!
//! Update patches get partial-update semantics: only fields present in the
//! patch are checked, and requiredness is not enforced.
//!
//! The validator never mutates its input; `apply_defaults` returns a copy.

use serde_json::{Map, Value};

use super::errors::{ValidationError, ValidationResult};
use super::types::{FieldDef, FieldType, TableSchema};

/// Validates payloads against one table's field contract.
pub struct Validator {
    schema: TableSchema,
}

impl Validator {
    /// Creates a validator for the given table schema.
    pub fn new(schema: TableSchema) -> Self {
        Self { schema }
    }

    /// Returns the underlying table schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Returns a copy of the payload with every declared field the caller
    /// left undefined replaced by its schema default.
    pub fn apply_defaults(&self, payload: &Map<String, Value>) -> Map<String, Value> {
        let mut result = payload.clone();
        for (name, def) in self.schema.iter() {
            if !result.contains_key(name) {
                if let Some(default) = &def.default {
                    result.insert(name.clone(), default.clone());
                }
            }
        }
        result
    }

    /// Validates a full insert payload: requiredness plus the type of every
    /// present declared field. Runs after `apply_defaults` on insert.
    pub fn validate(&self, payload: &Map<String, Value>) -> ValidationResult<()> {
        for (name, def) in self.schema.iter() {
            if def.required && !payload.contains_key(name) {
                return Err(ValidationError::required_missing(name));
            }
        }
        self.check_present_fields(payload)
    }

    /// Validates an update patch: only fields present in the patch are
    /// checked, and absent fields are not required-checked.
    pub fn validate_patch(&self, patch: &Map<String, Value>) -> ValidationResult<()> {
        self.check_present_fields(patch)
    }

    fn check_present_fields(&self, payload: &Map<String, Value>) -> ValidationResult<()> {
        for (name, value) in payload {
            if let Some(def) = self.schema.get(name) {
                validate_field(name, value, def)?;
            }
        }
        Ok(())
    }
}

fn validate_field(name: &str, value: &Value, def: &FieldDef) -> ValidationResult<()> {
    if value.is_null() && def.field_type != FieldType::Null {
        return Err(ValidationError::null_forbidden(name));
    }

    match def.field_type {
        FieldType::String => {
            if !value.is_string() {
                return Err(mismatch(name, def.field_type, value));
            }
        }
        FieldType::Number | FieldType::Date => {
            let finite = value.as_f64().is_some_and(f64::is_finite);
            if !value.is_number() {
                return Err(mismatch(name, def.field_type, value));
            }
            if !finite {
                return Err(ValidationError::non_finite(name));
            }
        }
        FieldType::Boolean => {
            if !value.is_boolean() {
                return Err(mismatch(name, def.field_type, value));
            }
        }
        FieldType::Object => {
            if !value.is_object() {
                return Err(mismatch(name, def.field_type, value));
            }
        }
        FieldType::Array => {
            if !value.is_array() {
                return Err(mismatch(name, def.field_type, value));
            }
        }
        FieldType::Null => {
            if !value.is_null() {
                return Err(mismatch(name, def.field_type, value));
            }
        }
    }

    Ok(())
}

/// Returns the JSON type name of a value for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(name: &str, expected: FieldType, actual: &Value) -> ValidationError {
    ValidationError::type_mismatch(name, expected.type_name(), json_type_name(actual))
}
