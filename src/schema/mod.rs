//! Schema module: per-table field contracts and document validation.

pub mod errors;
pub mod types;
pub mod validator;

pub use self::errors::{ValidationDetails, ValidationError, ValidationResult};
pub use self::types::{DatabaseSchema, FieldDef, FieldType, TableSchema};
pub use self::validator::Validator;
