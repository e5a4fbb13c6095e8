//! The persisted document record.
//!
//! Every document carries three reserved fields with fixed encoded names:
//! `_id` (globally unique string), `_createdAt` and `_updatedAt` (epoch
//! milliseconds). All other fields live in an open map and are shaped only
//! by the table's schema contract. Invariant: `created_at <= updated_at`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Encoded names of the engine-owned fields.
pub const RESERVED_FIELDS: [&str; 3] = ["_id", "_createdAt", "_updatedAt"];

/// One persisted record of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique within the table, immutable post-creation
    #[serde(rename = "_id")]
    pub id: String,
    /// Assigned at insert, epoch milliseconds
    #[serde(rename = "_createdAt")]
    pub created_at: i64,
    /// Bumped on every update, epoch milliseconds
    #[serde(rename = "_updatedAt")]
    pub updated_at: i64,
    /// Schema-declared payload plus any extra fields the caller stored
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Assembles a fresh document. Only the engine creates documents; ids
    /// and timestamps are never caller-supplied.
    pub(crate) fn new(id: String, now: i64, fields: Map<String, Value>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            fields,
        }
    }

    /// Resolves a field by its encoded name, reserved fields included.
    /// Returns `None` when the field is absent from the document.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "_id" => Some(Value::String(self.id.clone())),
            "_createdAt" => Some(Value::from(self.created_at)),
            "_updatedAt" => Some(Value::from(self.updated_at)),
            _ => self.fields.get(name).cloned(),
        }
    }
}

/// Drops reserved keys from a caller-supplied payload or patch. Ids and
/// timestamps are engine-owned; a caller cannot smuggle them in.
pub(crate) fn strip_reserved(map: &mut Map<String, Value>) {
    for key in RESERVED_FIELDS {
        map.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        let mut fields = Map::new();
        fields.insert("name".into(), json!("Netflix"));
        fields.insert("amount".into(), json!(15.99));
        Document::new("doc-1".into(), 1_700_000_000_000, fields)
    }

    #[test]
    fn test_encoding_uses_reserved_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["_id"], json!("doc-1"));
        assert_eq!(value["_createdAt"], json!(1_700_000_000_000_i64));
        assert_eq!(value["_updatedAt"], json!(1_700_000_000_000_i64));
        assert_eq!(value["name"], json!("Netflix"));
    }

    #[test]
    fn test_decoding_roundtrip() {
        let doc = sample();
        let encoded = serde_json::to_string(&doc).unwrap();
        let decoded: Document = serde_json::from_str(&encoded).unwrap();
        assert_eq!(doc, decoded);
    }

    #[test]
    fn test_decoding_without_reserved_fields_fails() {
        let result = serde_json::from_str::<Document>(r#"{"name":"Netflix"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_field_resolves_reserved_names() {
        let doc = sample();
        assert_eq!(doc.field("_id"), Some(json!("doc-1")));
        assert_eq!(doc.field("_createdAt"), Some(json!(1_700_000_000_000_i64)));
        assert_eq!(doc.field("amount"), Some(json!(15.99)));
        assert_eq!(doc.field("missing"), None);
    }

    #[test]
    fn test_strip_reserved() {
        let mut map = Map::new();
        map.insert("_id".into(), json!("spoofed"));
        map.insert("_createdAt".into(), json!(0));
        map.insert("name".into(), json!("Netflix"));
        strip_reserved(&mut map);
        assert!(!map.contains_key("_id"));
        assert!(!map.contains_key("_createdAt"));
        assert!(map.contains_key("name"));
    }
}
