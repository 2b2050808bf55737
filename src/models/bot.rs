use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Insertion-ordered, string-keyed map of arbitrary JSON values.
pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub bot_id: String,
    pub token: String,
    pub state: Document,
    pub config: Document,
    pub owner_login: String,
}

/// Unwraps a stored JSON column into a document. Anything but an object
/// (including SQL NULL surfacing as `Value::Null`) reads as empty.
#[must_use]
pub fn document_from_value(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}
