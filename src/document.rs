//! Document types
//!
//! A document is an arbitrary JSON object stored under a string identifier.
//! Every stored document carries its own identifier in [`ID_FIELD`], stamped
//! by the engine so the map key and the embedded id always agree.

use serde_json::{Map, Value};

/// Field holding a stored document's own identifier
pub const ID_FIELD: &str = "id";

/// A JSON document: a mapping from field names to JSON values
pub type Document = Map<String, Value>;

/// Stamp the storage identifier into a document, overwriting any
/// previous value.
pub(crate) fn stamp_id(doc: &mut Document, id: &str) {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
}

/// The embedded identifier, if present and a string
pub(crate) fn embedded_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}
