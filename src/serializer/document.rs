//! The structured output of a serializer.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};

const TYPE: &str = "type";
const ID: &str = "id";
const ATTRIBUTES: &str = "attributes";
const RELATIONSHIPS: &str = "relationships";
const TARGET: &str = "target";

/// A serialized audit entry.
///
/// The document always has a non-empty string `type`, an `attributes`
/// object and a `relationships` object:
///
/// ```json
/// { "id": "12", "type": "audit-group-event",
///   "attributes": { "timestamp": "..." },
///   "relationships": { "target": { "id": "g1", "type": "group" } } }
/// ```
///
/// # Examples
///
/// ```
/// use audit_serializer::SerializedDocument;
/// use serde_json::json;
///
/// let mut doc = SerializedDocument::new("audit-badge-printed");
/// doc.set_attribute("printer", json!("front-desk"));
/// doc.set_target("u1", "user");
///
/// assert_eq!(doc.type_name(), "audit-badge-printed");
/// assert_eq!(doc.target(), Some(&json!({"id": "u1", "type": "user"})));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedDocument {
    inner: Map<String, Value>,
}

impl SerializedDocument {
    /// Creates an empty document of the given type.
    ///
    /// # Panics
    ///
    /// Panics if `type_name` is empty.
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        assert!(!type_name.is_empty(), "audit document type must not be empty");

        let mut inner = Map::new();
        inner.insert(TYPE.to_string(), Value::String(type_name));
        inner.insert(ATTRIBUTES.to_string(), Value::Object(Map::new()));
        inner.insert(RELATIONSHIPS.to_string(), Value::Object(Map::new()));
        Self { inner }
    }

    /// Returns the document id, if set.
    pub fn id(&self) -> Option<&str> {
        self.inner.get(ID).and_then(Value::as_str)
    }

    /// Sets the document id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.inner.insert(ID.to_string(), Value::String(id.into()));
    }

    /// Returns the type tag.
    pub fn type_name(&self) -> &str {
        self.inner.get(TYPE).and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns the raw `type` value.
    ///
    /// Built-in serializers inspect this to check the envelope before
    /// overriding it.
    pub(crate) fn raw_type(&self) -> Option<&Value> {
        self.inner.get(TYPE)
    }

    #[cfg(test)]
    pub(crate) fn set_raw_type(&mut self, value: Value) {
        self.inner.insert(TYPE.to_string(), value);
    }

    /// Replaces the type tag.
    ///
    /// Extension serializers call this on the envelope from
    /// [`serialize_base`](crate::serializer::serialize_base).
    ///
    /// # Panics
    ///
    /// Panics if `type_name` is empty.
    pub fn set_type(&mut self, type_name: &str) {
        assert!(!type_name.is_empty(), "audit document type must not be empty");
        self.inner
            .insert(TYPE.to_string(), Value::String(type_name.to_string()));
    }

    /// Returns the attributes object.
    pub fn attributes(&self) -> &Map<String, Value> {
        object(&self.inner, ATTRIBUTES)
    }

    /// Returns one attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes().get(key)
    }

    /// Sets one attribute, replacing any previous value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        object_mut(&mut self.inner, ATTRIBUTES).insert(key.into(), value);
    }

    /// Returns the relationships object.
    pub fn relationships(&self) -> &Map<String, Value> {
        object(&self.inner, RELATIONSHIPS)
    }

    /// Returns one relationship.
    pub fn relationship(&self, name: &str) -> Option<&Value> {
        self.relationships().get(name)
    }

    /// Points relationship `name` at the entity `id` of type `entity_type`.
    pub fn set_relationship(&mut self, name: impl Into<String>, id: &str, entity_type: &str) {
        object_mut(&mut self.inner, RELATIONSHIPS)
            .insert(name.into(), json!({ "id": id, "type": entity_type }));
    }

    /// Returns the `target` relationship.
    pub fn target(&self) -> Option<&Value> {
        self.relationship(TARGET)
    }

    /// Sets the `target` relationship.
    pub fn set_target(&mut self, id: &str, entity_type: &str) {
        self.set_relationship(TARGET, id, entity_type);
    }

    /// Borrows the document as a JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.inner
    }

    /// Returns a JSON value copy of the document.
    pub fn as_value(&self) -> Value {
        Value::Object(self.inner.clone())
    }

    /// Converts the document into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.inner)
    }

    /// Encodes the document as a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.inner)?)
    }
}

fn object<'a>(map: &'a Map<String, Value>, key: &str) -> &'a Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    map.get(key)
        .and_then(Value::as_object)
        .unwrap_or_else(|| EMPTY.get_or_init(Map::new))
}

fn object_mut<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(inner) => inner,
        _ => unreachable!("slot was just made an object"),
    }
}

impl Serialize for SerializedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl TryFrom<Value> for SerializedDocument {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let Value::Object(mut inner) = value else {
            return Err(Error::malformed("document must be a JSON object"));
        };

        match inner.get(TYPE) {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(Value::String(_)) => return Err(Error::malformed("'type' is empty")),
            Some(_) => return Err(Error::malformed("'type' is not a string")),
            None => return Err(Error::malformed("'type' is missing")),
        }

        for key in [ATTRIBUTES, RELATIONSHIPS] {
            match inner.get(key) {
                Some(Value::Object(_)) => {}
                None => {
                    inner.insert(key.to_string(), Value::Object(Map::new()));
                }
                Some(_) => {
                    return Err(Error::malformed(format!("'{}' is not an object", key)));
                }
            }
        }

        Ok(Self { inner })
    }
}

impl From<SerializedDocument> for Value {
    fn from(doc: SerializedDocument) -> Self {
        doc.into_value()
    }
}
