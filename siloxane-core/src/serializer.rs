use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::error::MappingError;

/// Encodes generic JSON trees to text and back.
///
/// Serializers operate on `serde_json::Value` only: typed values are bridged
/// to and from the generic tree by the codecs, so an implementation never
/// needs to know the shape of the data it handles.
///
/// Implementations are shared between threads and must not keep mutable state.
pub trait Serializer: Debug + Send + Sync {
    /// Encodes a generic tree to its canonical text.
    fn encode(&self, value: &Value) -> Result<String, MappingError>;

    /// Parses text into a generic tree.
    fn decode(&self, text: &str) -> Result<Value, MappingError>;
}

impl<S: Serializer + ?Sized> Serializer for &S {
    fn encode(&self, value: &Value) -> Result<String, MappingError> {
        (*self).encode(value)
    }

    fn decode(&self, text: &str) -> Result<Value, MappingError> {
        (*self).decode(text)
    }
}

/// The default serializer, backed by `serde_json`.
///
/// Object keys keep their insertion order unless `sort_keys` is set, in which
/// case every object in the tree is emitted with its keys sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonSerializer {
    pub pretty: bool,
    pub sort_keys: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Serializer for JsonSerializer {
    fn encode(&self, value: &Value) -> Result<String, MappingError> {
        let sorted;
        let value = if self.sort_keys {
            sorted = sort_object_keys(value);
            &sorted
        } else {
            value
        };

        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.map_err(MappingError::Encode)
    }

    fn decode(&self, text: &str) -> Result<Value, MappingError> {
        serde_json::from_str(text).map_err(|e| MappingError::decode(text, e))
    }
}

fn sort_object_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_object_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_object_keys).collect()),
        other => other.clone(),
    }
}
