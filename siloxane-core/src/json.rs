use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Configuration;
use crate::error::MappingError;

/// Equality, text round-trip and copy for values stored as JSON text.
///
/// Typed values are converted to a generic `serde_json::Value` tree with serde
/// and handed to the configured [`Serializer`](crate::Serializer) for the text step.
///
/// # Equality
///
/// Two comparison paths exist:
/// - [`equals`](Self::equals) uses the value's own `PartialEq`. This is the
///   authoritative path: sets compare without regard to order.
/// - [`equals_serialized`](Self::equals_serialized) is for types without
///   `PartialEq` and compares serialized forms. Object keys may come in any
///   order, but sequence order matters, so two sets holding the same elements
///   in a different iteration order compare unequal. Annotate such fields with
///   [`sorted_seq`](crate::serde_helpers::sorted_seq) to make this path
///   order-insensitive.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    config: Arc<Configuration>,
}

impl JsonCodec {
    /// Creates a codec using the process-wide configuration.
    pub fn new() -> Self {
        Self::with_config(Configuration::global())
    }

    pub fn with_config(config: Arc<Configuration>) -> Self {
        JsonCodec { config }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Compares two values with their structural equality.
    pub fn equals<T: PartialEq + ?Sized>(&self, a: Option<&T>, b: Option<&T>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::eq(a, b) || a == b,
            _ => false,
        }
    }

    /// Compares two values through their serialized form.
    pub fn equals_serialized<T: Serialize + ?Sized>(
        &self,
        a: Option<&T>,
        b: Option<&T>,
    ) -> Result<bool, MappingError> {
        let (a, b) = match (a, b) {
            (None, None) => return Ok(true),
            (Some(a), Some(b)) if std::ptr::eq(a, b) => return Ok(true),
            (Some(a), Some(b)) => (a, b),
            _ => return Ok(false),
        };

        let text_a = self.to_text(a)?;
        let text_b = self.to_text(b)?;
        if text_a == text_b {
            return Ok(true);
        }
        Ok(self.from_text(&text_a)? == self.from_text(&text_b)?)
    }

    /// Parses text into a generic tree of maps, sequences and scalars.
    pub fn from_text(&self, text: &str) -> Result<Value, MappingError> {
        self.config.serializer().decode(text)
    }

    /// Parses text into the target shape `T`.
    pub fn from_text_as<T: DeserializeOwned>(&self, text: &str) -> Result<T, MappingError> {
        let value = self.from_text(text)?;
        serde_json::from_value(value).map_err(|e| MappingError::decode(text, e))
    }

    /// Serializes a value to text.
    pub fn to_text<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, MappingError> {
        let tree = serde_json::to_value(value).map_err(MappingError::Encode)?;
        self.config.serializer().encode(&tree)
    }

    /// Deep-copies a value by serializing and deserializing it.
    pub fn copy<T: Serialize + DeserializeOwned>(&self, value: Option<&T>) -> Result<Option<T>, MappingError> {
        value
            .map(|v| {
                let text = self.to_text(v)?;
                self.from_text_as(&text)
            })
            .transpose()
    }

    /// JSON values can change without being reassigned.
    pub fn is_mutable(&self) -> bool {
        true
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}
