use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::array::{ArrayCodec, ArrayCollection, CollectionShape, SqlArray};
use crate::config::Configuration;
use crate::error::MappingError;
use crate::json::JsonCodec;
use crate::resolver::FieldMetadata;

/// A value as handed to or received from the host's column binding.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// JSON text.
    Text(String),
    /// Native array.
    Array(SqlArray),
}

impl ColumnValue {
    fn kind(&self) -> &'static str {
        match self {
            ColumnValue::Text(_) => "text",
            ColumnValue::Array(_) => "array",
        }
    }
}

/// The capability set a host persistence framework calls for one mapped type.
///
/// Every operation maps `None` to `None`.
pub trait TypeAdapter: Send + Sync {
    /// The in-memory type of the mapped field.
    type Value;

    /// Name the host registers the type under.
    fn name(&self) -> &str;

    /// SQL type of the column.
    fn sql_type_name(&self) -> &str;

    fn to_column(&self, value: Option<&Self::Value>) -> Result<Option<ColumnValue>, MappingError>;

    fn from_column(&self, raw: Option<ColumnValue>) -> Result<Option<Self::Value>, MappingError>;

    /// Decides whether the value changed for dirty checking.
    fn equals(&self, a: Option<&Self::Value>, b: Option<&Self::Value>) -> Result<bool, MappingError>;

    /// Snapshot used for dirty checking.
    fn deep_copy(&self, value: Option<&Self::Value>) -> Result<Option<Self::Value>, MappingError>;

    fn is_mutable(&self) -> bool;
}

/// Maps a serde value `T` on a JSON column.
pub struct JsonType<T> {
    codec: JsonCodec,
    structural_eq: Option<fn(&T, &T) -> bool>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonType<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates an adapter comparing values with `T`'s own equality.
    pub fn new(config: Arc<Configuration>) -> Self
    where
        T: PartialEq,
    {
        JsonType {
            codec: JsonCodec::with_config(config),
            structural_eq: Some(<T as PartialEq>::eq),
            _marker: PhantomData,
        }
    }

    /// Creates an adapter for a type without `PartialEq`, comparing serialized forms.
    pub fn serialized_eq(config: Arc<Configuration>) -> Self {
        JsonType {
            codec: JsonCodec::with_config(config),
            structural_eq: None,
            _marker: PhantomData,
        }
    }

    pub fn codec(&self) -> &JsonCodec {
        &self.codec
    }
}

impl<T> TypeAdapter for JsonType<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn name(&self) -> &str {
        "json"
    }

    fn sql_type_name(&self) -> &str {
        self.codec.config().json_sql_type()
    }

    fn to_column(&self, value: Option<&T>) -> Result<Option<ColumnValue>, MappingError> {
        value
            .map(|v| self.codec.to_text(v).map(ColumnValue::Text))
            .transpose()
    }

    fn from_column(&self, raw: Option<ColumnValue>) -> Result<Option<T>, MappingError> {
        match raw {
            None => Ok(None),
            Some(ColumnValue::Text(text)) => self.codec.from_text_as(&text).map(Some),
            Some(other) => Err(MappingError::ColumnMismatch {
                expected: "text",
                found: other.kind(),
            }),
        }
    }

    fn equals(&self, a: Option<&T>, b: Option<&T>) -> Result<bool, MappingError> {
        match (self.structural_eq, a, b) {
            (Some(eq), Some(a), Some(b)) => Ok(std::ptr::eq(a, b) || eq(a, b)),
            (Some(_), a, b) => Ok(a.is_none() && b.is_none()),
            (None, a, b) => self.codec.equals_serialized(a, b),
        }
    }

    fn deep_copy(&self, value: Option<&T>) -> Result<Option<T>, MappingError> {
        self.codec.copy(value)
    }

    fn is_mutable(&self) -> bool {
        self.codec.is_mutable()
    }
}

impl<T> fmt::Debug for JsonType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonType")
            .field("codec", &self.codec)
            .field("structural_eq", &self.structural_eq.is_some())
            .finish()
    }
}

/// Maps a collection `C` on a native array column.
#[derive(Debug, Clone)]
pub struct ListArrayType<C> {
    codec: ArrayCodec<C>,
}

impl<C: ArrayCollection> ListArrayType<C> {
    /// Creates an adapter storing the collection's own element type.
    pub fn new() -> Self {
        ListArrayType {
            codec: ArrayCodec::new(),
        }
    }

    /// Creates an adapter for a mapped field, resolving its element type once.
    pub fn for_field(field: &FieldMetadata) -> Result<Self, MappingError> {
        Ok(ListArrayType {
            codec: ArrayCodec::for_field(field)?,
        })
    }

    /// Returns this adapter using `config` instead of the process-wide configuration.
    pub fn with_config(self, config: Arc<Configuration>) -> Self {
        ListArrayType {
            codec: self.codec.with_config(config),
        }
    }

    pub fn codec(&self) -> &ArrayCodec<C> {
        &self.codec
    }
}

impl<C: ArrayCollection> Default for ListArrayType<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ArrayCollection> TypeAdapter for ListArrayType<C> {
    type Value = C;

    fn name(&self) -> &str {
        match C::SHAPE {
            CollectionShape::List => "list-array",
            CollectionShape::Set => "set-array",
        }
    }

    fn sql_type_name(&self) -> &str {
        self.codec.sql_type_name()
    }

    fn to_column(&self, value: Option<&C>) -> Result<Option<ColumnValue>, MappingError> {
        Ok(self.codec.to_column(value)?.map(ColumnValue::Array))
    }

    fn from_column(&self, raw: Option<ColumnValue>) -> Result<Option<C>, MappingError> {
        match raw {
            None => Ok(None),
            Some(ColumnValue::Array(array)) => self.codec.from_column(Some(array)),
            Some(other) => Err(MappingError::ColumnMismatch {
                expected: "array",
                found: other.kind(),
            }),
        }
    }

    fn equals(&self, a: Option<&C>, b: Option<&C>) -> Result<bool, MappingError> {
        Ok(self.codec.equals(a, b))
    }

    fn deep_copy(&self, value: Option<&C>) -> Result<Option<C>, MappingError> {
        Ok(self.codec.copy(value))
    }

    fn is_mutable(&self) -> bool {
        true
    }
}
