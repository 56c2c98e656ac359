//! Siloxane maps in-memory values onto database columns.
//!
//! Core concepts:
//! - **JsonCodec**: equality, text round-trip and copy for values stored as JSON text
//! - **ArrayCodec**: converts a typed collection to and from a native array column
//! - **ElementType**: the column-level type of array elements, resolved once per field
//! - **Configuration**: the serializer and options shared by the codecs
//! - **TypeAdapter**: the capability set a persistence framework calls per mapped type
//!
//! # Example
//!
//! ```
//! use siloxane_core::{ArrayCodec, JsonCodec, SqlValue};
//!
//! let json = JsonCodec::new();
//! let value = json.from_text(r#"{"locale":"en-US"}"#).unwrap();
//! assert_eq!(value["locale"], "en-US");
//!
//! let array = ArrayCodec::<Vec<i32>>::new();
//! let column = array.to_column(Some(&vec![1, 2, 3])).unwrap().unwrap();
//! assert_eq!(column.type_name, "integer[]");
//! assert_eq!(column.elements[0], SqlValue::Integer(1));
//! ```
//!
//! # Equality and unordered collections
//!
//! Dirty checking relies on equality. Values with `PartialEq` are compared
//! structurally, so sets compare without regard to order. Values compared by
//! their serialized form see sets in iteration order: use
//! [`serde_helpers::sorted_seq`] on such fields.

mod adapter;
mod array;
mod config;
mod element;
mod element_type;
mod error;
mod json;
pub mod resolver;
pub mod serde_helpers;
mod serializer;
mod sql_value;

pub use adapter::{ColumnValue, JsonType, ListArrayType, TypeAdapter};
pub use array::{ArrayCodec, ArrayCollection, CollectionShape, SqlArray};
pub use config::{Configuration, JsonColumn, Properties, JSON_PRETTY, JSON_SORT_KEYS, JSON_SQL_TYPE};
pub use element::{ArrayElement, Embedded};
pub use element_type::ElementType;
pub use error::MappingError;
pub use json::JsonCodec;
pub use resolver::{DeclaredType, FieldMetadata, resolve};
pub use serializer::{JsonSerializer, Serializer};
pub use sql_value::SqlValue;
