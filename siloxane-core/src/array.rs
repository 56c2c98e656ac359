use indexmap::IndexSet;
use log::warn;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::Configuration;
use crate::element::ArrayElement;
use crate::element_type::ElementType;
use crate::error::MappingError;
use crate::resolver::{self, FieldMetadata, SQL_ARRAY_TYPE};
use crate::sql_value::{self, SqlValue};

/// Whether a collection keeps order and duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    /// Ordered, duplicates allowed.
    List,
    /// Unordered, no duplicates.
    Set,
}

/// An in-memory collection that can be stored in an array column.
pub trait ArrayCollection: Debug + Clone + Send + Sync + 'static {
    type Element: ArrayElement;

    const SHAPE: CollectionShape;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the elements in the collection's own order.
    fn elements(&self) -> impl Iterator<Item = &Self::Element>;

    fn contains_element(&self, element: &Self::Element) -> bool;

    /// Builds the collection from elements in column order.
    /// Set shapes drop duplicates.
    fn from_elements(elements: Vec<Self::Element>) -> Self;
}

impl<T: ArrayElement> ArrayCollection for Vec<T> {
    type Element = T;

    const SHAPE: CollectionShape = CollectionShape::List;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn contains_element(&self, element: &T) -> bool {
        self.contains(element)
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements
    }
}

impl<T: ArrayElement> ArrayCollection for VecDeque<T> {
    type Element = T;

    const SHAPE: CollectionShape = CollectionShape::List;

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn contains_element(&self, element: &T) -> bool {
        self.contains(element)
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements.into()
    }
}

impl<T: ArrayElement + Eq + Hash> ArrayCollection for HashSet<T> {
    type Element = T;

    const SHAPE: CollectionShape = CollectionShape::Set;

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn contains_element(&self, element: &T) -> bool {
        self.contains(element)
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

impl<T: ArrayElement + Ord> ArrayCollection for BTreeSet<T> {
    type Element = T;

    const SHAPE: CollectionShape = CollectionShape::Set;

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn contains_element(&self, element: &T) -> bool {
        self.contains(element)
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

/// Insertion-ordered set: keeps column order on read, compares as a set.
impl<T: ArrayElement + Eq + Hash> ArrayCollection for IndexSet<T> {
    type Element = T;

    const SHAPE: CollectionShape = CollectionShape::Set;

    fn len(&self) -> usize {
        IndexSet::len(self)
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn contains_element(&self, element: &T) -> bool {
        self.contains(element)
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

/// The column-level form of an array: a homogeneous sequence plus its SQL type name.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlArray {
    /// SQL-visible type name, e.g. `integer[]`.
    pub type_name: String,
    pub element_type: ElementType,
    pub elements: Vec<SqlValue>,
}

impl SqlArray {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Converts a collection `C` to and from an array column.
///
/// The element type is fixed when the codec is built. Every element is
/// coerced to it on write, and coerced back to the collection's own element
/// type on read. JSON elements stored as text go through the configured
/// serializer.
pub struct ArrayCodec<C> {
    element_type: ElementType,
    sql_type_name: String,
    config: Arc<Configuration>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: ArrayCollection> ArrayCodec<C> {
    /// Creates a codec storing elements with the collection's own element type.
    pub fn new() -> Self {
        Self::with_element_type(C::Element::element_type())
    }

    /// Creates a codec storing elements as `element_type`.
    pub fn with_element_type(element_type: ElementType) -> Self {
        let sql_type_name = array_type_name(element_type.sql_name());
        ArrayCodec {
            element_type,
            sql_type_name,
            config: Configuration::global(),
            _marker: PhantomData,
        }
    }

    /// Returns this codec using `config` instead of the process-wide configuration.
    pub fn with_config(mut self, config: Arc<Configuration>) -> Self {
        self.config = config;
        self
    }

    /// Creates a codec for a mapped field, resolving its element type once.
    ///
    /// The `sql_array_type` parameter, when present, replaces the element's
    /// SQL name in [`sql_type_name`](Self::sql_type_name). An element type the
    /// collection's elements can never be converted to or from is rejected here.
    pub fn for_field(field: &FieldMetadata) -> Result<Self, MappingError> {
        if field.declared.shape != C::SHAPE {
            return Err(field.resolution_error(format!(
                "declared as {:?} but mapped to a {:?} collection",
                field.declared.shape,
                C::SHAPE
            )));
        }

        let element_type = resolver::resolve(field)?;
        let own = C::Element::element_type();
        if !sql_value::coercible(&own, &element_type) || !sql_value::coercible(&element_type, &own) {
            return Err(field.resolution_error(format!(
                "{} elements cannot be stored as {}",
                own, element_type
            )));
        }

        let mut codec = Self::with_element_type(element_type);
        if let Some(sql_name) = field.parameter(SQL_ARRAY_TYPE) {
            codec.sql_type_name = array_type_name(sql_name);
        }
        Ok(codec)
    }

    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    pub fn sql_type_name(&self) -> &str {
        &self.sql_type_name
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Converts a collection to an array column, keeping element order.
    pub fn to_column(&self, collection: Option<&C>) -> Result<Option<SqlArray>, MappingError> {
        let Some(collection) = collection else {
            return Ok(None);
        };

        let mut elements = Vec::with_capacity(collection.len());
        for (index, element) in collection.elements().enumerate() {
            elements.push(self.coerce(index, element.to_sql()?, &self.element_type)?);
        }

        Ok(Some(SqlArray {
            type_name: self.sql_type_name.clone(),
            element_type: self.element_type.clone(),
            elements,
        }))
    }

    /// Rebuilds a collection from an array column.
    pub fn from_column(&self, array: Option<SqlArray>) -> Result<Option<C>, MappingError> {
        let Some(array) = array else {
            return Ok(None);
        };

        let target = C::Element::element_type();
        let count = array.elements.len();
        let mut elements = Vec::with_capacity(count);
        for (index, value) in array.elements.into_iter().enumerate() {
            let value = self.coerce(index, value, &target)?;
            let found = value.kind();
            let element = C::Element::try_from_sql(value)?
                .ok_or_else(|| conversion_error(index, &target, found))?;
            elements.push(element);
        }

        let collection = C::from_elements(elements);
        if collection.len() < count {
            warn!(
                "dropped {} duplicate elements reading a {} column into a set",
                count - collection.len(),
                self.sql_type_name
            );
        }
        Ok(Some(collection))
    }

    /// Compares two collections: in order for lists, as sets for sets.
    pub fn equals(&self, a: Option<&C>, b: Option<&C>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                if std::ptr::eq(a, b) {
                    return true;
                }
                if a.len() != b.len() {
                    return false;
                }
                match C::SHAPE {
                    CollectionShape::List => a.elements().zip(b.elements()).all(|(x, y)| x.same(y)),
                    CollectionShape::Set => a.elements().all(|x| b.contains_element(x)),
                }
            }
            _ => false,
        }
    }

    /// Copies the collection. Elements are cloned one by one.
    pub fn copy(&self, collection: Option<&C>) -> Option<C> {
        collection.map(|c| C::from_elements(c.elements().cloned().collect()))
    }

    fn coerce(&self, index: usize, value: SqlValue, target: &ElementType) -> Result<SqlValue, MappingError> {
        value
            .coerce_with(target, self.config.serializer())
            .map_err(|original| conversion_error(index, target, original.kind()))
    }
}

impl<C: ArrayCollection> Default for ArrayCodec<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for ArrayCodec<C> {
    fn clone(&self) -> Self {
        ArrayCodec {
            element_type: self.element_type.clone(),
            sql_type_name: self.sql_type_name.clone(),
            config: Arc::clone(&self.config),
            _marker: PhantomData,
        }
    }
}

impl<C> std::fmt::Debug for ArrayCodec<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayCodec")
            .field("element_type", &self.element_type)
            .field("sql_type_name", &self.sql_type_name)
            .field("config", &self.config)
            .finish()
    }
}

fn array_type_name(element_sql_name: &str) -> String {
    format!("{}[]", element_sql_name)
}

fn conversion_error(index: usize, target: &ElementType, found: &str) -> MappingError {
    MappingError::Conversion {
        index,
        expected: target.to_string(),
        found: found.to_string(),
    }
}
