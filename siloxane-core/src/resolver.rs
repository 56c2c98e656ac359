use log::debug;

use crate::array::{ArrayCollection, CollectionShape};
use crate::config::Properties;
use crate::element::ArrayElement;
use crate::element_type::ElementType;
use crate::error::MappingError;

/// Field parameter naming the element type explicitly (see [`ElementType::from_name`]).
pub const ELEMENT_TYPE: &str = "element_type";
/// Field parameter overriding the SQL name of the array elements.
pub const SQL_ARRAY_TYPE: &str = "sql_array_type";

/// The declared type of a collection field, as seen by the host framework.
///
/// A raw (non-generic) collection has no type arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    pub shape: CollectionShape,
    pub type_arguments: Vec<ElementType>,
}

impl DeclaredType {
    /// Describes the collection type `C`, with its element type as the only argument.
    pub fn of<C: ArrayCollection>() -> Self {
        DeclaredType {
            shape: C::SHAPE,
            type_arguments: vec![C::Element::element_type()],
        }
    }

    /// Describes a raw collection of the given shape.
    pub fn raw(shape: CollectionShape) -> Self {
        DeclaredType {
            shape,
            type_arguments: Vec::new(),
        }
    }
}

/// Everything the host knows about a mapped field.
#[derive(Debug, Clone)]
pub struct FieldMetadata {
    pub entity: String,
    pub property: String,
    pub declared: DeclaredType,
    pub parameters: Properties,
}

impl FieldMetadata {
    pub fn new(entity: impl Into<String>, property: impl Into<String>, declared: DeclaredType) -> Self {
        FieldMetadata {
            entity: entity.into(),
            property: property.into(),
            declared,
            parameters: Properties::new(),
        }
    }

    /// Adds a field-level parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Returns a parameter value, treating blank values as absent.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn resolution_error(&self, reason: impl Into<String>) -> MappingError {
        MappingError::Resolution {
            entity: self.entity.clone(),
            property: self.property.clone(),
            reason: reason.into(),
        }
    }
}

/// Resolves the element type of a collection field.
///
/// The explicit `element_type` parameter wins; otherwise the field must
/// declare exactly one type argument.
pub fn resolve(field: &FieldMetadata) -> Result<ElementType, MappingError> {
    if let Some(name) = field.parameter(ELEMENT_TYPE) {
        let element_type = ElementType::from_name(name)
            .ok_or_else(|| field.resolution_error(format!("unknown element type {:?}", name)))?;
        debug!(
            "{}.{}: element type {} from parameter",
            field.entity, field.property, element_type
        );
        return Ok(element_type);
    }

    match field.declared.type_arguments.as_slice() {
        [element_type] => {
            debug!(
                "{}.{}: element type {} from declared type",
                field.entity, field.property, element_type
            );
            Ok(element_type.clone())
        }
        [] => Err(field.resolution_error("the field is not parameterized")),
        args => Err(field.resolution_error(format!(
            "expected one type argument, found {}",
            args.len()
        ))),
    }
}
