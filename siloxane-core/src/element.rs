use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt::Debug;
use uuid::Uuid;

use crate::element_type::ElementType;
use crate::error::MappingError;
use crate::sql_value::SqlValue;

/// A value that can be stored as an element of an array column.
///
/// To be an array element, a value must:
/// - Declare its column-level element type
/// - Convert itself to an `SqlValue` of that type
/// - Rebuild itself from an `SqlValue` already coerced to that type
pub trait ArrayElement: Debug + Clone + PartialEq + Send + Sync + 'static {
    /// Returns the element type this value maps to.
    fn element_type() -> ElementType;

    /// Converts this value to its column-level form.
    fn to_sql(&self) -> Result<SqlValue, MappingError>;

    /// Rebuilds a value from its column-level form.
    /// Returns `None` when the value does not have the expected shape.
    fn from_sql(value: SqlValue) -> Option<Self>;

    /// Like [`from_sql`](Self::from_sql), for elements whose rebuild step can
    /// fail with an error of its own. `Ok(None)` still means a shape mismatch.
    fn try_from_sql(value: SqlValue) -> Result<Option<Self>, MappingError> {
        Ok(Self::from_sql(value))
    }

    /// Element equality used for dirty checking. Defaults to `==`.
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

macro_rules! impl_array_element {
    ($t:ty, $variant:ident, float) => {
        impl_array_element!($t, $variant, {
            /// Bitwise, so a NaN element equals its own snapshot.
            fn same(&self, other: &Self) -> bool {
                self.to_bits() == other.to_bits()
            }
        });
    };
    ($t:ty, $variant:ident) => {
        impl_array_element!($t, $variant, {});
    };
    ($t:ty, $variant:ident, { $($extra:item)* }) => {
        impl ArrayElement for $t {
            fn element_type() -> ElementType {
                ElementType::$variant
            }

            fn to_sql(&self) -> Result<SqlValue, MappingError> {
                Ok(SqlValue::$variant(self.clone()))
            }

            fn from_sql(value: SqlValue) -> Option<Self> {
                match value {
                    SqlValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            $($extra)*
        }
    };
}

impl_array_element!(bool, Bool);
impl_array_element!(i16, SmallInt);
impl_array_element!(i32, Integer);
impl_array_element!(i64, BigInt);
impl_array_element!(f32, Real, float);
impl_array_element!(f64, Double, float);
impl_array_element!(String, Text);
impl_array_element!(Uuid, Uuid);
impl_array_element!(NaiveDate, Date);
impl_array_element!(NaiveDateTime, Timestamp);
impl_array_element!(Value, Json);

/// Nullable elements: `None` maps to an SQL `NULL` inside the array.
impl<T: ArrayElement> ArrayElement for Option<T> {
    fn element_type() -> ElementType {
        T::element_type()
    }

    fn to_sql(&self) -> Result<SqlValue, MappingError> {
        match self {
            Some(v) => v.to_sql(),
            None => Ok(SqlValue::Null),
        }
    }

    fn from_sql(value: SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => Some(None),
            other => T::from_sql(other).map(Some),
        }
    }

    fn try_from_sql(value: SqlValue) -> Result<Option<Self>, MappingError> {
        match value {
            SqlValue::Null => Ok(Some(None)),
            other => Ok(T::try_from_sql(other)?.map(Some)),
        }
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// A composite element stored as a JSON document.
///
/// The wrapped value goes through serde, so any serializable struct can be
/// kept in a `jsonb[]` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedded<T>(pub T);

impl<T> Embedded<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> ArrayElement for Embedded<T>
where
    T: Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn element_type() -> ElementType {
        ElementType::Json
    }

    fn to_sql(&self) -> Result<SqlValue, MappingError> {
        serde_json::to_value(&self.0)
            .map(SqlValue::Json)
            .map_err(MappingError::Encode)
    }

    fn from_sql(value: SqlValue) -> Option<Self> {
        Self::try_from_sql(value).ok().flatten()
    }

    /// A JSON element that does not fit `T` is a decode error carrying the
    /// element's text.
    fn try_from_sql(value: SqlValue) -> Result<Option<Self>, MappingError> {
        match value {
            SqlValue::Json(v) => {
                let text = v.to_string();
                serde_json::from_value(v)
                    .map(|inner| Some(Embedded(inner)))
                    .map_err(|source| MappingError::decode(&text, source))
            }
            _ => Ok(None),
        }
    }
}

/// Implements [`ArrayElement`] for a fieldless enum mapped to a database enum type.
///
/// ```
/// use siloxane_core::{enum_element, ArrayElement, ElementType};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Mood {
///     Happy,
///     Sad,
/// }
///
/// enum_element!(Mood as "mood" {
///     Happy => "happy",
///     Sad => "sad",
/// });
///
/// assert_eq!(Mood::element_type(), ElementType::Enum("mood".to_string()));
/// ```
#[macro_export]
macro_rules! enum_element {
    ($ty:ident as $sql:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $crate::ArrayElement for $ty {
            fn element_type() -> $crate::ElementType {
                $crate::ElementType::Enum($sql.to_string())
            }

            fn to_sql(&self) -> ::std::result::Result<$crate::SqlValue, $crate::MappingError> {
                let label = match self {
                    $($ty::$variant => $label,)+
                };
                Ok($crate::SqlValue::Enum(label.to_string()))
            }

            fn from_sql(value: $crate::SqlValue) -> ::std::option::Option<Self> {
                match value {
                    $crate::SqlValue::Enum(label) => match label.as_str() {
                        $($label => Some($ty::$variant),)+
                        _ => None,
                    },
                    _ => None,
                }
            }
        }
    };
}
