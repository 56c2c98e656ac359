use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;
use uuid::Uuid;

use crate::element_type::ElementType;
use crate::serializer::{JsonSerializer, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Largest integer magnitude a 64-bit float represents exactly.
const F64_EXACT_INT: u64 = 1 << 53;

/// A single element of an array column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Json(Value),
    /// Label of a database enum value.
    Enum(String),
}

impl SqlValue {
    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "boolean",
            SqlValue::SmallInt(_) => "smallint",
            SqlValue::Integer(_) => "integer",
            SqlValue::BigInt(_) => "bigint",
            SqlValue::Real(_) => "real",
            SqlValue::Double(_) => "float8",
            SqlValue::Text(_) => "text",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Date(_) => "date",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::Json(_) => "json",
            SqlValue::Enum(_) => "enum",
        }
    }

    /// Converts this value to the representation of `target`.
    ///
    /// Lossless conversions only: narrowing succeeds when the value fits, and
    /// text converts to or from the types that have a canonical text form.
    /// `Null` converts to every type. On failure the original value is returned.
    ///
    /// JSON documents and text convert through a default [`JsonSerializer`].
    pub fn coerce(self, target: &ElementType) -> Result<SqlValue, SqlValue> {
        self.coerce_with(target, &JsonSerializer::default())
    }

    /// Like [`coerce`](Self::coerce), converting JSON documents to and from
    /// text with `serializer`.
    pub fn coerce_with(
        self,
        target: &ElementType,
        serializer: &dyn Serializer,
    ) -> Result<SqlValue, SqlValue> {
        use ElementType as T;
        use SqlValue as V;

        match (self, target) {
            (V::Null, _) => Ok(V::Null),
            (V::Bool(b), T::Bool) => Ok(V::Bool(b)),

            (V::SmallInt(n), T::SmallInt) => Ok(V::SmallInt(n)),
            (V::SmallInt(n), T::Integer) => Ok(V::Integer(n.into())),
            (V::SmallInt(n), T::BigInt) => Ok(V::BigInt(n.into())),
            (V::SmallInt(n), T::Real) => Ok(V::Real(n.into())),
            (V::SmallInt(n), T::Double) => Ok(V::Double(n.into())),

            (V::Integer(n), T::SmallInt) => i16::try_from(n).map(V::SmallInt).map_err(|_| V::Integer(n)),
            (V::Integer(n), T::Integer) => Ok(V::Integer(n)),
            (V::Integer(n), T::BigInt) => Ok(V::BigInt(n.into())),
            (V::Integer(n), T::Double) => Ok(V::Double(n.into())),

            (V::BigInt(n), T::SmallInt) => i16::try_from(n).map(V::SmallInt).map_err(|_| V::BigInt(n)),
            (V::BigInt(n), T::Integer) => i32::try_from(n).map(V::Integer).map_err(|_| V::BigInt(n)),
            (V::BigInt(n), T::BigInt) => Ok(V::BigInt(n)),
            (V::BigInt(n), T::Double) if n.unsigned_abs() <= F64_EXACT_INT => Ok(V::Double(n as f64)),

            (V::Real(x), T::Real) => Ok(V::Real(x)),
            (V::Real(x), T::Double) => Ok(V::Double(x.into())),
            (V::Double(x), T::Real) => {
                let narrowed = x as f32;
                if f64::from(narrowed) == x || x.is_nan() {
                    Ok(V::Real(narrowed))
                } else {
                    Err(V::Double(x))
                }
            }
            (V::Double(x), T::Double) => Ok(V::Double(x)),

            (V::Text(s), T::Text) => Ok(V::Text(s)),
            (V::Text(s), T::Uuid) => Uuid::parse_str(s.trim()).map(V::Uuid).map_err(|_| V::Text(s)),
            (V::Text(s), T::Date) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(V::Date)
                .map_err(|_| V::Text(s)),
            (V::Text(s), T::Timestamp) => match parse_timestamp(&s) {
                Some(ts) => Ok(V::Timestamp(ts)),
                None => Err(V::Text(s)),
            },
            (V::Text(s), T::Enum(_)) => Ok(V::Enum(s)),
            (V::Text(s), T::Json) => match serializer.decode(&s) {
                Ok(v) => Ok(V::Json(v)),
                Err(_) => Err(V::Text(s)),
            },

            (V::Uuid(u), T::Uuid) => Ok(V::Uuid(u)),
            (V::Uuid(u), T::Text) => Ok(V::Text(u.to_string())),

            (V::Date(d), T::Date) => Ok(V::Date(d)),
            (V::Date(d), T::Text) => Ok(V::Text(d.format(DATE_FORMAT).to_string())),
            (V::Date(d), T::Timestamp) => d.and_hms_opt(0, 0, 0).map(V::Timestamp).ok_or(V::Date(d)),

            (V::Timestamp(ts), T::Timestamp) => Ok(V::Timestamp(ts)),
            (V::Timestamp(ts), T::Text) => Ok(V::Text(ts.format(TIMESTAMP_FORMATS[0]).to_string())),
            (V::Timestamp(ts), T::Date) => {
                if ts.time().num_seconds_from_midnight() == 0 && ts.time().nanosecond() == 0 {
                    Ok(V::Date(ts.date()))
                } else {
                    Err(V::Timestamp(ts))
                }
            }

            (V::Json(v), T::Json) => Ok(V::Json(v)),
            (V::Json(v), T::Text) => match serializer.encode(&v) {
                Ok(text) => Ok(V::Text(text)),
                Err(_) => Err(V::Json(v)),
            },

            (V::Enum(label), T::Enum(_)) => Ok(V::Enum(label)),
            (V::Enum(label), T::Text) => Ok(V::Text(label)),

            (other, _) => Err(other),
        }
    }
}

/// Whether some value of type `from` can coerce to `to`.
///
/// Mirrors the conversion table of [`SqlValue::coerce`]. A `true` answer does
/// not promise that every value converts: narrowing and parsing may still
/// fail on a particular element.
pub(crate) fn coercible(from: &ElementType, to: &ElementType) -> bool {
    use ElementType as T;

    match (from, to) {
        (T::Enum(_), T::Enum(_)) => true,
        (from, to) if from == to => true,
        (T::SmallInt, T::Integer | T::BigInt | T::Real | T::Double) => true,
        (T::Integer | T::BigInt, T::SmallInt | T::Integer | T::BigInt | T::Double) => true,
        (T::Real, T::Double) | (T::Double, T::Real) => true,
        (T::Text, T::Uuid | T::Date | T::Timestamp | T::Enum(_) | T::Json) => true,
        (T::Uuid | T::Date | T::Timestamp | T::Json | T::Enum(_), T::Text) => true,
        (T::Date, T::Timestamp) | (T::Timestamp, T::Date) => true,
        _ => false,
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}
