use std::fmt;

const ENUM_PREFIX: &str = "enum:";

/// The column-level type of the elements of an array column.
///
/// An element type is resolved once per mapping and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    Bool,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// 32-bit float.
    Real,
    /// 64-bit float.
    Double,
    Text,
    Uuid,
    /// Calendar date without time zone.
    Date,
    /// Date and time without time zone.
    Timestamp,
    /// Composite element stored as a JSON document.
    Json,
    /// Database enum type, identified by its SQL type name.
    Enum(String),
}

impl ElementType {
    /// Returns the SQL name of a single element.
    pub fn sql_name(&self) -> &str {
        match self {
            ElementType::Bool => "boolean",
            ElementType::SmallInt => "smallint",
            ElementType::Integer => "integer",
            ElementType::BigInt => "bigint",
            ElementType::Real => "real",
            ElementType::Double => "float8",
            ElementType::Text => "text",
            ElementType::Uuid => "uuid",
            ElementType::Date => "date",
            ElementType::Timestamp => "timestamp",
            ElementType::Json => "jsonb",
            ElementType::Enum(name) => name,
        }
    }

    /// Parses an element type name as written in a field parameter.
    ///
    /// Accepts SQL names and their common aliases (`int4`, `i32`, `varchar`...),
    /// case-insensitively. Enum types are written `enum:<sql type name>`, the prefix
    /// in any case and the type name kept as written.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(enum_name) = strip_prefix_ignore_case(name, ENUM_PREFIX) {
            let enum_name = enum_name.trim();
            return (!enum_name.is_empty()).then(|| ElementType::Enum(enum_name.to_string()));
        }

        let element_type = match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => ElementType::Bool,
            "smallint" | "int2" | "i16" | "short" => ElementType::SmallInt,
            "integer" | "int" | "int4" | "i32" => ElementType::Integer,
            "bigint" | "int8" | "i64" | "long" => ElementType::BigInt,
            "real" | "float4" | "f32" | "float" => ElementType::Real,
            "double precision" | "double" | "float8" | "f64" => ElementType::Double,
            "text" | "varchar" | "string" => ElementType::Text,
            "uuid" => ElementType::Uuid,
            "date" => ElementType::Date,
            "timestamp" => ElementType::Timestamp,
            "json" | "jsonb" => ElementType::Json,
            _ => return None,
        };
        Some(element_type)
    }
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &name[prefix.len()..])
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
