/// Error type for every mapping operation.
///
/// Errors are always surfaced to the caller. A failed decode never turns into
/// an empty or default value.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("malformed or incompatible JSON text {text:?}: {source}")]
    Decode {
        text: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value cannot be represented as JSON: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("cannot resolve element type of {entity}.{property}: {reason}")]
    Resolution {
        entity: String,
        property: String,
        reason: String,
    },
    #[error("array element {index} ({found}) cannot be converted to {expected}")]
    Conversion {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("expected a {expected} column, found a {found} column")]
    ColumnMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid value {value:?} for property {key}")]
    InvalidProperty { key: String, value: String },
}

impl MappingError {
    pub(crate) fn decode(text: &str, source: serde_json::Error) -> Self {
        MappingError::Decode {
            text: text.to_string(),
            source,
        }
    }
}
