use indexmap::IndexMap;
use log::{debug, info};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::MappingError;
use crate::serializer::{JsonSerializer, Serializer};

/// Settings supplied by the host framework at mapping-registration time.
pub type Properties = IndexMap<String, String>;

/// Pretty-print JSON text (`true` / `false`).
pub const JSON_PRETTY: &str = "siloxane.json.pretty";
/// Sort object keys when encoding (`true` / `false`).
pub const JSON_SORT_KEYS: &str = "siloxane.json.sort_keys";
/// Column type reported for JSON values (`json` / `jsonb`).
pub const JSON_SQL_TYPE: &str = "siloxane.json.sql_type";

const PROPERTY_PREFIX: &str = "siloxane.";

static GLOBAL: OnceLock<Arc<Configuration>> = OnceLock::new();

/// Column type used to store JSON text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonColumn {
    Json,
    #[default]
    Jsonb,
}

impl JsonColumn {
    pub fn sql_name(&self) -> &'static str {
        match self {
            JsonColumn::Json => "json",
            JsonColumn::Jsonb => "jsonb",
        }
    }
}

/// The serializer and options shared by every codec of a mapping.
///
/// A configuration is immutable once built. Codecs hold it behind an `Arc`,
/// so a test can hand a codec its own configuration instead of touching the
/// process-wide one.
#[derive(Clone)]
pub struct Configuration {
    serializer: Arc<dyn Serializer>,
    json_column: JsonColumn,
}

impl Configuration {
    /// Builds a configuration around a caller-supplied serializer.
    pub fn with_serializer(serializer: Arc<dyn Serializer>) -> Self {
        Configuration {
            serializer,
            json_column: JsonColumn::default(),
        }
    }

    /// Builds a configuration from host-supplied properties.
    ///
    /// Keys outside the `siloxane.` namespace belong to the host and are
    /// skipped. Unknown `siloxane.` keys are logged and skipped.
    pub fn from_properties(properties: &Properties) -> Result<Self, MappingError> {
        let mut serializer = JsonSerializer::default();
        let mut json_column = JsonColumn::default();

        for (key, value) in properties {
            match key.as_str() {
                JSON_PRETTY => serializer.pretty = parse_bool(key, value)?,
                JSON_SORT_KEYS => serializer.sort_keys = parse_bool(key, value)?,
                JSON_SQL_TYPE => {
                    json_column = match value.trim().to_ascii_lowercase().as_str() {
                        "json" => JsonColumn::Json,
                        "jsonb" => JsonColumn::Jsonb,
                        _ => return Err(invalid_property(key, value)),
                    }
                }
                other if other.starts_with(PROPERTY_PREFIX) => {
                    debug!("ignoring unknown property {}", other);
                }
                _ => {}
            }
        }

        Ok(Configuration {
            serializer: Arc::new(serializer),
            json_column,
        })
    }

    /// Returns a copy of this configuration storing JSON in the given column type.
    pub fn json_column(mut self, json_column: JsonColumn) -> Self {
        self.json_column = json_column;
        self
    }

    /// Returns the process-wide configuration, building the default on first use.
    pub fn global() -> Arc<Configuration> {
        GLOBAL
            .get_or_init(|| {
                info!("no configuration installed, using the default JSON serializer");
                Arc::new(Configuration::default())
            })
            .clone()
    }

    /// Publishes a process-wide configuration.
    ///
    /// Exactly one configuration is ever published: the first call (or the
    /// first `global()`) wins, and later calls get their configuration back
    /// in the `Err` variant.
    pub fn install(config: Configuration) -> Result<Arc<Configuration>, Arc<Configuration>> {
        let config = Arc::new(config);
        GLOBAL.set(Arc::clone(&config))?;
        info!("installed configuration {:?}", config);
        Ok(config)
    }

    pub fn serializer(&self) -> &dyn Serializer {
        self.serializer.as_ref()
    }

    pub fn json_sql_type(&self) -> &'static str {
        self.json_column.sql_name()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::with_serializer(Arc::new(JsonSerializer::default()))
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("serializer", &self.serializer)
            .field("json_column", &self.json_column)
            .finish()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, MappingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid_property(key, value)),
    }
}

fn invalid_property(key: &str, value: &str) -> MappingError {
    MappingError::InvalidProperty {
        key: key.to_string(),
        value: value.to_string(),
    }
}
