//! TOML loading for [`EvaluationSpec`].
//!
//! The document has three tables: `features.<id>`, `filter.<id>` (also accepted as
//! `filters.<id>`) and `styles.<id>`. Every structural problem is reported as
//! [`Error::MalformedConfiguration`] before any evaluation happens.
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::spec::{EvaluationSpec, FeatureSpec, FilterSpec};
use crate::error::{Error, Result};
use crate::style::StyleOptions;

impl EvaluationSpec {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let document: toml::Table = toml::from_str(text)?;
        let mut spec = EvaluationSpec::default();

        for (table_name, value) in document {
            let entries = into_table(&table_name, value)?;
            match table_name.as_str() {
                "features" => {
                    for (id, value) in entries {
                        let feature: FeatureSpec = decode_entry(&table_name, &id, value)?;
                        spec.features.push((id, feature));
                    }
                }
                "filter" | "filters" => {
                    for (id, value) in entries {
                        let filter: FilterSpec = decode_entry(&table_name, &id, value)?;
                        if spec.filters.insert(id.clone(), filter).is_some() {
                            return Err(Error::MalformedConfiguration(format!(
                                "filter '{id}' is declared more than once"
                            )));
                        }
                    }
                }
                "styles" => {
                    for (id, value) in entries {
                        let options: StyleOptions = decode_entry(&table_name, &id, value)?;
                        spec.styles.insert(id, options);
                    }
                }
                other => {
                    return Err(Error::MalformedConfiguration(format!(
                        "unknown table '{other}'"
                    )))
                }
            }
        }

        debug!(
            "Loaded configuration: {} features, {} filters, {} styles.",
            spec.features.len(),
            spec.filters.len(),
            spec.styles.len()
        );
        Ok(spec)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }
}

fn into_table(name: &str, value: toml::Value) -> Result<toml::Table> {
    match value {
        toml::Value::Table(table) => Ok(table),
        other => Err(Error::MalformedConfiguration(format!(
            "'{name}' must be a table, found {}",
            other.type_str()
        ))),
    }
}

fn decode_entry<T: DeserializeOwned>(table: &str, id: &str, value: toml::Value) -> Result<T> {
    let value = match value {
        toml::Value::Table(_) => value,
        other => {
            return Err(Error::MalformedConfiguration(format!(
                "'{table}.{id}' must be a table, found {}",
                other.type_str()
            )))
        }
    };
    value
        .try_into()
        .map_err(|e: toml::de::Error| {
            Error::MalformedConfiguration(format!("'{table}.{id}': {}", e.message()))
        })
}
