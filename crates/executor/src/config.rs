//! Store definitions via `dynochamber.toml`
//!
//! A store's table and named operations can be described declaratively and
//! loaded from TOML or JSON. Capabilities that only code can express
//! (validators, output builders, generator nodes) are attached afterwards on
//! the [`StoreDefinition`](crate::StoreDefinition) built from the config.

use std::collections::BTreeMap;
use std::path::Path;

use dynochamber_core::OperationTemplate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Config file name conventionally used for a store definition.
pub const CONFIG_FILE_NAME: &str = "dynochamber.toml";

/// Declarative store definition.
///
/// # Example
///
/// ```toml
/// tableName = "Movies"
///
/// [operations.getMovie]
/// _type = "get"
/// Key = { year = "{{year}}", title = "{{title}}" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Table targeted by every operation; may itself hold placeholders.
    #[serde(rename = "tableName", alias = "table_name")]
    pub table_name: String,
    /// Operation definitions keyed by name. `_type` names the kind.
    #[serde(default)]
    pub operations: BTreeMap<String, Value>,
}

impl StoreConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# dynochamber store definition
#
# Table every operation targets unless a call overrides it.
# Placeholders are allowed, e.g. "{{stage}}.movies".
tableName = "Movies"

# Each [operations.<name>] table defines one named operation.
# _type is one of: get, put, delete, update, query, scan, batchGet, batchWrite
# Every other key is copied into the request with {{placeholders}} filled
# from the call's model. "{{name}}" alone keeps the model value's type.
[operations.getMovie]
_type = "get"
Key = { year = "{{year}}", title = "{{title}}" }

[operations.addMovie]
_type = "put"
Item = "{{movie}}"
"#
    }

    /// Parse a TOML definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or misses `tableName`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content).map_err(|e| Error::Config {
            reason: format!("failed to parse store definition: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or misses `tableName`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(content).map_err(|e| Error::Config {
            reason: format!("failed to parse store definition: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a definition from a file path.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let parsed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        };
        parsed.map_err(|e| Error::Config {
            reason: format!("{} ({})", e, path.display()),
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Config {
                reason: format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("failed to serialize store definition: {}", e),
        })?;
        std::fs::write(path, content).map_err(|e| Error::Config {
            reason: format!("failed to write config file '{}': {}", path.display(), e),
        })
    }

    /// Compile every operation definition into a template.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first operation that is not an object
    /// with a known `_type`.
    pub fn templates(&self) -> Result<Vec<(String, OperationTemplate)>> {
        self.operations
            .iter()
            .map(|(name, definition)| {
                OperationTemplate::from_definition(definition.clone())
                    .map(|template| (name.clone(), template))
                    .map_err(|e| Error::Config {
                        reason: format!("operation {}: {}", name, e),
                    })
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.table_name.is_empty() {
            return Err(Error::Config {
                reason: "tableName must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
