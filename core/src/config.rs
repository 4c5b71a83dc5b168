//! Configuration types for schema loading

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SchemaError};

/// Schema loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Keys searched, in order, for the named definitions section
    pub definitions_keys: Vec<String>,

    /// Require every local `$ref` to resolve inside the document
    pub resolve_references: bool,

    /// Maximum schema file size in bytes
    pub max_file_size_bytes: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            definitions_keys: vec!["definitions".to_string(), "$defs".to_string()],
            resolve_references: true,
            max_file_size_bytes: 16 * 1024 * 1024,
        }
    }
}

impl LoaderConfig {
    /// Parse a configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the result fails validation.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check the configuration for values the loader cannot work with
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.definitions_keys.is_empty() {
            return Err(SchemaError::config(
                "at least one definitions key is required",
            ));
        }
        if self.definitions_keys.iter().any(String::is_empty) {
            return Err(SchemaError::config("definitions keys cannot be empty"));
        }
        if self.max_file_size_bytes == 0 {
            return Err(SchemaError::config(
                "max file size must be greater than 0",
            ));
        }
        Ok(())
    }
}
