//! Configuration for the data proxy and translator

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::{ClientError, Result};

/// Default seqrepo REST endpoint used by local test setups
pub const DEFAULT_SEQREPO_URL: &str = "http://localhost:5000/seqrepo";

/// Reference assembly assumed for unqualified identifiers
pub const DEFAULT_ASSEMBLY_NAME: &str = "GRCh38";

/// Sequence repository proxy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataProxyConfig {
    /// Base URL of the seqrepo REST service
    pub base_url: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for DataProxyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEQREPO_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("ga4gh-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DataProxyConfig {
    /// Configuration pointing at `base_url`, defaults elsewhere
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

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

    /// Parsed base URL
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for unparseable or non-HTTP URLs.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ClientError::config(format!(
                "unsupported URL scheme '{scheme}' in {}",
                self.base_url
            ))),
        }
    }

    /// Check the configuration for values the proxy cannot work with
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;
        if self.timeout.is_zero() {
            return Err(ClientError::config("timeout must be greater than 0"));
        }
        Ok(())
    }
}

/// Options controlling how the translator builds objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorOptions {
    /// Compute stable identifiers for translated objects
    pub identify: bool,

    /// Resolve sequence accessions to GA4GH sequence identifiers
    pub translate_sequence_identifiers: bool,

    /// Assembly used to qualify bare chromosome names
    pub default_assembly_name: String,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            identify: true,
            translate_sequence_identifiers: true,
            default_assembly_name: DEFAULT_ASSEMBLY_NAME.to_string(),
        }
    }
}

impl TranslatorOptions {
    /// Parse options from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the result fails validation.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the options for values the translator cannot work with
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the default assembly name is unusable.
    pub fn validate(&self) -> Result<()> {
        if self.default_assembly_name.trim().is_empty() {
            return Err(ClientError::config("default assembly name cannot be empty"));
        }
        if self.default_assembly_name.contains(':') {
            return Err(ClientError::config(
                "default assembly name cannot contain ':'",
            ));
        }
        Ok(())
    }
}
