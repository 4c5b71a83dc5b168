//! Translator wiring over a data proxy

use std::sync::Arc;

use ga4gh_core::{Introspect, is_identifiable, is_schema_instance};
use tracing::debug;

use crate::config::TranslatorOptions;
use crate::dataproxy::{DataProxy, DataProxyExt};
use crate::error::{ClientError, Result};

/// Namespace of computed GA4GH sequence identifiers
pub const GA4GH_NAMESPACE: &str = "ga4gh";

/// Translates external variation representations using a shared data proxy
///
/// Generic over the proxy so tests can substitute an in-memory or mock one.
#[derive(Debug)]
pub struct Translator<P> {
    data_proxy: Arc<P>,
    options: TranslatorOptions,
}

impl<P> Clone for Translator<P> {
    fn clone(&self) -> Self {
        Self {
            data_proxy: Arc::clone(&self.data_proxy),
            options: self.options.clone(),
        }
    }
}

impl<P: DataProxy> Translator<P> {
    /// Create a translator over `data_proxy`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the options are invalid.
    pub fn new(data_proxy: Arc<P>, options: TranslatorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            data_proxy,
            options,
        })
    }

    /// The shared data proxy
    #[must_use]
    pub fn data_proxy(&self) -> &Arc<P> {
        &self.data_proxy
    }

    /// Options in effect
    #[must_use]
    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    /// Whether translated objects get computed identifiers
    #[must_use]
    pub fn identify(&self) -> bool {
        self.options.identify
    }

    /// Assembly used to qualify bare chromosome names
    #[must_use]
    pub fn default_assembly_name(&self) -> &str {
        &self.options.default_assembly_name
    }

    /// Prefix `identifier` with the default assembly unless it already has a namespace
    #[must_use]
    pub fn qualify_identifier(&self, identifier: &str) -> String {
        if identifier.contains(':') {
            identifier.to_string()
        } else {
            format!("{}:{identifier}", self.options.default_assembly_name)
        }
    }

    /// Identifier to use for a sequence in translated objects
    ///
    /// The identifier is qualified first. With sequence identifier
    /// translation enabled, the sequence's `ga4gh` alias is returned,
    /// otherwise the qualified identifier.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the sequence is unknown or has no
    /// `ga4gh` alias, and propagates other proxy errors.
    pub async fn translate_sequence_identifier(&self, identifier: &str) -> Result<String> {
        let qualified = self.qualify_identifier(identifier);
        if !self.options.translate_sequence_identifiers {
            return Ok(qualified);
        }

        let aliases = self
            .data_proxy
            .translate_sequence_identifier(&qualified, Some(GA4GH_NAMESPACE))
            .await?;
        debug!(identifier = %qualified, aliases = aliases.len(), "translated sequence identifier");
        aliases.into_iter().next().ok_or_else(|| {
            ClientError::NotFound(format!("{qualified} has no {GA4GH_NAMESPACE} alias"))
        })
    }

    /// Whether `value` is a schema instance still waiting for an identifier
    ///
    /// Always false when identification is disabled.
    pub fn needs_identifier<V: Introspect + ?Sized>(&self, value: &V) -> bool {
        self.options.identify && is_schema_instance(value) && !is_identifiable(value)
    }
}
