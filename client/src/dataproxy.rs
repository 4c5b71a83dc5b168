//! Access to sequences and sequence metadata
//!
//! [`DataProxy`] is the seam between translation code and whatever holds the
//! reference sequences. [`SeqRepoRestDataProxy`] talks to a seqrepo REST
//! service over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::DataProxyConfig;
use crate::error::{ClientError, Result};

/// Metadata the repository keeps for one sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMetadata {
    /// When the sequence was added, as reported by the repository
    #[serde(default)]
    pub added: Option<String>,

    /// All identifiers the sequence is known by, each `namespace:accession`
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Symbols occurring in the sequence
    #[serde(default)]
    pub alphabet: Option<String>,

    /// Sequence length
    #[serde(default)]
    pub length: Option<u64>,
}

impl SequenceMetadata {
    /// Aliases in `namespace`, or all aliases when `namespace` is `None`
    pub fn aliases_in<'a>(&'a self, namespace: Option<&'a str>) -> impl Iterator<Item = &'a str> {
        self.aliases
            .iter()
            .map(String::as_str)
            .filter(move |alias| match namespace {
                Some(namespace) => alias
                    .split_once(':')
                    .is_some_and(|(prefix, _)| prefix == namespace),
                None => true,
            })
    }
}

/// Source of reference sequences and their metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataProxy: Send + Sync {
    /// Metadata for the sequence known as `identifier`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` when the identifier is unknown.
    async fn get_metadata(&self, identifier: &str) -> Result<SequenceMetadata>;

    /// Sequence residues, optionally restricted to the interbase range `start..end`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` when the identifier is unknown.
    async fn get_sequence(
        &self,
        identifier: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<String>;
}

/// Operations derived from [`DataProxy`] primitives
#[async_trait]
pub trait DataProxyExt: DataProxy {
    /// Other identifiers for the sequence known as `identifier`
    ///
    /// With a `namespace`, only aliases in that namespace are returned.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`DataProxy::get_metadata`].
    async fn translate_sequence_identifier(
        &self,
        identifier: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<String>> {
        let metadata = self.get_metadata(identifier).await?;
        Ok(metadata
            .aliases_in(namespace)
            .map(str::to_string)
            .collect())
    }
}

impl<T: DataProxy + ?Sized> DataProxyExt for T {}

#[async_trait]
impl<T: DataProxy + ?Sized> DataProxy for Arc<T> {
    async fn get_metadata(&self, identifier: &str) -> Result<SequenceMetadata> {
        (**self).get_metadata(identifier).await
    }

    async fn get_sequence(
        &self,
        identifier: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<String> {
        (**self).get_sequence(identifier, start, end).await
    }
}

/// Data proxy backed by a seqrepo REST service
///
/// Requests go to `{base_url}/1/metadata/{identifier}` and
/// `{base_url}/1/sequence/{identifier}`.
#[derive(Debug, Clone)]
pub struct SeqRepoRestDataProxy {
    client: Client,
    base_url: Url,
}

impl SeqRepoRestDataProxy {
    /// Proxy for the service at `base_url` with default settings
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for an unusable URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(&DataProxyConfig::with_base_url(base_url))
    }

    /// Proxy built from a full configuration
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for invalid settings, or
    /// `ClientError::Http` if the HTTP client cannot be built.
    pub fn with_config(config: &DataProxyConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.parsed_base_url()?,
        })
    }

    /// Base URL of the service
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, resource: &str, identifier: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["1", resource, identifier]);
        Ok(url)
    }

    async fn fetch(&self, url: Url, identifier: &str) -> Result<String> {
        debug!(%url, "requesting seqrepo resource");
        let response = self.client.get(url.clone()).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.text().await?),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(identifier.to_string())),
            status => {
                warn!(%url, status = status.as_u16(), "seqrepo request failed");
                Err(ClientError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl DataProxy for SeqRepoRestDataProxy {
    async fn get_metadata(&self, identifier: &str) -> Result<SequenceMetadata> {
        let url = self.endpoint("metadata", identifier)?;
        let body = self.fetch(url, identifier).await?;
        let metadata = serde_json::from_str(&body)?;
        Ok(metadata)
    }

    async fn get_sequence(
        &self,
        identifier: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<String> {
        let mut url = self.endpoint("sequence", identifier)?;
        if start.is_some() || end.is_some() {
            let mut query = url.query_pairs_mut();
            if let Some(start) = start {
                query.append_pair("start", &start.to_string());
            }
            if let Some(end) = end {
                query.append_pair("end", &end.to_string());
            }
        }
        self.fetch(url, identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> SequenceMetadata {
        SequenceMetadata {
            added: Some("2016-08-27T21:23:35Z".to_string()),
            aliases: vec![
                "GRCh38:19".to_string(),
                "ga4gh:SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl".to_string(),
                "refseq:NC_000019.10".to_string(),
            ],
            alphabet: Some("ACGMNRT".to_string()),
            length: Some(58_617_616),
        }
    }

    #[test]
    fn test_endpoint_layout() -> Result<()> {
        let proxy = SeqRepoRestDataProxy::new("http://localhost:5000/seqrepo")?;
        assert_eq!(
            proxy.endpoint("metadata", "GRCh38:19")?.as_str(),
            "http://localhost:5000/seqrepo/1/metadata/GRCh38:19"
        );

        let trailing = SeqRepoRestDataProxy::new("http://localhost:5000/seqrepo/")?;
        assert_eq!(
            trailing.endpoint("sequence", "NC_000019.10")?.as_str(),
            "http://localhost:5000/seqrepo/1/sequence/NC_000019.10"
        );
        Ok(())
    }

    #[test]
    fn test_identifier_is_one_path_segment() -> Result<()> {
        let proxy = SeqRepoRestDataProxy::new("http://localhost:5000/seqrepo")?;
        let url = proxy.endpoint("metadata", "odd/name")?;
        assert_eq!(url.path(), "/seqrepo/1/metadata/odd%2Fname");
        Ok(())
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            SeqRepoRestDataProxy::new("localhost:5000"),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_metadata_deserializes_partial_documents() -> Result<()> {
        let parsed: SequenceMetadata =
            serde_json::from_str(r#"{"aliases": ["refseq:NC_000019.10"]}"#)?;
        assert_eq!(parsed.aliases, ["refseq:NC_000019.10"]);
        assert!(parsed.length.is_none());
        Ok(())
    }

    #[test]
    fn test_aliases_in_namespace() {
        let metadata = metadata();
        let ga4gh: Vec<_> = metadata.aliases_in(Some("ga4gh")).collect();
        assert_eq!(ga4gh, ["ga4gh:SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl"]);
        assert_eq!(metadata.aliases_in(None).count(), 3);
        assert_eq!(metadata.aliases_in(Some("ga4")).count(), 0);
    }

    #[tokio::test]
    async fn test_translate_filters_by_namespace() -> Result<()> {
        let mut proxy = MockDataProxy::new();
        proxy
            .expect_get_metadata()
            .withf(|identifier| identifier == "GRCh38:19")
            .times(2)
            .returning(|_| Ok(metadata()));

        let refseq = proxy
            .translate_sequence_identifier("GRCh38:19", Some("refseq"))
            .await?;
        assert_eq!(refseq, ["refseq:NC_000019.10"]);

        let all = proxy.translate_sequence_identifier("GRCh38:19", None).await?;
        assert_eq!(all.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_translate_propagates_not_found() {
        let mut proxy = MockDataProxy::new();
        proxy
            .expect_get_metadata()
            .returning(|identifier| Err(ClientError::NotFound(identifier.to_string())));

        let err = proxy
            .translate_sequence_identifier("bogus:1", None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
